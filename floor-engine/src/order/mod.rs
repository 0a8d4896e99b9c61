//! Order aggregate
//!
//! - `aggregate`: pure mutations, each returns a new snapshot with totals
//!   recomputed
//! - `slot`: the terminal's "current order", absent-safe wrapper

pub mod aggregate;
pub mod slot;

pub use aggregate::{NewItem, create_order};
pub use slot::OrderSlot;
