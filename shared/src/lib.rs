//! Shared types for the floor engine
//!
//! Data model exchanged between the floor engine, its backend client and the
//! table-map renderer, plus the unified error-code system.

pub mod error;
pub mod event;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, ErrorCode};
pub use event::{ContextAction, FloorEvent};
pub use models::{DiningTable, DiningTableUpdate, LinkGroup, TableGeometry, TableShape, TableStatus};
pub use order::{
    Discount, DiscountType, MenuItemSnapshot, ModifierOption, ModifierSelection, Order, OrderItem,
    OrderStatus, TableBinding,
};
