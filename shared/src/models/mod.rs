//! Data models
//!
//! Shared between the floor engine, its backend client and the renderer.

pub mod dining_table;
pub mod link_group;

// Re-exports
pub use dining_table::*;
pub use link_group::*;
