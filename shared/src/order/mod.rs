//! Order types
//!
//! - `binding`: where an order sits (takeout, one table, merged tables)
//! - `types`: items, modifiers, discount
//! - `snapshot`: the order itself and its status

pub mod binding;
pub mod snapshot;
pub mod types;

pub use binding::TableBinding;
pub use snapshot::{Order, OrderStatus};
pub use types::{
    Discount, DiscountType, MenuItemSnapshot, ModifierOption, ModifierSelection, OrderItem,
};
