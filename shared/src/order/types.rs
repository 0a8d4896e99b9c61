//! Order line types: items, modifiers, discount

use serde::{Deserialize, Serialize};

// ============================================================================
// Menu snapshot
// ============================================================================

/// Menu item captured when it is added to an order.
///
/// Name and price are copied, later menu edits do not affect the order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItemSnapshot {
    pub menu_item_id: String,
    pub name: String,
    /// Base price before modifiers
    pub price: f64,
}

impl MenuItemSnapshot {
    pub fn new(menu_item_id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            price,
        }
    }
}

/// One option inside a modifier group (e.g. "Large" in "Size")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// Selected options of one modifier group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierSelection {
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    pub options: Vec<ModifierOption>,
}

// ============================================================================
// Order item
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Item ID (`tmp-` prefixed until persisted)
    pub id: String,
    pub menu_item: MenuItemSnapshot,
    /// Always >= 1
    pub quantity: u32,
    #[serde(default)]
    pub modifiers: Vec<ModifierSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Unit price: base price + selected option prices
    pub price: f64,
    /// Owning diner, 1-based
    #[serde(default = "default_client_number")]
    pub client_number: u32,
    /// Original table, set only on items folded in by an order merge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,
}

fn default_client_number() -> u32 {
    1
}

impl OrderItem {
    pub fn is_temporary(&self) -> bool {
        crate::util::is_temp_id(&self.id)
    }
}

// ============================================================================
// Discount
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `value` is a percentage (0-100)
    Percentage,
    /// `value` is subtracted from the subtotal
    Amount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub value: f64,
}

impl Discount {
    pub fn percentage(value: f64) -> Self {
        Self {
            kind: DiscountType::Percentage,
            value,
        }
    }

    pub fn amount(value: f64) -> Self {
        Self {
            kind: DiscountType::Amount,
            value,
        }
    }
}
