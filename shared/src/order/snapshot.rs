//! Order snapshot as exchanged with the backend

use super::binding::TableBinding;
use super::types::{Discount, OrderItem};
use serde::{Deserialize, Serialize};

/// Order status
///
/// `New` is the editing state: a fresh local draft, or a persisted order
/// reopened for editing. `Paid` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    New,
    Hold,
    Sent,
    Completed,
    Paid,
}

impl OrderStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Whether saving an order in `self` as `next` is allowed
    ///
    /// Sent orders never go back to hold; paid orders never move.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Paid, _) => false,
            (_, Paid) => true,
            (New, Hold | Sent) => true,
            (Hold, Hold | Sent) => true,
            (Sent, Sent) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Hold => "hold",
            Self::Sent => "sent",
            Self::Completed => "completed",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (`tmp-` prefixed until the server assigns one)
    pub id: String,
    /// Table binding, wire form `""` / `"7"` / `"3-4-5"`
    #[serde(default)]
    pub table_number: TableBinding,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    /// Table numbers folded in by previous order merges
    #[serde(default)]
    pub merged_from: Vec<String>,
    pub client_count: u32,
    pub current_client: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    /// Tax rate in percent (8.0 = 8%)
    #[serde(default)]
    pub tax_rate: f64,
    /// Recorded with the order, not part of `total`
    #[serde(default)]
    pub tip: f64,
    pub subtotal: f64,
    pub total: f64,
    /// Acting server (staff member) who opened the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_temporary(&self) -> bool {
        crate::util::is_temp_id(&self.id)
    }

    /// Everything except `Paid` holds its tables
    pub fn is_active(&self) -> bool {
        !self.status.is_paid()
    }

    pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Items added while the order was local and not yet persisted
    pub fn temporary_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|i| i.is_temporary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&OrderStatus::Hold).unwrap(), "\"hold\"");
        let status: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
        assert!(status.is_paid());
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(New.can_transition_to(Hold));
        assert!(New.can_transition_to(Sent));
        assert!(Hold.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Sent));
        assert!(Completed.can_transition_to(Paid));

        // 已送厨房的单不能退回挂单
        assert!(!Sent.can_transition_to(Hold));
        assert!(!Completed.can_transition_to(Sent));
        assert!(!Paid.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Sent));
    }

    #[test]
    fn test_order_binding_roundtrips_through_wire_string() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": "o-1",
            "table_number": "5-3",
            "status": "sent",
            "client_count": 2,
            "current_client": 1,
            "subtotal": 0.0,
            "total": 0.0,
            "created_at": 0,
            "updated_at": 0
        }))
        .unwrap();
        assert_eq!(order.table_number.to_string(), "3-5");
        assert!(order.is_active());
        assert!(!order.is_temporary());
        assert!(order.merged_from.is_empty());
    }
}
