//! Request/response types that only exist at the backend boundary

use serde::{Deserialize, Serialize};

/// Outcome of paying one member order of a link group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedPaymentEntry {
    pub table_number: String,
    /// `None` when the member table has no active order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-order results of a combined link-group payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedPayment {
    pub group_id: String,
    pub entries: Vec<LinkedPaymentEntry>,
}

impl LinkedPayment {
    /// Entries that carried an order but failed to pay
    pub fn failures(&self) -> impl Iterator<Item = &LinkedPaymentEntry> {
        self.entries
            .iter()
            .filter(|e| e.order_id.is_some() && !e.paid)
    }

    pub fn paid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.paid).count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}
