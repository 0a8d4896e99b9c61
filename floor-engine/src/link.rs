//! Link group manager
//!
//! Linked tables keep their own orders; the group only changes how they are
//! paid. Validation runs locally before the backend is asked.

use floor_client::{LinkedPayment, LinkedPaymentEntry};
use shared::models::LinkCreate;
use shared::util::natural_cmp;
use shared::{DiningTable, ErrorCode, Order};

use crate::error::{FloorError, FloorResult, Rejection};
use crate::occupancy::find_order_for_table;

/// Check a link request against the current floor state
///
/// The leader needs an active order; no table may already be in a group.
pub fn validate_link(
    tables: &[DiningTable],
    orders: &[Order],
    leader: &str,
    members: &[String],
) -> Result<LinkCreate, Rejection> {
    let mut others: Vec<String> = members.iter().filter(|m| *m != leader).cloned().collect();
    others.sort_by(|a, b| natural_cmp(a, b));
    others.dedup();
    if others.is_empty() {
        return Err(Rejection::TooFewTables(1));
    }

    for number in std::iter::once(leader).chain(others.iter().map(String::as_str)) {
        let table = tables
            .iter()
            .find(|t| t.number == number)
            .ok_or_else(|| Rejection::TableNotFound(number.to_string()))?;
        if let Some(group_id) = &table.group_id {
            return Err(Rejection::TableAlreadyLinked {
                table: number.to_string(),
                group_id: group_id.clone(),
            });
        }
    }

    if find_order_for_table(orders, leader).is_none() {
        return Err(Rejection::LeaderWithoutOrder(leader.to_string()));
    }

    Ok(LinkCreate {
        leader: leader.to_string(),
        members: others,
    })
}

/// Table numbers sharing `group_id`, in natural order
pub fn group_members(tables: &[DiningTable], group_id: &str) -> Vec<String> {
    let mut members: Vec<String> = tables
        .iter()
        .filter(|t| t.group_id.as_deref() == Some(group_id))
        .map(|t| t.number.clone())
        .collect();
    members.sort_by(|a, b| natural_cmp(a, b));
    members
}

/// What a combined payment actually did, order by order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkedPaymentReport {
    pub group_id: String,
    /// (table, order id)
    pub paid: Vec<(String, String)>,
    /// (table, order id, reason)
    pub failed: Vec<(String, String, String)>,
    /// Member tables without an order
    pub skipped: Vec<String>,
}

impl LinkedPaymentReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let attempted = self.paid.len() + self.failed.len();
        if self.failed.is_empty() {
            return format!("Paid {} linked orders", self.paid.len());
        }
        let failures: Vec<String> = self
            .failed
            .iter()
            .map(|(table, _, reason)| format!("table {} ({})", table, reason))
            .collect();
        format!(
            "Paid {} of {} linked orders; failed: {}",
            self.paid.len(),
            attempted,
            failures.join(", ")
        )
    }

    /// Partial success is an error the caller must show, never a success
    pub fn into_result(self) -> FloorResult<Self> {
        if self.is_complete() {
            return Ok(self);
        }
        if self.paid.is_empty() {
            return Err(FloorError::Precondition {
                code: ErrorCode::PaymentFailed,
                message: self.summary(),
            });
        }
        Err(FloorError::PartialPayment(self))
    }
}

impl From<LinkedPayment> for LinkedPaymentReport {
    fn from(payment: LinkedPayment) -> Self {
        let mut report = LinkedPaymentReport {
            group_id: payment.group_id,
            ..Default::default()
        };
        for LinkedPaymentEntry {
            table_number,
            order_id,
            paid,
            error,
        } in payment.entries
        {
            match (order_id, paid) {
                (Some(id), true) => report.paid.push((table_number, id)),
                (Some(id), false) => report.failed.push((
                    table_number,
                    id,
                    error.unwrap_or_else(|| "unknown error".to_string()),
                )),
                (None, _) => report.skipped.push(table_number),
            }
        }
        report
    }
}
