//! Floor engine errors
//!
//! Four kinds of failure reach the caller:
//! - [`Rejection`]: caught locally before any network call, nothing changed
//! - `Precondition`: the backend refused with a coded error
//! - `Network`: the round-trip itself failed; local state is kept for retry
//! - `PartialPayment`: a linked payment paid some orders but not all

use floor_client::ClientError;
use shared::{ErrorCode, OrderStatus};
use thiserror::Error;

use crate::link::LinkedPaymentReport;

/// Local validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Table {0} already has an order")]
    TableOccupied(String),

    #[error("Table {0} has no active order")]
    TableHasNoOrder(String),

    #[error("Table {0} not found")]
    TableNotFound(String),

    #[error("Select at least two tables to merge (selected {0})")]
    TooFewTables(usize),

    #[error("Table {table} is already linked (group {group_id})")]
    TableAlreadyLinked { table: String, group_id: String },

    #[error("Table {0} is not linked")]
    TableNotLinked(String),

    #[error("Leader table {0} has no active order")]
    LeaderWithoutOrder(String),

    #[error("Cannot merge order into itself")]
    MergeSameOrder,

    #[error("No active order")]
    NoActiveOrder,

    #[error("Order {0} is already persisted and cannot be discarded")]
    NotCancellable(String),

    #[error("Order cannot go from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Client count must be between 1 and {capacity}, got {count}")]
    InvalidClientCount { count: u32, capacity: u32 },
}

impl Rejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            Rejection::TableOccupied(_) => ErrorCode::TableOccupied,
            Rejection::TableHasNoOrder(_) => ErrorCode::TableHasNoOrder,
            Rejection::TableNotFound(_) => ErrorCode::TableNotFound,
            Rejection::TooFewTables(_) => ErrorCode::MergeTooFewTables,
            Rejection::TableAlreadyLinked { .. } => ErrorCode::TableAlreadyLinked,
            Rejection::TableNotLinked(_) => ErrorCode::TableNotLinked,
            Rejection::LeaderWithoutOrder(_) => ErrorCode::LinkLeaderWithoutOrder,
            Rejection::MergeSameOrder => ErrorCode::MergeSameOrder,
            Rejection::NoActiveOrder => ErrorCode::NoActiveOrder,
            Rejection::NotCancellable(_) => ErrorCode::OrderNotCancellable,
            Rejection::InvalidTransition { .. } => ErrorCode::InvalidStatusTransition,
            Rejection::InvalidClientCount { .. } => ErrorCode::InvalidClientCount,
        }
    }
}

#[derive(Debug, Error)]
pub enum FloorError {
    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("{message}")]
    Precondition { code: ErrorCode, message: String },

    #[error("Network error: {0}")]
    Network(#[source] ClientError),

    #[error("{}", .0.summary())]
    PartialPayment(LinkedPaymentReport),
}

impl FloorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FloorError::Rejected(r) => r.code(),
            FloorError::Precondition { code, .. } => *code,
            FloorError::Network(ClientError::Http(e)) if e.is_timeout() => ErrorCode::TimeoutError,
            FloorError::Network(_) => ErrorCode::NetworkError,
            FloorError::PartialPayment(_) => ErrorCode::PaymentPartiallyFailed,
        }
    }

    /// Message shown to staff
    ///
    /// Backend messages are passed through; transport failures get a generic
    /// retry hint since the raw error is meaningless at the counter.
    pub fn user_message(&self) -> String {
        match self {
            FloorError::Network(_) => format!("{}. Please try again.", self.code().message()),
            other => other.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, FloorError::Rejected(_))
    }
}

impl From<ClientError> for FloorError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api(e) => FloorError::Precondition {
                code: e.code,
                message: e.message,
            },
            ClientError::NotFound(msg) => FloorError::Precondition {
                code: ErrorCode::NotFound,
                message: msg,
            },
            ClientError::Validation(msg) => FloorError::Precondition {
                code: ErrorCode::ValidationFailed,
                message: msg,
            },
            other => FloorError::Network(other),
        }
    }
}

pub type FloorResult<T> = Result<T, FloorError>;
