//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// No order is currently selected on this terminal
    NoActiveOrder = 4008,
    /// Persisted orders cannot be discarded
    OrderNotCancellable = 4009,
    /// Source and target of an order merge are the same
    MergeSameOrder = 4010,
    /// Order status cannot move from its current state to the requested one
    InvalidStatusTransition = 4011,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Some orders of a linked payment were paid, others were not
    PaymentPartiallyFailed = 5006,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied
    TableOccupied = 7002,
    /// Table has no active order
    TableHasNoOrder = 7003,
    /// Fewer than two tables selected for a merge
    MergeTooFewTables = 7004,
    /// Table already belongs to a link group
    TableAlreadyLinked = 7005,
    /// Table does not belong to a link group
    TableNotLinked = 7006,
    /// Link leader has no active order
    LinkLeaderWithoutOrder = 7007,
    /// Client count outside 1..=capacity
    InvalidClientCount = 7008,

    // ==================== 9xxx: System ====================
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the user-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::NoActiveOrder => "No order is selected",
            ErrorCode::OrderNotCancellable => "Only unsent orders can be discarded",
            ErrorCode::MergeSameOrder => "Cannot merge an order into itself",
            ErrorCode::InvalidStatusTransition => "Order cannot change to that status",

            // Payment
            ErrorCode::PaymentFailed => "Payment failed",
            ErrorCode::PaymentPartiallyFailed => "Some linked orders could not be paid",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table already has an order",
            ErrorCode::TableHasNoOrder => "Table has no active order",
            ErrorCode::MergeTooFewTables => "Select at least two tables to merge",
            ErrorCode::TableAlreadyLinked => "Table is already linked to another group",
            ErrorCode::TableNotLinked => "Table is not linked",
            ErrorCode::LinkLeaderWithoutOrder => "The leading table needs an active order",
            ErrorCode::InvalidClientCount => "Number of guests exceeds table capacity",

            // System
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4008 => Ok(ErrorCode::NoActiveOrder),
            4009 => Ok(ErrorCode::OrderNotCancellable),
            4010 => Ok(ErrorCode::MergeSameOrder),
            4011 => Ok(ErrorCode::InvalidStatusTransition),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5006 => Ok(ErrorCode::PaymentPartiallyFailed),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableHasNoOrder),
            7004 => Ok(ErrorCode::MergeTooFewTables),
            7005 => Ok(ErrorCode::TableAlreadyLinked),
            7006 => Ok(ErrorCode::TableNotLinked),
            7007 => Ok(ErrorCode::LinkLeaderWithoutOrder),
            7008 => Ok(ErrorCode::InvalidClientCount),

            // System
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::NoActiveOrder.code(), 4008);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 4011);
        assert_eq!(ErrorCode::PaymentPartiallyFailed.code(), 5006);
        assert_eq!(ErrorCode::TableOccupied.code(), 7002);
        assert_eq!(ErrorCode::TableAlreadyLinked.code(), 7005);
        assert_eq!(ErrorCode::LinkLeaderWithoutOrder.code(), 7007);
        assert_eq!(ErrorCode::NetworkError.code(), 9003);
    }

    #[test]
    fn test_try_from_roundtrip_all_codes() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderAlreadyPaid,
            ErrorCode::NoActiveOrder,
            ErrorCode::OrderNotCancellable,
            ErrorCode::MergeSameOrder,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::PaymentFailed,
            ErrorCode::PaymentPartiallyFailed,
            ErrorCode::TableNotFound,
            ErrorCode::TableOccupied,
            ErrorCode::TableHasNoOrder,
            ErrorCode::MergeTooFewTables,
            ErrorCode::TableAlreadyLinked,
            ErrorCode::TableNotLinked,
            ErrorCode::LinkLeaderWithoutOrder,
            ErrorCode::InvalidClientCount,
            ErrorCode::NetworkError,
            ErrorCode::TimeoutError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(1001), Err(InvalidErrorCode(1001)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableOccupied).unwrap();
        assert_eq!(json, "7002");

        let code: ErrorCode = serde_json::from_str("7005").unwrap();
        assert_eq!(code, ErrorCode::TableAlreadyLinked);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::TableNotLinked), "7006");
        assert_eq!(format!("{}", InvalidErrorCode(999)), "invalid error code: 999");
    }
}
