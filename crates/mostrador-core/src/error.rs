//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                      │
//! │  └── LedgerError      - Business rule violations                        │
//! │                                                                         │
//! │  mostrador-db errors (separate crate)                                   │
//! │  ├── StoreError       - Database operation failures                     │
//! │  └── ServiceError     - Ledger | Store union at the service boundary    │
//! │                                                                         │
//! │  Flow: LedgerError / StoreError → ServiceError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts, kinds)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::MovementKind;

/// Ledger business rule violations.
///
/// Every variant is surfaced to the caller as a typed failure; nothing here
/// is swallowed except by the one documented best-effort path (the cash
/// posting inside sale creation, which logs and continues).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Product referenced by id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale referenced by id does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Register session referenced by id does not exist.
    #[error("Cash register not found: {0}")]
    RegisterNotFound(String),

    /// Movement quantity violates the policy for its kind:
    /// a non-positive `reposicion`, or a zero `ajuste`.
    #[error("Invalid quantity {quantity} for {kind} movement")]
    InvalidQuantity {
        kind: MovementKind,
        quantity: Quantity,
    },

    /// Non-positive amount on a cash movement, or a negative counted
    /// amount on a register close.
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Money },

    /// A register session is already open; only one may be open at a time.
    #[error("A cash register is already open: {open_id}")]
    RegisterAlreadyOpen { open_id: String },

    /// The session was already closed; closed sessions are immutable.
    #[error("Cash register {0} is already closed")]
    RegisterAlreadyClosed(String),

    /// The session is not open, so it cannot accept cash movements.
    #[error("Cash register {0} is not open")]
    RegisterNotOpen(String),

    /// A sale must carry at least one line item.
    #[error("Sale has no line items")]
    EmptySale,

    /// Input validation failure (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Input validation errors.
///
/// Raised before business logic runs, for input that doesn't meet basic
/// shape requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InvalidQuantity {
            kind: MovementKind::Reposicion,
            quantity: Quantity::from_millis(-2000),
        };
        assert_eq!(
            err.to_string(),
            "Invalid quantity -2.000 for reposicion movement"
        );

        let err = LedgerError::InvalidAmount {
            amount: Money::from_cents(-100),
        };
        assert_eq!(err.to_string(), "Invalid amount: -1.00");
    }

    #[test]
    fn test_register_errors_carry_ids() {
        let err = LedgerError::RegisterAlreadyOpen {
            open_id: "abc".to_string(),
        };
        assert!(err.to_string().contains("abc"));

        let err = LedgerError::RegisterNotOpen("xyz".to_string());
        assert!(err.to_string().contains("xyz"));
    }
}
