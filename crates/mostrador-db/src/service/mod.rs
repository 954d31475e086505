//! # Core Services
//!
//! The three transactional services of the ledger:
//!
//! - [`stock::StockLedgerService`] — applies stock-affecting events and
//!   appends the immutable movement record
//! - [`sale::SaleService`] — creates and reverses sales, coordinating the
//!   stock ledger and the cash register
//! - [`cash::CashRegisterService`] — register session lifecycle and
//!   reconciliation
//!
//! The cash and stock services never call each other; only the sale
//! service coordinates the two.

pub mod cash;
pub mod sale;
pub mod stock;

use thiserror::Error;

use crate::error::StoreError;
use mostrador_core::{LedgerError, ValidationError};

/// Service-level error: a domain rule violation or a store failure.
///
/// Both sides stay typed so the API layer can map them independently
/// (conflict vs. not-found vs. plain 500).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Ledger(LedgerError::Validation(err))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Store(StoreError::from(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
