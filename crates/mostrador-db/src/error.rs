//! # Store Error Types
//!
//! Error types for ledger store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← adds context and categorization             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (service layer) ← joined with LedgerError                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (the API layer) surfaces the typed failure                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Ledger store operation errors.
///
/// Wrap sqlx errors and add context for debugging and caller feedback.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// Raised by duplicate sale numbers and by the partial unique index
    /// guarding the single open register session.
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
