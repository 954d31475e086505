//! # mostrador-db: Ledger Store & Services for Mostrador
//!
//! SQLite persistence and the three core services of the transactional
//! inventory & cash ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mostrador Data Flow                               │
//! │                                                                         │
//! │  API layer (external)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   mostrador-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌────────────────────┐        ┌────────────────────────────┐  │    │
//! │  │   │     services       │        │        repository          │  │    │
//! │  │   │ StockLedgerService │───────►│ ProductRepository          │  │    │
//! │  │   │ SaleService        │        │ StockMovementRepository    │  │    │
//! │  │   │ CashRegisterService│        │ SaleRepository             │  │    │
//! │  │   └────────────────────┘        │ CashRegisterRepository     │  │    │
//! │  │                                 └────────────────────────────┘  │    │
//! │  │   ┌───────────────┐    ┌───────────────┐                        │    │
//! │  │   │   Database    │    │  Migrations   │                        │    │
//! │  │   │   (pool.rs)   │    │  (embedded)   │                        │    │
//! │  │   └───────────────┘    └───────────────┘                        │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL, foreign keys on)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mostrador_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/mostrador.db")).await?;
//!
//! let product = db.stock_ledger().register_product(new_product).await?;
//! let register = db.cash_service().open_register(None, None).await?;
//! let sale = db.sale_service().create_sale(new_sale).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use service::{ServiceError, ServiceResult};

// Repository re-exports for convenience
pub use repository::cash::CashRegisterRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleFilter, SaleRepository};
pub use repository::stock::{MovementFilter, StockMovementRepository};

// Service re-exports
pub use service::cash::CashRegisterService;
pub use service::sale::SaleService;
pub use service::stock::StockLedgerService;
