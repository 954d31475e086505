//! # mostrador-core: Pure Domain Logic for the Mostrador Ledger
//!
//! This crate is the heart of the Mostrador inventory & cash ledger. It
//! contains the domain types and rules as pure code with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mostrador Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │              API layer (external collaborator)                  │    │
//! │  │    sale endpoints · stock endpoints · register endpoints        │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                mostrador-db (services + store)                  │    │
//! │  │    StockLedgerService · SaleService · CashRegisterService       │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │             ★ mostrador-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐      │    │
//! │  │   │   types   │ │   money   │ │ quantity  │ │ validation│      │    │
//! │  │   │  Product  │ │   Money   │ │ Quantity  │ │   rules   │      │    │
//! │  │   │   Sale    │ │  (cents)  │ │ (millis)  │ │  checks   │      │    │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────┘      │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, no side effects
//! 2. **Integer arithmetic**: money in cents, quantities in thousandths
//! 3. **Explicit errors**: typed enums, never strings or panics

pub mod error;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

pub use error::{LedgerError, LedgerResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cash movement category used for sale postings.
pub const CATEGORY_SALE: &str = "venta";

/// Cash movement category used by the supplier-payment integration.
pub const CATEGORY_SUPPLIER_PAYMENT: &str = "pago_proveedor";
