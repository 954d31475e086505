//! # Domain Types
//!
//! Core domain types for the Mostrador ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │      Sale       │   │  CashRegister   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │        │
//! │  │  stock          │◄──│  SaleItem[]     │   │  status         │        │
//! │  │  unit, cost     │   │  grand_total    │──►│  expected_amount│        │
//! │  └────────┬────────┘   └────────┬────────┘   └────────┬────────┘        │
//! │           │ append-only         │ cascade             │ append-only     │
//! │           ▼                     ▼                     ▼                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  StockMovement  │   │    SaleItem     │   │  CashMovement   │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two movement tables are immutable ledgers: rows are appended once and
//! never updated or deleted (short of their parent cascading away). The
//! `stock` scalar on Product and the frozen amounts on a closed CashRegister
//! are the only derived values, and both are rewritten in the same
//! transaction as the ledger append that changes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a stock ledger entry.
///
/// Kinds keep their Spanish wire names (the consuming endpoints and the
/// historical data use them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Starting quantity, emitted once at product creation.
    Inicial,
    /// Restock; always a positive delta.
    Reposicion,
    /// Sale decrement; always negative, references the sale.
    Venta,
    /// Manual correction; any non-zero signed delta.
    Ajuste,
    /// Compensating restock from a reversed sale; always positive.
    Devolucion,
}

impl MovementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inicial => "inicial",
            MovementKind::Reposicion => "reposicion",
            MovementKind::Venta => "venta",
            MovementKind::Ajuste => "ajuste",
            MovementKind::Devolucion => "devolucion",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash; the only method that posts to the register.
    Efectivo,
    /// Card on an external terminal.
    Tarjeta,
    /// Bank transfer.
    Transferencia,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Tarjeta => "tarjeta",
            PaymentMethod::Transferencia => "transferencia",
        }
    }

    /// Whether this method moves physical cash through the register drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Efectivo)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product with its current on-hand stock.
///
/// `stock` is a denormalized scalar over the movement ledger; it is only
/// ever written by the stock ledger service, in the same transaction as the
/// movement append, so it always equals the clamped running sum of the
/// product's movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Base unit label: "unidad", "kg", "litro", ...
    pub unit: String,

    /// Current on-hand quantity. Never negative.
    pub stock: Quantity,

    /// Acquisition cost per base unit.
    pub cost: Money,

    /// Soft-delete flag; inactive products keep their history.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub unit: String,
    pub cost: Money,
    /// Starting quantity; an `inicial` movement is emitted when > 0.
    pub initial_stock: Quantity,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One immutable stock ledger entry.
///
/// `quantity` is the signed delta as requested by the caller; `new_stock`
/// is the clamped result actually applied. On an oversell the two diverge,
/// and both are kept: the row is the auditable record of what was asked
/// and what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub kind: MovementKind,

    /// Signed delta: positive adds stock, negative removes it.
    pub quantity: Quantity,

    /// On-hand stock before this movement.
    pub previous_stock: Quantity,

    /// On-hand stock after: `max(0, previous_stock + quantity)`.
    pub new_stock: Quantity,

    pub note: Option<String>,

    /// Sale id for `venta` and `devolucion` movements.
    pub reference_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,

    /// Human-readable receipt number.
    pub number: String,

    pub grand_total: Money,
    pub payment_method: PaymentMethod,

    pub employee_id: Option<String>,
    pub employee_name: Option<String>,

    /// The register session open at sale time, if any.
    pub cash_register_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
///
/// `product_name` and `unit_price` are snapshots frozen at sale time; the
/// sale history stays accurate even if the product is renamed, repriced or
/// deleted afterwards (`product_id` goes NULL on product deletion).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: Option<String>,
    pub product_name: String,

    /// Number of variants sold.
    pub quantity: Quantity,

    /// Price per variant at sale time.
    pub unit_price: Money,

    /// How many base units one variant represents (the price-tier
    /// quantity, e.g. 5.000 for a 5-litre price).
    pub size: Quantity,

    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Line total: `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.scaled_by(self.quantity)
    }

    /// Stock moved by this line: `quantity × size` base units.
    #[inline]
    pub fn stock_delta(&self) -> Quantity {
        self.quantity.scale(self.size)
    }
}

/// Input line for a new sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub size: Quantity,
}

impl NewSaleLine {
    /// A line priced per single base unit.
    pub fn new(product_id: impl Into<String>, quantity: Quantity, unit_price: Money) -> Self {
        NewSaleLine {
            product_id: product_id.into(),
            quantity,
            unit_price,
            size: Quantity::from_units(1),
        }
    }

    /// Sets the variant size (price-tier quantity).
    pub fn with_size(mut self, size: Quantity) -> Self {
        self.size = size;
        self
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.scaled_by(self.quantity)
    }

    #[inline]
    pub fn stock_delta(&self) -> Quantity {
        self.quantity.scale(self.size)
    }
}

/// Input for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub items: Vec<NewSaleLine>,
    pub payment_method: PaymentMethod,

    /// Caller override, e.g. a manual discount. When absent the total is
    /// computed from the lines.
    pub grand_total: Option<Money>,

    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

impl NewSale {
    pub fn new(items: Vec<NewSaleLine>, payment_method: PaymentMethod) -> Self {
        NewSale {
            items,
            payment_method,
            grand_total: None,
            employee_id: None,
            employee_name: None,
        }
    }

    /// Total computed from the lines: `Σ(unit_price × quantity)`.
    pub fn computed_total(&self) -> Money {
        self.items.iter().map(NewSaleLine::line_total).sum()
    }
}

/// A sale header together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Cash Register
// =============================================================================

/// Register session lifecycle: `none → open → closed` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum RegisterStatus {
    Open,
    Closed,
}

impl RegisterStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RegisterStatus::Open => "open",
            RegisterStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for RegisterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cash register session, bracketed by open and close.
///
/// `expected_amount`, `closing_amount` and `difference` stay NULL while the
/// session is open (the running balance is always recomputed from the
/// movement ledger) and are frozen exactly once at close time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashRegister {
    pub id: String,
    pub status: RegisterStatus,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,

    /// Float the session opened with.
    pub opening_amount: Money,

    /// Physically counted amount at close.
    pub closing_amount: Option<Money>,

    /// Ledger-derived balance frozen at close.
    pub expected_amount: Option<Money>,

    /// `closing_amount − expected_amount`; negative = shortfall.
    pub difference: Option<Money>,

    pub note: Option<String>,
}

impl CashRegister {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }
}

// =============================================================================
// Cash Movement
// =============================================================================

/// The kind of a cash ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CashMovementKind {
    /// Cash put into the drawer.
    Ingreso,
    /// Cash taken out of the drawer.
    Egreso,
    /// Cash received for a sale; posted only through the sale path.
    Venta,
}

impl CashMovementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CashMovementKind::Ingreso => "ingreso",
            CashMovementKind::Egreso => "egreso",
            CashMovementKind::Venta => "venta",
        }
    }
}

impl fmt::Display for CashMovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable cash ledger entry.
///
/// `amount` is always stored positive; the sign is implied by `kind` and
/// applied only when computing balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashMovement {
    pub id: String,
    pub cash_register_id: String,
    pub kind: CashMovementKind,

    /// Always positive.
    pub amount: Money,

    pub description: String,

    /// Free-form bucket for reporting: "venta", "pago_proveedor", ...
    pub category: String,

    /// The sale or external document that produced this entry.
    pub reference_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    /// The amount with its kind's sign applied.
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            CashMovementKind::Ingreso | CashMovementKind::Venta => self.amount,
            CashMovementKind::Egreso => -self.amount,
        }
    }
}

// =============================================================================
// Register Reports
// =============================================================================

/// A register session with its movements and the live expected balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDetail {
    pub register: CashRegister,
    pub movements: Vec<CashMovement>,
    pub expected_amount: Money,
}

/// Close-of-day totals for a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSummary {
    pub register: CashRegister,
    pub expected_amount: Money,
    /// Cash taken for sales during the session.
    pub total_ventas: Money,
    pub num_ventas: i64,
    pub total_ingresos: Money,
    pub total_egresos: Money,
}
