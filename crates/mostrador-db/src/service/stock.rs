//! # Stock Ledger Service
//!
//! Applies stock-affecting events to a product and appends the immutable
//! movement record capturing before/after values.
//!
//! ## The Clamp Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  new_stock = max(0, previous_stock + quantity)                          │
//! │                                                                         │
//! │  stock = 5, ajuste of -1000:                                            │
//! │    previous_stock = 5.000                                               │
//! │    new_stock      = 0.000      ← clamped, never negative                │
//! │    quantity       = -1000.000  ← requested delta, recorded verbatim     │
//! │                                                                         │
//! │  The movement row keeps what was asked AND what happened; the two       │
//! │  diverging is the auditable trace of an oversell.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every apply is one transaction over exactly one product row and one
//! movement row; callers composing larger units (the sale service) pass
//! their own connection so the apply joins their transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::repository::product::{generate_product_id, ProductRepository};
use crate::repository::stock::{generate_movement_id, MovementFilter, StockMovementRepository};
use crate::service::ServiceResult;
use mostrador_core::validation::validate_new_product;
use mostrador_core::{
    LedgerError, MovementKind, NewProduct, Product, Quantity, StockMovement,
};

/// Service applying stock-affecting events.
#[derive(Debug, Clone)]
pub struct StockLedgerService {
    pool: SqlitePool,
}

impl StockLedgerService {
    /// Creates a new StockLedgerService.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedgerService { pool }
    }

    /// Registers a product, emitting its `inicial` movement when the
    /// starting quantity is positive.
    ///
    /// Product insert and initial movement are one transaction: a product
    /// never exists with stock but no ledger entry explaining it.
    pub async fn register_product(&self, new_product: NewProduct) -> ServiceResult<Product> {
        validate_new_product(&new_product)?;

        let now = Utc::now();
        let mut product = Product {
            id: generate_product_id(),
            name: new_product.name.trim().to_string(),
            unit: new_product.unit.trim().to_string(),
            stock: Quantity::ZERO,
            cost: new_product.cost,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        ProductRepository::insert(&mut *tx, &product).await?;

        if new_product.initial_stock.is_positive() {
            let movement = Self::apply_on(
                &mut tx,
                &product.id,
                MovementKind::Inicial,
                new_product.initial_stock,
                Some("Stock inicial".to_string()),
                None,
                now,
            )
            .await?;
            product.stock = movement.new_stock;
        }

        tx.commit().await?;

        info!(id = %product.id, name = %product.name, stock = %product.stock, "Product registered");
        Ok(product)
    }

    /// Applies one stock-affecting event and appends its movement record.
    ///
    /// ## Per-kind policy
    /// - `reposicion`: quantity must be positive
    /// - `ajuste`: any non-zero signed quantity
    /// - `inicial` / `devolucion`: positive
    /// - `venta`: negative
    ///
    /// Violations fail with [`LedgerError::InvalidQuantity`]. The clamp
    /// rule applies to all kinds: stock never goes below zero.
    pub async fn apply_movement(
        &self,
        product_id: &str,
        kind: MovementKind,
        quantity: Quantity,
        note: Option<String>,
        reference_id: Option<String>,
    ) -> ServiceResult<StockMovement> {
        check_quantity_policy(kind, quantity)?;

        let mut tx = self.pool.begin().await?;
        let movement = Self::apply_on(
            &mut tx,
            product_id,
            kind,
            quantity,
            note,
            reference_id,
            Utc::now(),
        )
        .await?;
        tx.commit().await?;

        info!(
            product_id = %product_id,
            kind = %kind,
            quantity = %quantity,
            new_stock = %movement.new_stock,
            "Stock movement applied"
        );
        Ok(movement)
    }

    /// Lists movements matching the filter.
    pub async fn movements(&self, filter: &MovementFilter) -> ServiceResult<Vec<StockMovement>> {
        let movements = StockMovementRepository::new(self.pool.clone())
            .list(filter)
            .await?;
        Ok(movements)
    }

    // =========================================================================
    // Transaction-composable core
    // =========================================================================

    /// Applies a movement on the caller's connection.
    ///
    /// This is the single write path for product stock: read the current
    /// value, clamp, write the scalar, append the movement. Callers that
    /// compose several applies (sale creation, reversal) wrap them in one
    /// transaction and pass it here, so the whole unit commits or rolls
    /// back together.
    pub(crate) async fn apply_on(
        conn: &mut SqliteConnection,
        product_id: &str,
        kind: MovementKind,
        quantity: Quantity,
        note: Option<String>,
        reference_id: Option<String>,
        now: DateTime<Utc>,
    ) -> ServiceResult<StockMovement> {
        let product = ProductRepository::fetch_by_id(&mut *conn, product_id)
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))?;

        let previous_stock = product.stock;
        let new_stock = (previous_stock + quantity).floor_zero();

        ProductRepository::set_stock(&mut *conn, product_id, new_stock, now).await?;

        let movement = StockMovement {
            id: generate_movement_id(),
            product_id: product_id.to_string(),
            kind,
            quantity,
            previous_stock,
            new_stock,
            note,
            reference_id,
            created_at: now,
        };
        StockMovementRepository::insert(&mut *conn, &movement).await?;

        Ok(movement)
    }
}

/// Checks the sign policy for a movement kind.
fn check_quantity_policy(kind: MovementKind, quantity: Quantity) -> Result<(), LedgerError> {
    let ok = match kind {
        MovementKind::Reposicion => quantity.is_positive(),
        MovementKind::Ajuste => !quantity.is_zero(),
        MovementKind::Inicial | MovementKind::Devolucion => quantity.is_positive(),
        MovementKind::Venta => quantity.is_negative(),
    };

    if ok {
        Ok(())
    } else {
        Err(LedgerError::InvalidQuantity { kind, quantity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_reposicion_positive_only() {
        assert!(check_quantity_policy(MovementKind::Reposicion, Quantity::from_units(1)).is_ok());
        assert!(check_quantity_policy(MovementKind::Reposicion, Quantity::ZERO).is_err());
        assert!(
            check_quantity_policy(MovementKind::Reposicion, Quantity::from_units(-1)).is_err()
        );
    }

    #[test]
    fn test_policy_ajuste_nonzero() {
        assert!(check_quantity_policy(MovementKind::Ajuste, Quantity::from_units(-3)).is_ok());
        assert!(check_quantity_policy(MovementKind::Ajuste, Quantity::from_units(3)).is_ok());
        assert!(check_quantity_policy(MovementKind::Ajuste, Quantity::ZERO).is_err());
    }

    #[test]
    fn test_policy_venta_negative() {
        assert!(check_quantity_policy(MovementKind::Venta, Quantity::from_units(-1)).is_ok());
        assert!(check_quantity_policy(MovementKind::Venta, Quantity::from_units(1)).is_err());
    }

    #[test]
    fn test_policy_devolucion_positive() {
        assert!(check_quantity_policy(MovementKind::Devolucion, Quantity::from_units(1)).is_ok());
        assert!(check_quantity_policy(MovementKind::Devolucion, Quantity::ZERO).is_err());
    }
}
