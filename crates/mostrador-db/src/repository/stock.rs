//! # Stock Movement Repository
//!
//! Append and read operations for the stock ledger. Movements are
//! append-only: there is no update or single-row delete here, and the only
//! way a row disappears is the cascade from its product.

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use mostrador_core::{MovementKind, StockMovement};

const MOVEMENT_COLUMNS: &str =
    "id, product_id, kind, quantity, previous_stock, new_stock, note, reference_id, created_at";

/// Filter for listing stock movements.
///
/// All fields are optional; an empty filter lists everything (newest
/// first, capped by `limit`).
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub product_id: Option<String>,
    pub kind: Option<MovementKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl MovementFilter {
    pub fn for_product(product_id: impl Into<String>) -> Self {
        MovementFilter {
            product_id: Some(product_id.into()),
            ..Default::default()
        }
    }
}

/// Repository for stock ledger operations.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    /// Creates a new StockMovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Lists movements matching the filter, newest first.
    pub async fn list(&self, filter: &MovementFilter) -> StoreResult<Vec<StockMovement>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE 1 = 1"
        ));

        if let Some(product_id) = &filter.product_id {
            qb.push(" AND product_id = ").push_bind(product_id);
        }
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind);
        }
        if let Some(from) = filter.from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND created_at <= ").push_bind(to);
        }

        qb.push(" ORDER BY created_at DESC, rowid DESC");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let movements = qb
            .build_query_as::<StockMovement>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = movements.len(), "Listed stock movements");
        Ok(movements)
    }

    /// Lists the movements that reference a sale (venta / devolucion).
    pub async fn list_for_reference(&self, reference_id: &str) -> StoreResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE reference_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    // =========================================================================
    // Executor-parameter operations (transaction-composable)
    // =========================================================================

    /// Appends one movement row.
    pub async fn insert(
        executor: impl Executor<'_, Database = Sqlite>,
        movement: &StockMovement,
    ) -> StoreResult<()> {
        debug!(
            product_id = %movement.product_id,
            kind = %movement.kind,
            quantity = %movement.quantity,
            "Appending stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, kind, quantity, previous_stock, new_stock,
                note, reference_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(&movement.note)
        .bind(&movement.reference_id)
        .bind(movement.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }
}

/// Helper to generate a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}
