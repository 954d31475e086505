//! # Sale Repository
//!
//! Database operations for sale headers and line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one transaction, driven by SaleService)                     │
//! │     ├── insert_sale() → header                                          │
//! │     ├── insert_item() × N                                               │
//! │     └── one venta stock movement per line                               │
//! │                                                                         │
//! │  2. (OPTIONAL) REVERSE (one transaction)                                │
//! │     ├── one devolucion stock movement per surviving product             │
//! │     └── delete() → cascade removes the items                            │
//! │                                                                         │
//! │  Sales are never updated in place.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use mostrador_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, number, grand_total, payment_method, \
     employee_id, employee_name, cash_register_id, created_at";

const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, product_name, quantity, unit_price, size, created_at";

/// Filter for listing sales.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub cash_register_id: Option<String>,
    pub limit: Option<i64>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> StoreResult<Vec<SaleItem>> {
        Self::fetch_items(&self.pool, sale_id).await
    }

    /// Lists sales matching the filter, newest first.
    pub async fn list(&self, filter: &SaleFilter) -> StoreResult<Vec<Sale>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SALE_COLUMNS} FROM sales WHERE 1 = 1"));

        if let Some(from) = filter.from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND created_at <= ").push_bind(to);
        }
        if let Some(register_id) = &filter.cash_register_id {
            qb.push(" AND cash_register_id = ").push_bind(register_id);
        }

        qb.push(" ORDER BY created_at DESC, rowid DESC");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let sales = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    // =========================================================================
    // Executor-parameter operations (transaction-composable)
    // =========================================================================

    /// Fetches a sale header through the given executor.
    pub async fn fetch_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
    ) -> StoreResult<Option<Sale>> {
        let sale =
            sqlx::query_as::<_, Sale>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(sale)
    }

    /// Fetches a sale's items through the given executor.
    pub async fn fetch_items(
        executor: impl Executor<'_, Database = Sqlite>,
        sale_id: &str,
    ) -> StoreResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(sale_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    /// Inserts a sale header.
    pub async fn insert_sale(executor: impl Executor<'_, Database = Sqlite>, sale: &Sale) -> StoreResult<()> {
        debug!(id = %sale.id, number = %sale.number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, number, grand_total, payment_method,
                employee_id, employee_name, cash_register_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.number)
        .bind(sale.grand_total)
        .bind(sale.payment_method)
        .bind(&sale.employee_id)
        .bind(&sale.employee_name)
        .bind(&sale.cash_register_id)
        .bind(sale.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Inserts one line item.
    ///
    /// ## Snapshot Pattern
    /// Product name and unit price are copied onto the item. The sale
    /// history stays accurate even if the product changes or is deleted
    /// later.
    pub async fn insert_item(executor: impl Executor<'_, Database = Sqlite>, item: &SaleItem) -> StoreResult<()> {
        debug!(sale_id = %item.sale_id, product = %item.product_name, "Adding sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, product_name,
                quantity, unit_price, size, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.size)
        .bind(item.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Deletes a sale row; the items cascade away with it.
    ///
    /// Returns whether a row was actually deleted.
    pub async fn delete(executor: impl Executor<'_, Database = Sqlite>, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Helper to generate a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}
