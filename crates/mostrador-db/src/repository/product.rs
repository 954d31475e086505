//! # Product Repository
//!
//! Database operations for products.
//!
//! The `stock` column is owned by the stock ledger service: nothing else
//! writes it, and it is only ever written together with a movement append
//! in the same transaction.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use mostrador_core::{Product, Quantity};

const PRODUCT_COLUMNS: &str = "id, name, unit, stock, cost, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Lists active products ordered by name.
    pub async fn list_active(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical sale items keep their snapshot; the movement ledger stays
    /// attached to the row.
    pub async fn soft_delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Executor-parameter operations (transaction-composable)
    // =========================================================================

    /// Fetches a product through the given executor.
    ///
    /// Pass a transaction to read stock consistently with in-flight writes.
    pub async fn fetch_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
    ) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(executor: impl Executor<'_, Database = Sqlite>, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, unit, stock, cost, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.unit)
        .bind(product.stock)
        .bind(product.cost)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Writes the product's stock scalar.
    ///
    /// Only the stock ledger service calls this, inside the same
    /// transaction as the movement append.
    pub async fn set_stock(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
        stock: Quantity,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(id = %id, stock = %stock, "Updating stock");

        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(now)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
