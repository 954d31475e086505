//! # Cash Register Repository
//!
//! Database operations for register sessions and the cash movement ledger.
//!
//! Sessions move `open → closed` exactly once; movements are append-only
//! and cascade away only with their session. Balances are never stored
//! while a session is open — they are summed from the ledger on demand and
//! frozen onto the session row at close time.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use mostrador_core::{CashMovement, CashRegister, Money};

const REGISTER_COLUMNS: &str = "id, status, opened_at, closed_at, opening_amount, \
     closing_amount, expected_amount, difference, note";

const MOVEMENT_COLUMNS: &str =
    "id, cash_register_id, kind, amount, description, category, reference_id, created_at";

/// Per-kind totals over one session's movement ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerTotals {
    pub ingresos: Money,
    pub egresos: Money,
    pub ventas: Money,
    /// Number of venta movements (cash sales) in the session.
    pub num_ventas: i64,
}

impl LedgerTotals {
    /// Signed sum of the ledger: ingresos + ventas − egresos.
    pub fn net(&self) -> Money {
        self.ingresos + self.ventas - self.egresos
    }
}

/// Repository for cash register database operations.
#[derive(Debug, Clone)]
pub struct CashRegisterRepository {
    pool: SqlitePool,
}

impl CashRegisterRepository {
    /// Creates a new CashRegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashRegisterRepository { pool }
    }

    /// Gets a register session by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<CashRegister>> {
        Self::fetch_by_id(&self.pool, id).await
    }

    /// Finds the open session, if any.
    pub async fn get_open(&self) -> StoreResult<Option<CashRegister>> {
        Self::find_open(&self.pool).await
    }

    /// Lists a session's movements in ledger order.
    pub async fn get_movements(&self, register_id: &str) -> StoreResult<Vec<CashMovement>> {
        Self::fetch_movements(&self.pool, register_id).await
    }

    /// Lists all sessions, newest first.
    pub async fn list(&self, limit: i64) -> StoreResult<Vec<CashRegister>> {
        let registers = sqlx::query_as::<_, CashRegister>(&format!(
            "SELECT {REGISTER_COLUMNS} FROM cash_registers ORDER BY opened_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(registers)
    }

    // =========================================================================
    // Executor-parameter operations (transaction-composable)
    // =========================================================================

    /// Fetches a session through the given executor.
    pub async fn fetch_by_id(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
    ) -> StoreResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(&format!(
            "SELECT {REGISTER_COLUMNS} FROM cash_registers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(register)
    }

    /// Finds the open session through the given executor.
    pub async fn find_open(
        executor: impl Executor<'_, Database = Sqlite>,
    ) -> StoreResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(&format!(
            "SELECT {REGISTER_COLUMNS} FROM cash_registers WHERE status = 'open'"
        ))
        .fetch_optional(executor)
        .await?;

        Ok(register)
    }

    /// Finds the most recently closed session (for the opening carry-over).
    pub async fn find_last_closed(
        executor: impl Executor<'_, Database = Sqlite>,
    ) -> StoreResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(&format!(
            "SELECT {REGISTER_COLUMNS} FROM cash_registers \
             WHERE status = 'closed' ORDER BY closed_at DESC LIMIT 1"
        ))
        .fetch_optional(executor)
        .await?;

        Ok(register)
    }

    /// Inserts a new session row.
    pub async fn insert(
        executor: impl Executor<'_, Database = Sqlite>,
        register: &CashRegister,
    ) -> StoreResult<()> {
        debug!(id = %register.id, opening = %register.opening_amount, "Opening register session");

        sqlx::query(
            r#"
            INSERT INTO cash_registers (
                id, status, opened_at, closed_at, opening_amount,
                closing_amount, expected_amount, difference, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&register.id)
        .bind(register.status)
        .bind(register.opened_at)
        .bind(register.closed_at)
        .bind(register.opening_amount)
        .bind(register.closing_amount)
        .bind(register.expected_amount)
        .bind(register.difference)
        .bind(&register.note)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Freezes the close-time amounts onto an open session.
    ///
    /// Guarded by `status = 'open'` so a concurrent close loses cleanly:
    /// zero rows affected means someone else already closed it.
    #[allow(clippy::too_many_arguments)]
    pub async fn close(
        executor: impl Executor<'_, Database = Sqlite>,
        id: &str,
        closing_amount: Money,
        expected_amount: Money,
        difference: Money,
        closed_at: DateTime<Utc>,
        note: Option<&str>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cash_registers SET
                status = 'closed',
                closed_at = ?2,
                closing_amount = ?3,
                expected_amount = ?4,
                difference = ?5,
                note = COALESCE(?6, note)
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(closed_at)
        .bind(closing_amount)
        .bind(expected_amount)
        .bind(difference)
        .bind(note)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Open cash register", id));
        }

        Ok(())
    }

    /// Fetches a session's movements through the given executor.
    pub async fn fetch_movements(
        executor: impl Executor<'_, Database = Sqlite>,
        register_id: &str,
    ) -> StoreResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM cash_movements \
             WHERE cash_register_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(register_id)
        .fetch_all(executor)
        .await?;

        Ok(movements)
    }

    /// Appends one cash movement row.
    pub async fn insert_movement(
        executor: impl Executor<'_, Database = Sqlite>,
        movement: &CashMovement,
    ) -> StoreResult<()> {
        debug!(
            register_id = %movement.cash_register_id,
            kind = %movement.kind,
            amount = %movement.amount,
            "Appending cash movement"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_movements (
                id, cash_register_id, kind, amount,
                description, category, reference_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.cash_register_id)
        .bind(movement.kind)
        .bind(movement.amount)
        .bind(&movement.description)
        .bind(&movement.category)
        .bind(&movement.reference_id)
        .bind(movement.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Sums the session's ledger per kind, straight from the movement rows.
    ///
    /// Derived fresh on every call; nothing here is cached while the
    /// session is open.
    pub async fn ledger_totals(
        executor: impl Executor<'_, Database = Sqlite>,
        register_id: &str,
    ) -> StoreResult<LedgerTotals> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'ingreso' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'egreso'  THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'venta'   THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'venta'   THEN 1 ELSE 0 END), 0)
            FROM cash_movements
            WHERE cash_register_id = ?1
            "#,
        )
        .bind(register_id)
        .fetch_one(executor)
        .await?;

        Ok(LedgerTotals {
            ingresos: Money::from_cents(row.0),
            egresos: Money::from_cents(row.1),
            ventas: Money::from_cents(row.2),
            num_ventas: row.3,
        })
    }
}

/// Helper to generate a new register session ID.
pub fn generate_register_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new cash movement ID.
pub fn generate_cash_movement_id() -> String {
    Uuid::new_v4().to_string()
}
