//! # Database Migrations
//!
//! Embedded SQL migrations for the Mostrador ledger store.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_combo_tables.sql`)
//! 3. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 4. NEVER modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// The `sqlx::migrate!()` macro embeds all SQL files from the specified
/// directory into the binary at compile time. No runtime file access needed.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent and ordered: applied migrations are tracked in the
/// `_sqlx_migrations` table and each migration runs in its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns (total_migrations, applied_migrations), for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
