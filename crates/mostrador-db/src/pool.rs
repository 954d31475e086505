//! # Database Pool Management
//!
//! Connection pool creation and configuration for the SQLite ledger store.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers, writers don't block readers
//! - Better crash recovery
//!
//! The single-writer lock that remains is what serializes the ledger's
//! read-modify-write cycles: two terminals selling the same product
//! contend on the write lock, never on each other's stale reads.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::cash::CashRegisterRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock::StockMovementRepository;
use crate::service::cash::CashRegisterService;
use crate::service::sale::SaleService;
use crate::service::stock::StockLedgerService;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/mostrador.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a handful of terminals)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The database file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository and service access.
///
/// Cheap to clone; all accessors share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite for ledger workloads:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled (cascades depend on it)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path with mode=rwc creates the file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off; the cascade deletes in the
            // schema require them on
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by repositories or services.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Repositories (plain reads and writes)
    // =========================================================================

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the stock movement repository.
    pub fn stock_movements(&self) -> StockMovementRepository {
        StockMovementRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Returns the cash register repository.
    pub fn registers(&self) -> CashRegisterRepository {
        CashRegisterRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Services (transactional operations)
    // =========================================================================

    /// Returns the stock ledger service.
    pub fn stock_ledger(&self) -> StockLedgerService {
        StockLedgerService::new(self.pool.clone())
    }

    /// Returns the sale transaction service.
    pub fn sale_service(&self) -> SaleService {
        SaleService::new(self.pool.clone())
    }

    /// Returns the cash register service.
    pub fn cash_service(&self) -> CashRegisterService {
        CashRegisterService::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }
}
