//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Split Pool Layout                                  │
//! │                                                                         │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pools + run migrations           │
//! │       │                                                                 │
//! │       ├──────────────────────────────┐                                 │
//! │       ▼                              ▼                                 │
//! │  ┌──────────────────────┐   ┌──────────────────────┐                   │
//! │  │    reader pool       │   │    writer pool       │                   │
//! │  │ ┌────┐┌────┐┌────┐   │   │       ┌────┐         │                   │
//! │  │ │ C1 ││ C2 ││ C3 │…  │   │       │ C1 │ (one!)  │                   │
//! │  │ └────┘└────┘└────┘   │   │       └────┘         │                   │
//! │  └──────────┬───────────┘   └──────────┬───────────┘                   │
//! │             │                          │                               │
//! │   Query service, lookups      Issue / Return transactions,             │
//! │   (parallel, snapshot reads)  catalog mutations (serialized)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a Single-Connection Writer Pool?
//! Issue and Return are read-check-write sequences over the item row and the
//! loan ledger. Funneling every write transaction through one connection
//! serializes them completely: two concurrent issues against the last copy
//! cannot interleave, so one succeeds and one observes zero availability.
//! Readers live on their own pool and never queue behind writers (WAL mode).

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::accounts::AccountService;
use crate::circulation::CirculationEngine;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::query::QueryService;
use crate::repository::borrower::BorrowerRepository;
use crate::repository::item::ItemRepository;
use crate::repository::loan::LoanRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/circ.db")
///     .max_readers(5)
///     .connect_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the reader pool.
    /// Default: 5 (the writer pool is always exactly 1)
    pub max_readers: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a reader connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_readers: 5,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of reader connections.
    pub fn max_readers(mut self, max: u32) -> Self {
        self.max_readers = max;
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
    /// An in-memory SQLite database lives inside a single connection, so
    /// reader and writer roles share one single-connection pool here.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_readers: 1, // In-memory requires a single shared connection
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository and service access.
///
/// Cheap to clone: both pools are reference-counted handles.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./circ.db")).await?;
///
/// let receipt = db.circulation().issue(&item_id, "Alice", due).await?;
/// let open = db.queries().active_loans().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// Reader pool: query service and point lookups.
    readers: SqlitePool,

    /// Writer pool (single connection): all mutations.
    writer: SqlitePool,
}

impl Database {
    /// Creates the database pools.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite for circulation workloads:
    ///    - WAL mode so readers never block the writer
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    ///    - 5s busy timeout
    /// 3. Creates the reader pool and the single-connection writer pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path?mode=rwc creates the file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // WAL mode: readers don't block the writer and vice versa
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose the last
            // transaction on power failure
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off for backwards compatibility
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        debug!("Connection options configured");

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options.clone())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        // A second pool against ":memory:" would be a different database
        // entirely, so in-memory setups share the writer's connection.
        let readers = if config.is_in_memory() {
            writer.clone()
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_readers)
                .min_connections(1)
                .acquire_timeout(config.connect_timeout)
                .idle_timeout(Some(config.idle_timeout))
                .connect_with(connect_options)
                .await
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        };

        info!(max_readers = config.max_readers, "Database pools created");

        let db = Database { readers, writer };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Idempotent: applied migrations are tracked in `_sqlx_migrations`.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.writer).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the reader pool.
    ///
    /// For advanced queries not covered by the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.readers
    }

    /// Returns a reference to the single-connection writer pool.
    pub fn writer(&self) -> &SqlitePool {
        &self.writer
    }

    /// Returns the circulation engine (issue/return operations).
    pub fn circulation(&self) -> CirculationEngine {
        CirculationEngine::new(self.writer.clone())
    }

    /// Returns the read-only query service.
    pub fn queries(&self) -> QueryService {
        QueryService::new(self.readers.clone())
    }

    /// Returns the item (catalog) repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.writer.clone())
    }

    /// Returns the loan (ledger) repository. Read-only: loan rows are
    /// written exclusively by the circulation engine.
    pub fn loans(&self) -> LoanRepository {
        LoanRepository::new(self.readers.clone())
    }

    /// Returns the borrower repository.
    pub fn borrowers(&self) -> BorrowerRepository {
        BorrowerRepository::new(self.writer.clone())
    }

    /// Returns the staff account service.
    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.writer.clone())
    }

    /// Closes both connection pools.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pools");
        self.writer.close().await;
        self.readers.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.readers).await.is_ok()
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
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_raw_pools_and_migration_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Both raw pools are live handles onto the migrated database.
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);

        sqlx::query("DELETE FROM loans")
            .execute(db.writer())
            .await
            .unwrap();

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(applied >= 1);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_readers(10)
            .connect_timeout(Duration::from_secs(3));

        assert_eq!(config.max_readers, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
