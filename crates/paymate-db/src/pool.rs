//! # Database Pool Management
//!
//! Connection pool creation and configuration for the SQLite document store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  AppConfig::load ──► DbConfig::from(&config.database)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteDocumentStore ──► Repositories (invoices, payroll, leave, ...)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode so readers never block the writer.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{is_missing_database, DbError, DbResult};
use crate::migrations;
use crate::repository::{
    InvoiceRepository, LeaveRepository, LedgerRepository, PayrollRepository, ProfileRepository,
    Repositories,
};
use crate::store::SqliteDocumentStore;
use crate::DEFAULT_CHANGE_BUFFER;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/paymate.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Create the file if it does not exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Capacity of the change channel behind subscriptions.
    pub change_buffer: usize,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            create_if_missing: true,
            change_buffer: DEFAULT_CHANGE_BUFFER,
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

    /// Sets whether a missing file is created or reported as missing.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets the change-channel capacity.
    pub fn change_buffer(mut self, buffer: usize) -> Self {
        self.change_buffer = buffer;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            create_if_missing: true,
            change_buffer: DEFAULT_CHANGE_BUFFER,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

// =============================================================================
// Database
// =============================================================================

/// SQLite-backed handle: pool, document store and repository access.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    store: Arc<SqliteDocumentStore>,
}

impl Database {
    /// Opens (or creates) the database and runs migrations if enabled.
    ///
    /// ## Errors
    /// - `DatabaseMissing` if the file does not exist and
    ///   `create_if_missing` is off, or cannot be opened
    /// - `ConnectionFailed` / `MigrationFailed` otherwise
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(config.create_if_missing)
        };

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(connect_error)?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let store = Arc::new(SqliteDocumentStore::new(pool.clone(), config.change_buffer));
        let db = Database { pool, store };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn document_store(&self) -> Arc<SqliteDocumentStore> {
        Arc::clone(&self.store)
    }

    /// Repository set over this database's store.
    pub fn repositories(&self) -> Repositories {
        Repositories::new(self.store.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        self.repositories().invoices()
    }

    pub fn payroll(&self) -> PayrollRepository {
        self.repositories().payroll()
    }

    pub fn leave(&self) -> LeaveRepository {
        self.repositories().leave()
    }

    pub fn ledger(&self) -> LedgerRepository {
        self.repositories().ledger()
    }

    pub fn profiles(&self) -> ProfileRepository {
        self.repositories().profiles()
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks that the database answers and the documents table exists.
    ///
    /// ## Errors
    /// `DatabaseMissing` when the schema was never provisioned.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1 FROM documents LIMIT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn connect_error(err: sqlx::Error) -> DbError {
    let message = err.to_string();
    if is_missing_database(&message) {
        DbError::DatabaseMissing(message)
    } else {
        DbError::ConnectionFailed(message)
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
        assert!(db.health_check().await.is_ok());

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_unmigrated_database_reports_missing() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let err = db.health_check().await.unwrap_err();
        assert!(err.is_database_missing());
    }

    #[tokio::test]
    async fn test_missing_file_without_create() {
        let path = std::env::temp_dir().join("paymate-never-created-8d1f.db");
        let config = DbConfig::new(path).create_if_missing(false);

        let err = Database::new(config).await.unwrap_err();
        assert!(err.is_database_missing(), "got {err:?}");
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .change_buffer(16);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.change_buffer, 16);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
