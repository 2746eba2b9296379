//! # paymate-db: Document Store for PayMate
//!
//! Owner-scoped document collections with live subscriptions, backed by
//! SQLite through sqlx or by an in-process map.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PayMate Data Flow                                │
//! │                                                                         │
//! │  Caller (seed / payroll binaries, front end bridge)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  paymate-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Store     │  │   │
//! │  │   │   (pool.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ InvoiceRepo   │    │ Collection<T>│  │   │
//! │  │   │ SqlitePool    │───►│ PayrollRepo   │───►│ subscribe()  │  │   │
//! │  │   │ Migrations    │    │ LeaveRepo     │    │ watch()      │  │   │
//! │  │   │               │    │ LedgerRepo    │    │ change events│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        SQLite `documents` table  |  MemoryDocumentStore         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered application configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`store`] - Document store trait, backends, typed collections
//! - [`repository`] - Invoice, payroll, leave, ledger, profile and attendance operations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paymate_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("paymate.db")).await?;
//!
//! let mut draft = db.invoices().create_draft(&uid, today).await?;
//! db.invoices().save(&mut draft).await?;
//!
//! let mut live = db.ledger().subscribe_summary(&uid);
//! while let Some(summary) = live.next().await {
//!     println!("{:?}", summary?);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, Backend, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    AttendanceRepository, InvoiceRepository, LeaveRepository, LedgerRepository, PayrollRepository, ProfileRepository,
    Repositories,
};
pub use store::{
    ChangeEvent, ChangeKind, Collection, Document, DocumentStore, MemoryDocumentStore,
    SqliteDocumentStore,
};

use tracing_subscriber::EnvFilter;

/// Change-channel capacity. A subscriber that falls further behind than
/// this resynchronises from a fresh snapshot.
pub const DEFAULT_CHANGE_BUFFER: usize = 256;

/// Initializes the tracing subscriber for the binaries.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=paymate_db=trace` - Trace this crate only
/// - Default: INFO, with DEBUG for the paymate crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,paymate_db=debug,paymate_core=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
