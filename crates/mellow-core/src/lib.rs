//! Core library for idempotent, additive schema migrations of the
//! Mellowcake chat store.
//!
//! A [`Registry`] lists column additions in the order they were published.
//! The runner applies them to an existing SQLite database, one statement at
//! a time, consulting and updating the `schema_migrations` ledger so every
//! descriptor runs to completion at most once per store. A statement that
//! fails because its column is already there counts as applied; any other
//! failure is reported against that descriptor.
//!
//! # Layers
//!
//! - **Models** ([`models`]): descriptors, ledger entries and reports
//! - **Store** ([`db`]): connection, introspection and the ledger
//! - **Logic** ([`runner`], [`inspect`], [`classifier`]): synchronous
//!   migration and inspection over one connection
//! - **Facade** ([`migrator`]): async entry points on tokio's blocking pool
//! - **Display** ([`display`]): markdown formatting of reports
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mellow_core::{MigrationStatus, MigratorBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let migrator = MigratorBuilder::new()
//!     .with_database_path(Some("mellowcake.db"))
//!     .build()
//!     .await?;
//!
//! let report = migrator.run().await?;
//! for result in report.failures() {
//!     eprintln!("{}: {}", result.id, result.detail.as_deref().unwrap_or(""));
//! }
//! assert_eq!(report.count(MigrationStatus::Failed), 0);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod db;
pub mod display;
pub mod error;
pub mod inspect;
pub mod migrator;
pub mod models;
pub mod registry;
pub mod runner;

// Re-export commonly used types
pub use classifier::{classify, Classification, OutcomeClassifier, SqliteClassifier};
pub use db::{Database, DriftPolicy, DEFAULT_BUSY_TIMEOUT};
pub use display::LedgerStatus;
pub use error::{MigrateError, Result};
pub use migrator::{Migrator, MigratorBuilder};
pub use models::{
    ColumnCheck, ColumnSpec, ColumnType, DefaultValue, ForeignKey, LedgerEntry, LedgerOutcome,
    MigrationDescriptor, MigrationResult, MigrationState, MigrationStatus, RunReport,
    VerifyReport,
};
pub use registry::Registry;
pub use runner::{FailurePolicy, RunOptions, Runner};
