//! High-level async API for running migrations.
//!
//! The [`Migrator`] ties a registry, a store path and run options together
//! and exposes the three operations the command line offers. Each one opens
//! its own connection and does its SQLite work on the blocking thread pool,
//! so callers inside a tokio runtime never block an executor thread.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Migrator     │    │  Runner/inspect │    │  Database +     │
//! │ (async facade)  │───▶│  (sync logic)   │───▶│  Ledger (db/)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: configuration and construction of a [`Migrator`]
//! - [`ops`]: `run`, `status` and `verify`
//!
//! # Usage
//!
//! ```rust,no_run
//! use mellow_core::MigratorBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let migrator = MigratorBuilder::new()
//!     .with_database_path(Some("mellowcake.db"))
//!     .best_effort(true)
//!     .build()
//!     .await?;
//!
//! let report = migrator.run().await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{classifier::OutcomeClassifier, registry::Registry, runner::RunOptions};

pub mod builder;
pub mod ops;


pub use builder::MigratorBuilder;

/// Main interface for applying a registry to one store.
pub struct Migrator {
    pub(crate) db_path: PathBuf,
    pub(crate) registry: Arc<Registry>,
    pub(crate) classifier: Arc<dyn OutcomeClassifier>,
    pub(crate) options: RunOptions,
    pub(crate) busy_timeout: Duration,
}

impl Migrator {
    /// Path of the store this migrator targets.
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }
}
