//! Builder for creating and configuring Migrator instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::task;

use super::Migrator;
use crate::{
    classifier::{OutcomeClassifier, SqliteClassifier},
    db::{Database, DriftPolicy, DEFAULT_BUSY_TIMEOUT},
    error::{MigrateError, Result},
    registry::Registry,
    runner::{FailurePolicy, RunOptions},
};

/// Builder for creating and configuring Migrator instances.
pub struct MigratorBuilder {
    database_path: Option<PathBuf>,
    registry: Option<Registry>,
    classifier: Arc<dyn OutcomeClassifier>,
    options: RunOptions,
    busy_timeout: Duration,
}

impl MigratorBuilder {
    /// Creates a new builder with default settings: built-in registry, abort
    /// on first failure, reconcile drift, five second busy timeout.
    pub fn new() -> Self {
        Self {
            database_path: None,
            registry: None,
            classifier: Arc::new(SqliteClassifier),
            options: RunOptions::default(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/mellowcake/mellowcake.db` or
    /// `~/.local/share/mellowcake/mellowcake.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the built-in registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the SQLite error classification rules.
    pub fn with_classifier(mut self, classifier: Arc<dyn OutcomeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Bounds how long a statement waits on another connection's lock.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Continue past failed descriptors instead of aborting.
    pub fn best_effort(mut self, enabled: bool) -> Self {
        self.options.failure_policy = if enabled {
            FailurePolicy::BestEffort
        } else {
            FailurePolicy::Abort
        };
        self
    }

    /// Report without executing DDL or writing the ledger.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.options.dry_run = enabled;
        self
    }

    pub fn drift_policy(mut self, policy: DriftPolicy) -> Self {
        self.options.drift_policy = policy;
        self
    }

    /// Builds the configured migrator.
    ///
    /// The registry is resolved first, so configuration errors surface
    /// before the store is touched. The store is then opened once to confirm
    /// it is reachable.
    ///
    /// # Errors
    ///
    /// Returns a configuration-class error for an invalid built-in registry,
    /// `MigrateError::XdgDirectory` if the default path cannot be resolved,
    /// and `MigrateError::StoreUnreachable` if the store cannot be opened.
    pub async fn build(self) -> Result<Migrator> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => Registry::builtin()?,
        };

        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        let db_path_clone = db_path.clone();
        let busy_timeout = self.busy_timeout;
        task::spawn_blocking(move || {
            let _db = Database::open(&db_path_clone, busy_timeout)?;
            Ok::<(), MigrateError>(())
        })
        .await
        .map_err(|e| MigrateError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(Migrator {
            db_path,
            registry: Arc::new(registry),
            classifier: self.classifier,
            options: self.options,
            busy_timeout,
        })
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("mellowcake")
            .place_data_file("mellowcake.db")
            .map_err(|e| MigrateError::XdgDirectory(e.to_string()))
    }
}

impl Default for MigratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
