//! Migration operations for the Migrator.

use std::sync::{atomic::AtomicBool, Arc};

use tokio::task;

use super::Migrator;
use crate::{
    db::Database,
    error::{MigrateError, Result},
    inspect,
    models::{MigrationState, RunReport, VerifyReport},
    runner::Runner,
};

impl Migrator {
    /// Applies the registry in declaration order.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_with_interrupt(None).await
    }

    /// Applies the registry, stopping before the next descriptor once
    /// `interrupt` is raised.
    pub async fn run_with_interrupt(&self, interrupt: Option<Arc<AtomicBool>>) -> Result<RunReport> {
        let db_path = self.db_path.clone();
        let registry = Arc::clone(&self.registry);
        let classifier = Arc::clone(&self.classifier);
        let options = self.options;
        let busy_timeout = self.busy_timeout;

        task::spawn_blocking(move || {
            let db = Database::open(&db_path, busy_timeout)?;
            let runner = Runner::new(&db, classifier.as_ref(), options);
            match interrupt.as_deref() {
                Some(flag) => runner.with_interrupt(flag).run(&registry),
                None => runner.run(&registry),
            }
        })
        .await
        .map_err(|e| MigrateError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Ledger entry and live presence of each registered migration.
    pub async fn status(&self) -> Result<Vec<MigrationState>> {
        let db_path = self.db_path.clone();
        let registry = Arc::clone(&self.registry);
        let busy_timeout = self.busy_timeout;

        task::spawn_blocking(move || {
            let db = Database::open(&db_path, busy_timeout)?;
            inspect::status(&db, &registry)
        })
        .await
        .map_err(|e| MigrateError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Checks every registered column against the live schema.
    pub async fn verify(&self) -> Result<VerifyReport> {
        let db_path = self.db_path.clone();
        let registry = Arc::clone(&self.registry);
        let busy_timeout = self.busy_timeout;

        task::spawn_blocking(move || {
            let db = Database::open(&db_path, busy_timeout)?;
            inspect::verify(&db, &registry)
        })
        .await
        .map_err(|e| MigrateError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
