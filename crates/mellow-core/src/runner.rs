//! Sequential migration runner.
//!
//! Each descriptor moves through a small state machine, strictly in
//! declaration order:
//!
//! ```text
//! Pending ──ledger says applied──────────────────────────────▶ Skipped
//!    │
//!    └──▶ Attempting ──ok──────────────▶ record(applied) ─────▶ Applied
//!              │
//!              └──err──▶ classify ──already-present──▶ record ▶ Applied
//!                              │
//!                              └──fatal──────────────────────▶ Failed
//! ```
//!
//! A failure aborts the run by default; [`FailurePolicy::BestEffort`] keeps
//! going so one report shows every independent failure. The ledger is written
//! only after a statement has taken effect, so an interrupted run leaves it
//! describing exactly what completed and the next run resumes at the first
//! unapplied descriptor.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};

use crate::{
    classifier::{Classification, OutcomeClassifier},
    db::{AppliedState, Database, DriftPolicy, Ledger},
    error::Result,
    models::{LedgerOutcome, MigrationDescriptor, MigrationStatus, RunReport},
    registry::Registry,
};

/// What to do after a descriptor fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; later descriptors may depend on it
    #[default]
    Abort,

    /// Record the failure and continue with the next descriptor
    BestEffort,
}

/// Options for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub failure_policy: FailurePolicy,
    pub drift_policy: DriftPolicy,
    /// Report what would run without executing DDL or writing the ledger
    pub dry_run: bool,
}

/// Applies a registry to one store.
pub struct Runner<'a> {
    db: &'a Database,
    classifier: &'a dyn OutcomeClassifier,
    options: RunOptions,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a> Runner<'a> {
    pub fn new(db: &'a Database, classifier: &'a dyn OutcomeClassifier, options: RunOptions) -> Self {
        Self {
            db,
            classifier,
            options,
            interrupt: None,
        }
    }

    /// Stops the run before the next descriptor once `flag` is raised. The
    /// descriptor in flight always completes.
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Runs every descriptor of the registry in order.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::StoreUnreachable` if the store does not answer
    /// before the first statement, and `MigrateError::Database` if the ledger
    /// cannot be read or written mid-run. Failing statements are not errors;
    /// they appear as failed results in the report.
    pub fn run(&self, registry: &Registry) -> Result<RunReport> {
        let ledger = Ledger::open(self.db, self.options.drift_policy)?;
        let mut report = RunReport::new(self.options.dry_run);

        info!(
            "Running {} migrations against {}{}",
            registry.len(),
            self.db.path().display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let descriptors = registry.descriptors();
        for (position, descriptor) in descriptors.iter().enumerate() {
            if self.interrupted() {
                warn!("Interrupted before {}", descriptor.id());
                report.interrupted = true;
                report.not_attempted = ids(&descriptors[position..]);
                break;
            }

            let status = self.run_one(&ledger, descriptor, &mut report)?;
            if status == MigrationStatus::Failed
                && self.options.failure_policy == FailurePolicy::Abort
            {
                report.not_attempted = ids(&descriptors[position + 1..]);
                if !report.not_attempted.is_empty() {
                    warn!(
                        "Aborting; {} migrations not attempted",
                        report.not_attempted.len()
                    );
                }
                break;
            }
        }

        Ok(report)
    }

    fn run_one(
        &self,
        ledger: &Ledger<'_>,
        descriptor: &MigrationDescriptor,
        report: &mut RunReport,
    ) -> Result<MigrationStatus> {
        let id = descriptor.id();
        let drift_note = match ledger.lookup(descriptor)? {
            AppliedState::Recorded(entry) => {
                debug!("{id}: recorded as {}, skipping", entry.outcome.as_str());
                let detail = format!("recorded {} at {}", entry.outcome.as_str(), entry.applied_at);
                report.push(id, MigrationStatus::Skipped, Some(detail));
                return Ok(MigrationStatus::Skipped);
            }
            AppliedState::PresentInSchema => {
                debug!("{id}: column present before ledger existed, skipping");
                if !self.options.dry_run {
                    ledger.record_applied(id, LedgerOutcome::AlreadyPresent)?;
                }
                report.push(
                    id,
                    MigrationStatus::Skipped,
                    Some("column already present".to_string()),
                );
                return Ok(MigrationStatus::Skipped);
            }
            AppliedState::Drifted(_) => Some("recorded but missing from schema; re-applied"),
            AppliedState::Missing => None,
        };

        if self.options.dry_run {
            report.push(
                id,
                MigrationStatus::WouldApply,
                Some(descriptor.statement().to_string()),
            );
            return Ok(MigrationStatus::WouldApply);
        }

        debug!("{id}: executing {}", descriptor.statement());
        let outcome = match self.db.execute_ddl(descriptor.statement()) {
            Ok(()) => LedgerOutcome::Applied,
            Err(e) => match self.classifier.classify(&e) {
                Classification::AlreadyPresent => {
                    info!("{id}: already present ({e})");
                    LedgerOutcome::AlreadyPresent
                }
                Classification::Fatal => {
                    error!("{id}: failed: {e}");
                    report.push(id, MigrationStatus::Failed, Some(e.to_string()));
                    return Ok(MigrationStatus::Failed);
                }
            },
        };

        ledger.record_applied(id, outcome)?;
        info!("{id}: {}", outcome.as_str());

        let detail = match (outcome, drift_note) {
            (LedgerOutcome::AlreadyPresent, _) => Some("column already present".to_string()),
            (LedgerOutcome::Applied, note) => note.map(str::to_string),
        };
        report.push(id, MigrationStatus::Applied, detail);
        Ok(MigrationStatus::Applied)
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

fn ids(descriptors: &[MigrationDescriptor]) -> Vec<String> {
    descriptors.iter().map(|d| d.id().to_string()).collect()
}
