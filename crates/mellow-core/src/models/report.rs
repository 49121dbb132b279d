//! Run report: the per-invocation summary of what ran, what was skipped and
//! what failed.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Final state a descriptor reached within one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationStatus {
    /// The statement ran, or the column turned out to be present already
    Applied,

    /// Already recorded (or found in the schema); no statement executed
    Skipped,

    /// The statement failed with a non-benign error
    Failed,

    /// Dry run only: the statement would be executed
    WouldApply,
}

impl MigrationStatus {
    /// Lowercase label used in text output.
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Applied => "applied",
            MigrationStatus::Skipped => "skipped",
            MigrationStatus::Failed => "failed",
            MigrationStatus::WouldApply => "would apply",
        }
    }

    /// Status label prefixed with an icon, for list display.
    ///
    /// ```rust
    /// use mellow_core::models::MigrationStatus;
    ///
    /// assert_eq!(MigrationStatus::Applied.with_icon(), "✓ applied");
    /// assert_eq!(MigrationStatus::Failed.with_icon(), "✗ failed");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            MigrationStatus::Applied => "✓ applied",
            MigrationStatus::Skipped => "○ skipped",
            MigrationStatus::Failed => "✗ failed",
            MigrationStatus::WouldApply => "➤ would apply",
        }
    }
}

/// Result for a single descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MigrationResult {
    /// Descriptor id
    pub id: String,

    /// Terminal state reached in this run
    pub status: MigrationStatus,

    /// Explanation; for failures, the raw engine message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl MigrationResult {
    pub fn new(id: impl Into<String>, status: MigrationStatus, detail: Option<String>) -> Self {
        Self {
            id: id.into(),
            status,
            detail,
        }
    }
}

/// Ordered per-descriptor results of one runner invocation. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// Results in declaration order, one per descriptor the run reached
    pub results: Vec<MigrationResult>,

    /// Ids the run never reached, after an abort or an interrupt
    #[serde(default)]
    pub not_attempted: Vec<String>,

    /// Whether this was a dry run
    #[serde(default)]
    pub dry_run: bool,

    /// Whether the run stopped because of an interrupt
    #[serde(default)]
    pub interrupted: bool,
}

impl RunReport {
    /// Creates an empty report.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub(crate) fn push(&mut self, id: &str, status: MigrationStatus, detail: Option<String>) {
        self.results.push(MigrationResult::new(id, status, detail));
    }

    /// Number of results with the given status.
    pub fn count(&self, status: MigrationStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Statuses in declaration order.
    pub fn statuses(&self) -> Vec<MigrationStatus> {
        self.results.iter().map(|r| r.status).collect()
    }

    /// Failed results in declaration order.
    pub fn failures(&self) -> impl Iterator<Item = &MigrationResult> {
        self.results
            .iter()
            .filter(|r| r.status == MigrationStatus::Failed)
    }

    /// Result for the given descriptor id, if the run reached it.
    pub fn get(&self, id: &str) -> Option<&MigrationResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// True when every descriptor reached `Applied`, `Skipped` or (in a dry
    /// run) `WouldApply`, and the run was not interrupted.
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.failures().next().is_none() && self.not_attempted.is_empty()
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
