//! Ledger entry model and recorded outcomes.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// How a recorded migration reached its applied state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LedgerOutcome {
    /// The statement ran and succeeded
    Applied,

    /// The column was already there (duplicate-column error or introspection)
    AlreadyPresent,
}

impl FromStr for LedgerOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "applied" => Ok(LedgerOutcome::Applied),
            "already-present" | "already_present" => Ok(LedgerOutcome::AlreadyPresent),
            _ => Err(format!("Invalid ledger outcome: {s}")),
        }
    }
}

impl LedgerOutcome {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerOutcome::Applied => "applied",
            LedgerOutcome::AlreadyPresent => "already-present",
        }
    }
}

/// One row of the `schema_migrations` bookkeeping table.
///
/// The ledger is a set keyed by `migration_id`: recording the same id again
/// overwrites the row instead of adding one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    /// Id of the descriptor this entry records
    pub migration_id: String,

    /// When the migration was last recorded (UTC)
    pub applied_at: Timestamp,

    /// How it got there
    pub outcome: LedgerOutcome,
}

/// Ledger and live-schema view of one registered migration, as shown by the
/// status command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MigrationState {
    pub id: String,
    pub entry: Option<LedgerEntry>,
    pub present_in_schema: bool,
}

impl MigrationState {
    /// Recorded in the ledger but missing from the live schema.
    pub fn is_drifted(&self) -> bool {
        self.entry.is_some() && !self.present_in_schema
    }
}
