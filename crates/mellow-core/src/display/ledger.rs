//! Ledger status listing.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};
use serde::Serialize;

use crate::{error::Result, models::MigrationState};

/// Newtype wrapper for displaying the ledger status of a registry.
///
/// Each line shows the descriptor id, when and how it was recorded (in the
/// system time zone), and a marker when ledger and live schema disagree.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct LedgerStatus(pub Vec<MigrationState>);

impl LedgerStatus {
    /// Number of registered migrations with no ledger entry.
    pub fn pending(&self) -> usize {
        self.0.iter().filter(|s| s.entry.is_none()).count()
    }

    /// Number of recorded migrations whose column is missing.
    pub fn drifted(&self) -> usize {
        self.0.iter().filter(|s| s.is_drifted()).count()
    }

    /// Serializes the listing as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `YYYY-MM-DD HH:MM:SS TZ` in the system time zone.
fn local_time(timestamp: &Timestamp) -> String {
    timestamp
        .to_zoned(TimeZone::system())
        .strftime("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Migration Status")?;
        writeln!(f)?;

        for state in &self.0 {
            match &state.entry {
                Some(entry) => {
                    write!(
                        f,
                        "- `{}`: {} at {}",
                        state.id,
                        entry.outcome.as_str(),
                        local_time(&entry.applied_at)
                    )?;
                    if !state.present_in_schema {
                        write!(f, " (column missing)")?;
                    }
                }
                None if state.present_in_schema => {
                    write!(f, "- `{}`: pending (column present)", state.id)?;
                }
                None => write!(f, "- `{}`: pending", state.id)?,
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{} recorded, {} pending, {} drifted",
            self.0.len() - self.pending(),
            self.pending(),
            self.drifted()
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{LedgerEntry, LedgerOutcome};

    #[test]
    fn test_status_listing() {
        let status = LedgerStatus(vec![
            MigrationState {
                id: "chat_sessions.response_style".to_string(),
                entry: Some(LedgerEntry {
                    migration_id: "chat_sessions.response_style".to_string(),
                    applied_at: Timestamp::from_second(1640995200).unwrap(),
                    outcome: LedgerOutcome::Applied,
                }),
                present_in_schema: false,
            },
            MigrationState {
                id: "personas.character_id".to_string(),
                entry: None,
                present_in_schema: true,
            },
            MigrationState {
                id: "lorebook_entries.weight".to_string(),
                entry: None,
                present_in_schema: false,
            },
        ]);

        let output = status.to_string();
        assert!(output.contains("`chat_sessions.response_style`: applied at 202"));
        assert!(output.contains("(column missing)"));
        assert!(output.contains("`personas.character_id`: pending (column present)"));
        assert!(output.contains("`lorebook_entries.weight`: pending\n"));
        assert!(output.contains("1 recorded, 2 pending, 1 drifted"));
    }

    #[test]
    fn test_status_json_is_a_plain_array() {
        let status = LedgerStatus(vec![MigrationState {
            id: "chat_messages.name".to_string(),
            entry: None,
            present_in_schema: false,
        }]);
        let json = status.to_json().unwrap();
        assert!(json.trim_start().starts_with('['));
        assert!(json.contains("\"present_in_schema\": false"));
    }
}
