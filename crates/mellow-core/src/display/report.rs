//! Display implementations for run and verification reports.

use std::fmt;

use crate::models::{ColumnCheck, MigrationStatus, RunReport, VerifyReport};

/// Formats a run report as markdown: one line per descriptor, then the
/// ids never reached, then a summary count.
///
/// # Examples
///
/// ```rust
/// use mellow_core::models::{MigrationResult, MigrationStatus, RunReport};
///
/// let report = RunReport {
///     results: vec![
///         MigrationResult::new("chat_sessions.response_style", MigrationStatus::Applied, None),
///         MigrationResult::new("personas.character_id", MigrationStatus::Skipped, None),
///     ],
///     ..Default::default()
/// };
///
/// let output = report.to_string();
/// assert!(output.contains("chat_sessions.response_style"));
/// assert!(output.contains("1 applied, 1 skipped, 0 failed"));
/// ```
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "# Migration Plan (dry run)")?;
        } else {
            writeln!(f, "# Migration Run")?;
        }
        writeln!(f)?;

        if self.results.is_empty() {
            writeln!(f, "No migrations attempted.")?;
        }
        for result in &self.results {
            write!(f, "- {} `{}`", result.status.with_icon(), result.id)?;
            if let Some(detail) = &result.detail {
                write!(f, ": {detail}")?;
            }
            writeln!(f)?;
        }

        if !self.not_attempted.is_empty() {
            writeln!(f)?;
            if self.interrupted {
                writeln!(f, "Interrupted. Not attempted:")?;
            } else {
                writeln!(f, "Not attempted:")?;
            }
            for id in &self.not_attempted {
                writeln!(f, "- `{id}`")?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "{} applied, {} skipped, {} failed",
            self.count(MigrationStatus::Applied),
            self.count(MigrationStatus::Skipped),
            self.count(MigrationStatus::Failed)
        )?;
        if self.dry_run {
            write!(f, ", {} would apply", self.count(MigrationStatus::WouldApply))?;
        }
        if !self.not_attempted.is_empty() {
            write!(f, ", {} not attempted", self.not_attempted.len())?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ColumnCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnCheck::Ok => write!(f, "ok"),
            ColumnCheck::MissingTable => write!(f, "table missing"),
            ColumnCheck::MissingColumn => write!(f, "column missing"),
            ColumnCheck::TypeMismatch { expected, actual } => {
                write!(f, "type is {actual}, expected {expected}")
            }
            ColumnCheck::DefaultMismatch { expected, actual } => write!(
                f,
                "default is {}, expected {}",
                actual.as_deref().unwrap_or("none"),
                expected.as_deref().unwrap_or("none")
            ),
        }
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Schema Verification")?;
        writeln!(f)?;
        for result in &self.results {
            let icon = if result.check.is_ok() { "✓" } else { "✗" };
            writeln!(f, "- {icon} `{}`: {}", result.id, result.check)?;
        }
        writeln!(f)?;
        let mismatches = self.mismatches().count();
        writeln!(
            f,
            "{} of {} columns match",
            self.results.len() - mismatches,
            self.results.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{ColumnCheck, MigrationResult, MigrationStatus, RunReport, VerifyReport, VerifyResult};

    #[test]
    fn test_failed_run_lists_detail_and_not_attempted() {
        let report = RunReport {
            results: vec![
                MigrationResult::new("chat_sessions.summary", MigrationStatus::Applied, None),
                MigrationResult::new(
                    "lorebooks.content",
                    MigrationStatus::Failed,
                    Some("no such table: lorebooks".to_string()),
                ),
            ],
            not_attempted: vec!["lorebook_entries.weight".to_string()],
            ..Default::default()
        };

        let output = report.to_string();
        assert!(output.starts_with("# Migration Run"));
        assert!(output.contains("✗ failed `lorebooks.content`: no such table: lorebooks"));
        assert!(output.contains("Not attempted:\n- `lorebook_entries.weight`"));
        assert!(output.contains("1 applied, 0 skipped, 1 failed, 1 not attempted"));
    }

    #[test]
    fn test_dry_run_summary() {
        let mut report = RunReport::new(true);
        report.push("chat_messages.swipes", MigrationStatus::WouldApply, None);

        let output = report.to_string();
        assert!(output.starts_with("# Migration Plan (dry run)"));
        assert!(output.contains("➤ would apply `chat_messages.swipes`"));
        assert!(output.contains("0 applied, 0 skipped, 0 failed, 1 would apply"));
    }

    #[test]
    fn test_interrupted_run() {
        let report = RunReport {
            not_attempted: vec!["characters.voice_sample".to_string()],
            interrupted: true,
            ..Default::default()
        };
        let output = report.to_string();
        assert!(output.contains("No migrations attempted."));
        assert!(output.contains("Interrupted. Not attempted:"));
    }

    #[test]
    fn test_verify_report_display() {
        let report = VerifyReport {
            results: vec![
                VerifyResult {
                    id: "lorebook_entries.weight".to_string(),
                    table: "lorebook_entries".to_string(),
                    column: "weight".to_string(),
                    check: ColumnCheck::Ok,
                },
                VerifyResult {
                    id: "chat_sessions.response_style".to_string(),
                    table: "chat_sessions".to_string(),
                    column: "response_style".to_string(),
                    check: ColumnCheck::DefaultMismatch {
                        expected: Some("'long'".to_string()),
                        actual: None,
                    },
                },
            ],
        };

        let output = report.to_string();
        assert!(output.contains("✓ `lorebook_entries.weight`: ok"));
        assert!(output.contains("default is none, expected 'long'"));
        assert!(output.contains("1 of 2 columns match"));
    }
}
