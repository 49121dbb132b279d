//! Classification of failed DDL attempts.
//!
//! When an `ALTER TABLE .. ADD COLUMN` fails, the runner needs to know whether
//! the failure only says "this is already done" (a previous run, or a
//! concurrent one, got there first) or whether something is actually broken.
//! SQLite reports both through the generic `SQLITE_ERROR` code, so the
//! decision rests on the error text. That matching lives here, behind
//! [`OutcomeClassifier`], and nowhere else.

use rusqlite::ErrorCode;

/// Verdict on a failed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The target object already exists; the migration is effectively done
    AlreadyPresent,

    /// Anything else; the descriptor fails
    Fatal,
}

/// Engine-specific rule set deciding whether a failed statement is benign.
///
/// Implementations must be pure: the same error always yields the same
/// classification, and classifying has no side effects.
pub trait OutcomeClassifier: Send + Sync {
    fn classify(&self, error: &rusqlite::Error) -> Classification;
}

/// Message fragments SQLite uses when the object being added already exists.
const ALREADY_PRESENT_PATTERNS: &[&str] = &["duplicate column name", "already exists"];

/// Classifier for SQLite error codes and messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteClassifier;

impl OutcomeClassifier for SqliteClassifier {
    fn classify(&self, error: &rusqlite::Error) -> Classification {
        match error {
            rusqlite::Error::SqliteFailure(failure, message) => {
                let message = message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| failure.to_string());
                classify_message(Some(failure.code), &message)
            }
            _ => Classification::Fatal,
        }
    }
}

/// Classifies an engine error code and message.
///
/// Only the generic error code can carry an "already exists" message. Busy,
/// locked, read-only, permission and every other code are fatal regardless of
/// wording, so a lock timeout is never mistaken for success.
pub fn classify_message(code: Option<ErrorCode>, message: &str) -> Classification {
    if !matches!(code, None | Some(ErrorCode::Unknown)) {
        return Classification::Fatal;
    }

    let message = message.to_lowercase();
    if ALREADY_PRESENT_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
    {
        Classification::AlreadyPresent
    } else {
        Classification::Fatal
    }
}

/// Classifies with the SQLite rules.
pub fn classify(error: &rusqlite::Error) -> Classification {
    SqliteClassifier.classify(error)
}
