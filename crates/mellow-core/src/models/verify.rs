//! Schema verification results.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of checking one descriptor's column against the live schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "check", rename_all = "kebab-case")]
pub enum ColumnCheck {
    /// Present with the declared type and default
    Ok,

    /// The target table does not exist
    MissingTable,

    /// The table exists without the column
    MissingColumn,

    /// Present, declared with another type
    TypeMismatch { expected: String, actual: String },

    /// Present, with another default expression
    DefaultMismatch {
        expected: Option<String>,
        actual: Option<String>,
    },
}

impl ColumnCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, ColumnCheck::Ok)
    }
}

/// Verification of one descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResult {
    pub id: String,
    pub table: String,
    pub column: String,
    #[serde(flatten)]
    pub check: ColumnCheck,
}

/// Verification of a whole registry, in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyReport {
    pub results: Vec<VerifyResult>,
}

impl VerifyReport {
    /// Results that are not [`ColumnCheck::Ok`].
    pub fn mismatches(&self) -> impl Iterator<Item = &VerifyResult> {
        self.results.iter().filter(|r| !r.check.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.mismatches().next().is_none()
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
