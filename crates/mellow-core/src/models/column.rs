//! Column type tags, default values, and foreign-key references.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Semantic type tag of a column added by a migration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    /// Free-form text
    Text,

    /// Plain integer
    Integer,

    /// Integer holding the id of a row in another table
    IntegerRef,

    /// Floating point number
    Real,

    /// Raw bytes
    Blob,
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "integer" => Ok(ColumnType::Integer),
            "integer-ref" | "integer_ref" => Ok(ColumnType::IntegerRef),
            "real" => Ok(ColumnType::Real),
            "blob" => Ok(ColumnType::Blob),
            _ => Err(format!("Invalid column type: {s}")),
        }
    }
}

impl ColumnType {
    /// Tag as written in registry files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::IntegerRef => "integer-ref",
            ColumnType::Real => "real",
            ColumnType::Blob => "blob",
        }
    }

    /// SQL type keyword used when generating the `ADD COLUMN` statement.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer | ColumnType::IntegerRef => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Blob => "BLOB",
        }
    }

    /// Whether a declared type reported by the engine matches this tag.
    ///
    /// SQLite reports the type exactly as it was written in the DDL, so the
    /// comparison ignores case and surrounding whitespace.
    pub fn matches_declared(&self, declared: &str) -> bool {
        declared.trim().eq_ignore_ascii_case(self.sql_type())
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal default value of an added column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DefaultValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl DefaultValue {
    /// Renders the value as an SQL literal.
    ///
    /// This is also the form SQLite reports back in `dflt_value`, which is
    /// what schema verification compares against.
    pub fn to_sql(&self) -> String {
        match self {
            DefaultValue::Integer(value) => value.to_string(),
            DefaultValue::Real(value) => value.to_string(),
            DefaultValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Integer(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Real(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

/// Target of an `integer-ref` column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.table, self.column)
    }
}

/// Declared shape of an added column: type tag, optional default and, for
/// `integer-ref`, the referenced column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub column_type: ColumnType,
    pub default: Option<DefaultValue>,
    pub references: Option<ForeignKey>,
}

impl ColumnSpec {
    /// Creates a spec of the given type with no default and no reference.
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            default: None,
            references: None,
        }
    }

    pub fn text() -> Self {
        Self::new(ColumnType::Text)
    }

    pub fn integer() -> Self {
        Self::new(ColumnType::Integer)
    }

    pub fn real() -> Self {
        Self::new(ColumnType::Real)
    }

    pub fn blob() -> Self {
        Self::new(ColumnType::Blob)
    }

    /// An integer column referencing `table(column)`.
    pub fn integer_ref(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            column_type: ColumnType::IntegerRef,
            default: None,
            references: Some(ForeignKey {
                table: table.into(),
                column: column.into(),
            }),
        }
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Column definition following the column name in `ADD COLUMN`, e.g.
    /// `INTEGER REFERENCES characters(id)` or `TEXT DEFAULT 'long'`.
    pub fn definition(&self) -> String {
        let mut definition = self.column_type.sql_type().to_string();
        if let Some(references) = &self.references {
            definition.push_str(&format!(" REFERENCES {references}"));
        }
        if let Some(default) = &self.default {
            definition.push_str(&format!(" DEFAULT {default}"));
        }
        definition
    }
}
