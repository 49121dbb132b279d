//! Migration descriptor definition.

use std::fmt;

use super::{ColumnSpec, ColumnType, DefaultValue};
use crate::error::{MigrateError, Result};

/// Immutable record of one additive schema change.
///
/// Fields are private: once constructed, a descriptor cannot be altered. A
/// published descriptor's statement must never change; corrections ship as
/// new descriptors with new ids.
///
/// Two descriptors are equal when their ids are equal.
///
/// # Examples
///
/// ```rust
/// use mellow_core::models::{ColumnSpec, MigrationDescriptor};
///
/// let descriptor = MigrationDescriptor::add_column(
///     "chat_sessions",
///     "response_style",
///     ColumnSpec::text().with_default("long"),
/// )
/// .unwrap();
///
/// assert_eq!(descriptor.id(), "chat_sessions.response_style");
/// assert_eq!(
///     descriptor.statement(),
///     "ALTER TABLE chat_sessions ADD COLUMN response_style TEXT DEFAULT 'long'"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MigrationDescriptor {
    id: String,
    target_table: String,
    column_name: String,
    column: ColumnSpec,
    statement: String,
}

impl MigrationDescriptor {
    /// Describes adding `column` to `table`, deriving the id
    /// (`"<table>.<column>"`) and the `ALTER TABLE` statement from `spec`.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::InvalidDescriptor` if a name is not a plain SQL
    /// identifier or `spec` is inconsistent with its type tag (a reference on
    /// a non-reference column, a default of another kind than the column).
    pub fn add_column(
        table: impl Into<String>,
        column: impl Into<String>,
        spec: ColumnSpec,
    ) -> Result<Self> {
        let target_table = table.into();
        let column_name = column.into();
        let id = format!("{target_table}.{column_name}");
        let statement = format!(
            "ALTER TABLE {target_table} ADD COLUMN {column_name} {}",
            spec.definition()
        );
        Self::with_statement(id, target_table, column_name, spec, statement)
    }

    /// Describes a change with an explicit statement, for columns whose
    /// definition a [`ColumnSpec`] cannot express (generated columns, checks).
    ///
    /// The table, column and spec still describe the end state the statement
    /// produces; they drive introspection and verification.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::InvalidDescriptor` on an empty id or statement,
    /// a statement holding more than one SQL statement (a trailing `;` is
    /// dropped), or on the same conditions as
    /// [`MigrationDescriptor::add_column`].
    pub fn with_statement(
        id: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        spec: ColumnSpec,
        statement: impl Into<String>,
    ) -> Result<Self> {
        let descriptor = Self {
            id: id.into(),
            target_table: table.into(),
            column_name: column.into(),
            column: spec,
            statement: statement.into().trim().trim_end_matches(';').trim_end().to_string(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            Err(MigrateError::invalid_descriptor(&self.id).with_reason(reason))
        };

        if self.id.is_empty() || self.id.chars().any(char::is_whitespace) {
            return invalid("id must be non-empty and contain no whitespace".to_string());
        }
        for (what, name) in [("table", &self.target_table), ("column", &self.column_name)] {
            if !is_identifier(name) {
                return invalid(format!("{what} name '{name}' is not a valid identifier"));
            }
        }
        match (self.column.column_type, &self.column.references) {
            (ColumnType::IntegerRef, None) => {
                return invalid("integer-ref column requires a reference".to_string());
            }
            (ColumnType::IntegerRef, Some(reference))
                if !is_identifier(&reference.table) || !is_identifier(&reference.column) =>
            {
                return invalid(format!("reference '{reference}' is not a valid identifier"));
            }
            (ColumnType::IntegerRef, Some(_)) | (_, None) => {}
            (column_type, Some(_)) => {
                return invalid(format!("{column_type} column cannot carry a reference"));
            }
        }
        match (self.column.column_type, &self.column.default) {
            (_, None)
            | (ColumnType::Text, Some(DefaultValue::Text(_)))
            | (ColumnType::Integer | ColumnType::IntegerRef, Some(DefaultValue::Integer(_)))
            | (ColumnType::Real, Some(DefaultValue::Real(_) | DefaultValue::Integer(_))) => {}
            (column_type, Some(default)) => {
                return invalid(format!("{column_type} column cannot default to {default}"));
            }
        }
        if self.statement.is_empty() {
            return invalid("statement must not be empty".to_string());
        }
        // The statement and its ledger entry must stand or fall together
        if has_statement_separator(&self.statement) {
            return invalid("statement must be a single SQL statement".to_string());
        }
        Ok(())
    }

    /// Stable unique id, e.g. `chat_sessions.response_style`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Table being altered.
    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    /// Column being added.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Declared type, default and reference of the added column.
    pub fn column(&self) -> &ColumnSpec {
        &self.column
    }

    /// Literal DDL executed against the store.
    pub fn statement(&self) -> &str {
        &self.statement
    }
}

impl PartialEq for MigrationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MigrationDescriptor {}

impl fmt::Display for MigrationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.statement)
    }
}

/// Whether `sql` contains a `;` outside a quoted literal or identifier.
fn has_statement_separator(sql: &str) -> bool {
    let mut quote = None;
    for c in sql.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if matches!(c, '\'' | '"' | '`') => quote = Some(c),
            None if c == ';' => return true,
            None => {}
        }
    }
    false
}

/// Plain SQL identifier: ASCII letter or underscore, then letters, digits or
/// underscores.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
