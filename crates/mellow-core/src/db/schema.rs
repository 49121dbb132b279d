//! Live schema introspection.

use rusqlite::{params, OptionalExtension};

use crate::error::{DatabaseResultExt, Result};

const TABLE_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)";
// table_xinfo rather than table_info so generated columns are listed too
const COLUMN_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM pragma_table_xinfo(?1) WHERE name = ?2)";
const COLUMN_INFO_SQL: &str =
    "SELECT name, type, dflt_value FROM pragma_table_xinfo(?1) WHERE name = ?2";

/// Declared shape of a live column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Type exactly as declared in the DDL
    pub declared_type: String,
    /// Default expression text, e.g. `'long'` or `5`
    pub default: Option<String>,
}

impl super::Database {
    /// Whether a table with this name exists.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        self.connection()
            .query_row(TABLE_EXISTS_SQL, params![table], |row| row.get(0))
            .db_context("Failed to check table existence")
    }

    /// Whether `table` has a column named `column`. A missing table has no
    /// columns.
    pub fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        self.connection()
            .query_row(COLUMN_EXISTS_SQL, params![table, column], |row| row.get(0))
            .db_context("Failed to check column existence")
    }

    /// Declared type and default of a live column, if it exists.
    pub fn column_info(&self, table: &str, column: &str) -> Result<Option<ColumnInfo>> {
        self.connection()
            .query_row(COLUMN_INFO_SQL, params![table, column], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    declared_type: row.get(1)?,
                    default: row.get(2)?,
                })
            })
            .optional()
            .db_context("Failed to read column info")
    }
}
