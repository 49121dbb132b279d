//! Ordered registry of migration descriptors.
//!
//! Declaration order is significant: a later descriptor may rely on the
//! schema left by an earlier one, so the runner walks the registry strictly
//! front to back. Ids must be unique; a registry that repeats one is a
//! configuration error and is rejected before any store is opened.

use std::{collections::HashSet, fs, path::Path, slice};

use serde::Deserialize;

use crate::{
    error::{MigrateError, Result},
    models::{ColumnSpec, ColumnType, DefaultValue, ForeignKey, MigrationDescriptor},
};

/// Validated, ordered list of descriptors.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: Vec<MigrationDescriptor>,
}

impl Registry {
    /// Builds a registry in the given order.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::EmptyRegistry` for an empty list and
    /// `MigrateError::DuplicateMigration` if two descriptors share an id.
    pub fn new(descriptors: Vec<MigrationDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(MigrateError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.id()) {
                return Err(MigrateError::DuplicateMigration {
                    id: descriptor.id().to_string(),
                });
            }
        }

        Ok(Self { descriptors })
    }

    /// The chat store's migrations, in the order they were published.
    pub fn builtin() -> Result<Self> {
        let add = MigrationDescriptor::add_column;
        Self::new(vec![
            add("chat_sessions", "response_style", ColumnSpec::text().with_default("long"))?,
            add("chat_sessions", "short_temperature", ColumnSpec::real())?,
            add("chat_sessions", "long_temperature", ColumnSpec::real())?,
            add("chat_sessions", "summary", ColumnSpec::text())?,
            add("chat_sessions", "lorebooks", ColumnSpec::text())?,
            add("characters", "lorebooks", ColumnSpec::text())?,
            add("characters", "voice_sample", ColumnSpec::text())?,
            add("characters", "voice_sample_text", ColumnSpec::text())?,
            add("chat_messages", "audio_path", ColumnSpec::text())?,
            add("chat_messages", "swipes", ColumnSpec::text())?,
            add("chat_messages", "current_index", ColumnSpec::integer().with_default(0_i64))?,
            add("chat_messages", "name", ColumnSpec::text())?,
            add("personas", "character_id", ColumnSpec::integer_ref("characters", "id"))?,
            add("lorebook_entries", "weight", ColumnSpec::integer().with_default(5_i64))?,
            add("lorebook_entries", "is_always_included", ColumnSpec::integer().with_default(0_i64))?,
        ])
    }

    /// Parses a JSON array of descriptor definitions.
    ///
    /// ```rust
    /// use mellow_core::Registry;
    ///
    /// let registry = Registry::from_json(
    ///     r#"[
    ///         {"table": "lorebook_entries", "column": "weight", "type": "integer", "default": 5},
    ///         {"table": "personas", "column": "character_id", "type": "integer-ref",
    ///          "references": {"table": "characters", "column": "id"}}
    ///     ]"#,
    /// )
    /// .unwrap();
    /// assert_eq!(registry.len(), 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<DescriptorDefinition> = serde_json::from_str(json)?;
        let descriptors = definitions
            .into_iter()
            .map(MigrationDescriptor::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(descriptors)
    }

    /// Reads a JSON registry file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| MigrateError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    /// Descriptor with the given id.
    pub fn get(&self, id: &str) -> Option<&MigrationDescriptor> {
        self.descriptors.iter().find(|d| d.id() == id)
    }

    /// Declaration position of the descriptor with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.id() == id)
    }

    pub fn iter(&self) -> slice::Iter<'_, MigrationDescriptor> {
        self.descriptors.iter()
    }

    pub fn descriptors(&self) -> &[MigrationDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always false for a constructed registry; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a MigrationDescriptor;
    type IntoIter = slice::Iter<'a, MigrationDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One entry of a JSON registry file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptorDefinition {
    /// Defaults to `<table>.<column>`
    #[serde(default)]
    id: Option<String>,
    table: String,
    column: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    #[serde(default)]
    default: Option<DefaultValue>,
    #[serde(default)]
    references: Option<ForeignKey>,
    /// Overrides the generated `ALTER TABLE` statement
    #[serde(default)]
    statement: Option<String>,
}

impl TryFrom<DescriptorDefinition> for MigrationDescriptor {
    type Error = MigrateError;

    fn try_from(definition: DescriptorDefinition) -> Result<Self> {
        let spec = ColumnSpec {
            column_type: definition.column_type,
            default: definition.default,
            references: definition.references,
        };
        match (definition.id, definition.statement) {
            (None, None) => MigrationDescriptor::add_column(definition.table, definition.column, spec),
            (id, statement) => {
                let generated = MigrationDescriptor::add_column(
                    definition.table.clone(),
                    definition.column.clone(),
                    spec.clone(),
                )?;
                MigrationDescriptor::with_statement(
                    id.unwrap_or_else(|| generated.id().to_string()),
                    definition.table,
                    definition.column,
                    spec,
                    statement.unwrap_or_else(|| generated.statement().to_string()),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order_and_size() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(registry.len(), 15);
        assert_eq!(registry.position("chat_sessions.response_style"), Some(0));
        assert_eq!(registry.position("lorebook_entries.is_always_included"), Some(14));
        assert!(registry.position("personas.character_id") < registry.position("lorebook_entries.weight"));
        assert_eq!(
            registry.get("chat_messages.current_index").map(MigrationDescriptor::statement),
            Some("ALTER TABLE chat_messages ADD COLUMN current_index INTEGER DEFAULT 0")
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let a = MigrationDescriptor::add_column("chat_messages", "name", ColumnSpec::text()).unwrap();
        let err = Registry::new(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateMigration { ref id } if id == "chat_messages.name"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert!(matches!(Registry::new(Vec::new()), Err(MigrateError::EmptyRegistry)));
        assert!(matches!(Registry::from_json("[]"), Err(MigrateError::EmptyRegistry)));
    }

    #[test]
    fn test_json_registry_with_explicit_statement() {
        let registry = Registry::from_json(
            r#"[
                {"table": "lorebook_entries", "column": "weight", "type": "integer", "default": 5},
                {"id": "lorebook_entries.priority.v1", "table": "lorebook_entries", "column": "priority",
                 "type": "integer",
                 "statement": "ALTER TABLE lorebook_entries ADD COLUMN priority INTEGER GENERATED ALWAYS AS (weight * 2) VIRTUAL"}
            ]"#,
        )
        .unwrap();

        let ids: Vec<_> = registry.iter().map(MigrationDescriptor::id).collect();
        assert_eq!(ids, ["lorebook_entries.weight", "lorebook_entries.priority.v1"]);
        assert!(registry.descriptors()[1].statement().contains("GENERATED ALWAYS"));
        assert_eq!(
            registry.descriptors()[0].column().default,
            Some(DefaultValue::Integer(5))
        );
    }

    #[test]
    fn test_json_registry_rejects_unknown_fields_and_types() {
        let unknown = Registry::from_json(r#"[{"table": "t", "column": "c", "type": "text", "nullable": true}]"#);
        assert!(matches!(unknown, Err(MigrateError::Serialization { .. })));

        let bad_type = Registry::from_json(r#"[{"table": "t", "column": "c", "type": "varchar"}]"#);
        assert!(matches!(bad_type, Err(MigrateError::Serialization { .. })));
    }

    #[test]
    fn test_json_registry_duplicate_generated_ids() {
        let err = Registry::from_json(
            r#"[
                {"table": "characters", "column": "lorebooks", "type": "text"},
                {"table": "characters", "column": "lorebooks", "type": "text", "default": "[]"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateMigration { .. }));
    }

    #[test]
    fn test_missing_registry_file() {
        let err = Registry::from_file("/nonexistent/registry.json").unwrap_err();
        assert!(matches!(err, MigrateError::FileSystem { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_json_registry_rejects_statement_batches() {
        let err = Registry::from_json(
            r#"[
                {"table": "lorebook_entries", "column": "weight", "type": "integer",
                 "statement": "ALTER TABLE lorebook_entries ADD COLUMN weight INTEGER; CREATE INDEX idx_w ON lorebook_archive(weight)"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::InvalidDescriptor { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_json_registry_rejects_mismatched_default() {
        let err = Registry::from_json(
            r#"[{"table": "chat_sessions", "column": "summary", "type": "text", "default": 5}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, MigrateError::InvalidDescriptor { ref reason, .. } if reason.contains("text column cannot default to 5")));
    }
}
