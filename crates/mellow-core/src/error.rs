//! Error types for the migration library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all migration operations.
///
/// A migration whose statement fails is not an error at this level: the
/// runner records it as a failed entry in the run report. The variants here
/// stop a run before (or instead of) producing a report.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Database query errors against a reachable store
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// The store cannot be opened or does not answer a probe query
    #[error("Store at '{}' is unreachable: {source}", path.display())]
    StoreUnreachable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// Two descriptors in one registry share an id
    #[error("Duplicate migration id '{id}' in registry")]
    DuplicateMigration { id: String },
    /// A registry without descriptors
    #[error("Migration registry is empty")]
    EmptyRegistry,
    /// A descriptor that cannot be turned into a valid statement
    #[error("Invalid migration '{id}': {reason}")]
    InvalidDescriptor { id: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{}': {source}", path.display())]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> MigrateError {
        MigrateError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for descriptor validation errors.
pub struct InvalidDescriptorBuilder {
    id: String,
}

impl InvalidDescriptorBuilder {
    /// Create a new builder for the descriptor with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> MigrateError {
        MigrateError::InvalidDescriptor {
            id: self.id,
            reason: reason.into(),
        }
    }
}

impl MigrateError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for descriptor validation errors.
    pub fn invalid_descriptor(id: impl Into<String>) -> InvalidDescriptorBuilder {
        InvalidDescriptorBuilder::new(id)
    }

    /// Whether this error belongs to the configuration class, raised before
    /// the store is touched. File system errors only arise from reading a
    /// registry file, so they count too.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateMigration { .. }
                | Self::FileSystem { .. }
                | Self::EmptyRegistry
                | Self::InvalidDescriptor { .. }
                | Self::Configuration { .. }
                | Self::Serialization { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| MigrateError::database(message).with_source(e))
    }
}

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrateError>;
