//! Store access for the chat application's SQLite database.
//!
//! This module owns the single connection a run works through. It opens the
//! existing store with a bounded busy timeout, exposes raw DDL execution for
//! the runner, schema introspection ([`schema`]), and the applied-state
//! ledger ([`ledger`]).

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{Connection, OpenFlags};

use crate::error::{MigrateError, Result};

pub mod ledger;
pub mod schema;

pub use ledger::{AppliedState, DriftPolicy, Ledger};
pub use schema::ColumnInfo;

/// Default bound on how long a statement waits for a lock held by another
/// connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection handle.
pub struct Database {
    connection: Connection,
    path: PathBuf,
}

impl Database {
    /// Opens an existing database file and checks that it answers queries.
    ///
    /// The store is never created here: a migration targets the
    /// application's database, and a missing file means the wrong path.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::StoreUnreachable` if the file cannot be opened,
    /// the timeout cannot be set, or the probe query fails.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unreachable = |source| MigrateError::StoreUnreachable {
            path: path.clone(),
            source,
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&path, flags).map_err(unreachable)?;
        connection.busy_timeout(busy_timeout).map_err(unreachable)?;

        let db = Self { connection, path };
        db.probe()?;
        Ok(db)
    }

    /// Runs a trivial read against the schema to confirm the store is
    /// usable.
    pub fn probe(&self) -> Result<()> {
        self.connection
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|_| ())
            .map_err(|source| MigrateError::StoreUnreachable {
                path: self.path.clone(),
                source,
            })
    }

    /// Executes one DDL statement, returning the engine error untouched so the
    /// caller can classify it.
    ///
    /// Only a single statement is accepted, so a statement either takes
    /// effect completely or not at all; text holding several statements
    /// fails with `rusqlite::Error::MultipleStatement` before anything runs.
    pub fn execute_ddl(&self, statement: &str) -> std::result::Result<(), rusqlite::Error> {
        self.connection.execute(statement, []).map(|_| ())
    }

    /// Path the connection was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }
}
