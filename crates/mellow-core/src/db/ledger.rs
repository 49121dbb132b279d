//! Applied-state ledger backed by the `schema_migrations` table.
//!
//! The ledger answers "has this migration already succeeded?" and records
//! "this migration just succeeded". It is the only writer of the bookkeeping
//! table. Entries are keyed by migration id and written with an upsert, so
//! recording twice (a crashed run replayed, or two processes racing) never
//! produces a second row.

use jiff::Timestamp;
use log::{debug, warn};
use rusqlite::{params, types::Type, OptionalExtension, Row};

use super::Database;
use crate::{
    error::{DatabaseResultExt, Result},
    models::{LedgerEntry, LedgerOutcome, MigrationDescriptor},
};

/// Name of the bookkeeping table.
pub const LEDGER_TABLE: &str = "schema_migrations";

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    migration_id TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL,
    outcome TEXT NOT NULL
)";
const UPSERT_ENTRY_SQL: &str = "INSERT INTO schema_migrations (migration_id, applied_at, outcome) \
     VALUES (?1, ?2, ?3) \
     ON CONFLICT(migration_id) DO UPDATE SET applied_at = excluded.applied_at, outcome = excluded.outcome";
const SELECT_ENTRY_SQL: &str =
    "SELECT migration_id, applied_at, outcome FROM schema_migrations WHERE migration_id = ?1";
const SELECT_ENTRIES_SQL: &str =
    "SELECT migration_id, applied_at, outcome FROM schema_migrations ORDER BY migration_id";

/// Whether recorded entries are re-checked against the live schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftPolicy {
    /// A recorded migration whose column has gone missing counts as not
    /// applied and is attempted again
    #[default]
    Reconcile,

    /// A recorded migration counts as applied, whatever the schema says
    TrustLedger,
}

/// What the ledger knows about one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedState {
    /// Recorded, and (under [`DriftPolicy::Reconcile`]) confirmed present
    Recorded(LedgerEntry),

    /// Not recorded, but the bookkeeping table did not exist when the run
    /// started and introspection found the column
    PresentInSchema,

    /// Recorded, but the column is missing from the live schema
    Drifted(LedgerEntry),

    /// Not applied
    Missing,
}

impl AppliedState {
    /// Whether the descriptor's statement should be skipped.
    pub fn is_applied(&self) -> bool {
        matches!(self, AppliedState::Recorded(_) | AppliedState::PresentInSchema)
    }
}

/// Applied-state ledger scoped to one run over one connection.
pub struct Ledger<'a> {
    db: &'a Database,
    drift: DriftPolicy,
    bootstrapping: bool,
}

impl<'a> Ledger<'a> {
    /// Opens the ledger, probing the store first.
    ///
    /// A missing bookkeeping table is not an error: it means nothing has been
    /// recorded yet, and this run falls back to introspection for descriptors
    /// it finds no entry for.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::StoreUnreachable` if the store does not answer.
    pub fn open(db: &'a Database, drift: DriftPolicy) -> Result<Self> {
        db.probe()?;
        let bootstrapping = !db.table_exists(LEDGER_TABLE)?;
        if bootstrapping {
            debug!("No {LEDGER_TABLE} table yet; falling back to schema introspection");
        }
        Ok(Self {
            db,
            drift,
            bootstrapping,
        })
    }

    /// Whether the bookkeeping table was absent when the ledger was opened.
    pub fn is_bootstrapping(&self) -> bool {
        self.bootstrapping
    }

    /// Whether the descriptor's migration has already succeeded.
    pub fn has_applied(&self, descriptor: &MigrationDescriptor) -> Result<bool> {
        Ok(self.lookup(descriptor)?.is_applied())
    }

    /// Full applied state of the descriptor.
    pub fn lookup(&self, descriptor: &MigrationDescriptor) -> Result<AppliedState> {
        let present =
            || self.db.column_exists(descriptor.target_table(), descriptor.column_name());

        match self.entry(descriptor.id())? {
            Some(entry) if self.drift == DriftPolicy::Reconcile && !present()? => {
                warn!(
                    "{} is recorded as {} but column {}.{} is missing",
                    entry.migration_id,
                    entry.outcome.as_str(),
                    descriptor.target_table(),
                    descriptor.column_name()
                );
                Ok(AppliedState::Drifted(entry))
            }
            Some(entry) => Ok(AppliedState::Recorded(entry)),
            None if self.bootstrapping && present()? => Ok(AppliedState::PresentInSchema),
            None => Ok(AppliedState::Missing),
        }
    }

    /// Records that a migration reached its applied state, creating the
    /// bookkeeping table on first use. Recording an id again overwrites its
    /// entry.
    pub fn record_applied(&self, migration_id: &str, outcome: LedgerOutcome) -> Result<LedgerEntry> {
        let connection = self.db.connection();
        connection
            .execute(CREATE_LEDGER_SQL, [])
            .db_context("Failed to create ledger table")?;

        let applied_at = Timestamp::now();
        connection
            .execute(
                UPSERT_ENTRY_SQL,
                params![migration_id, applied_at.to_string(), outcome.as_str()],
            )
            .db_context("Failed to record ledger entry")?;

        debug!("Recorded {migration_id} as {}", outcome.as_str());
        Ok(LedgerEntry {
            migration_id: migration_id.to_string(),
            applied_at,
            outcome,
        })
    }

    /// Entry for one migration id, if recorded.
    pub fn entry(&self, migration_id: &str) -> Result<Option<LedgerEntry>> {
        if !self.db.table_exists(LEDGER_TABLE)? {
            return Ok(None);
        }
        self.db
            .connection()
            .query_row(SELECT_ENTRY_SQL, params![migration_id], entry_from_row)
            .optional()
            .db_context("Failed to query ledger entry")
    }

    /// All recorded entries, ordered by migration id.
    pub fn entries(&self) -> Result<Vec<LedgerEntry>> {
        if !self.db.table_exists(LEDGER_TABLE)? {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .db
            .connection()
            .prepare(SELECT_ENTRIES_SQL)
            .db_context("Failed to prepare ledger query")?;
        let entries = stmt
            .query_map([], entry_from_row)
            .db_context("Failed to query ledger entries")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read ledger entries")?;
        Ok(entries)
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    let outcome_str: String = row.get(2)?;
    let outcome = outcome_str.parse::<LedgerOutcome>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    Ok(LedgerEntry {
        migration_id: row.get(0)?,
        applied_at: row.get::<_, String>(1)?.parse::<Timestamp>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
        })?,
        outcome,
    })
}
