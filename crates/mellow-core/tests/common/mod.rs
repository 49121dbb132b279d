use std::path::{Path, PathBuf};

use mellow_core::{Database, DEFAULT_BUSY_TIMEOUT};
use rusqlite::Connection;
use tempfile::TempDir;

pub const CHAT_SCHEMA: &str = include_str!("../fixtures/chat_schema.sql");

/// Creates a store with the base chat tables and no migrations applied.
pub fn chat_store() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("mellowcake.db");
    let conn = Connection::open(&db_path).expect("Failed to create store");
    conn.execute_batch(CHAT_SCHEMA)
        .expect("Failed to load chat schema");
    (temp_dir, db_path)
}

pub fn open(path: &Path) -> Database {
    Database::open(path, DEFAULT_BUSY_TIMEOUT).expect("Failed to open store")
}

/// Number of rows in the ledger for one id.
#[allow(dead_code)]
pub fn ledger_rows(path: &Path, migration_id: &str) -> i64 {
    Connection::open(path)
        .unwrap()
        .query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE migration_id = ?1",
            [migration_id],
            |row| row.get(0),
        )
        .unwrap()
}
