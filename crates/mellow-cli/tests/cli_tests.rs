use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use tempfile::TempDir;

const CHAT_SCHEMA: &str = include_str!("fixtures/chat_schema.sql");

/// Helper function to create a store with the base chat tables
fn create_chat_store() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("mellowcake.db");
    Connection::open(&db_path)
        .and_then(|conn| conn.execute_batch(CHAT_SCHEMA))
        .expect("Failed to create chat store");
    (temp_dir, db_path)
}

/// Helper function to create a Command with --no-color pointing at a store
fn migrate_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("migrate").expect("Failed to find migrate binary");
    cmd.arg("--no-color")
        .args(["--database-file", db_path.to_str().unwrap()]);
    cmd
}

fn ledger_size(db_path: &Path) -> i64 {
    Connection::open(db_path)
        .unwrap()
        .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_run_applies_builtin_migrations() {
    let (_temp_dir, db_path) = create_chat_store();

    migrate_cmd(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Migration Run"))
        .stdout(predicate::str::contains("✓ applied `chat_sessions.response_style`"))
        .stdout(predicate::str::contains("15 applied, 0 skipped, 0 failed"));

    assert_eq!(ledger_size(&db_path), 15);
}

#[test]
fn test_second_run_skips_everything() {
    let (_temp_dir, db_path) = create_chat_store();
    migrate_cmd(&db_path).assert().success();

    migrate_cmd(&db_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 applied, 15 skipped, 0 failed"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let (_temp_dir, db_path) = create_chat_store();

    migrate_cmd(&db_path)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Migration Plan (dry run)"))
        .stdout(predicate::str::contains(
            "ALTER TABLE personas ADD COLUMN character_id INTEGER REFERENCES characters(id)",
        ))
        .stdout(predicate::str::contains("15 would apply"));

    let table_count: i64 = Connection::open(&db_path)
        .unwrap()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'schema_migrations'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(table_count, 0);
}

#[test]
fn test_failed_migration_exits_non_zero() {
    let (temp_dir, db_path) = create_chat_store();
    let registry = temp_dir.path().join("registry.json");
    std::fs::write(
        &registry,
        r#"[
            {"table": "chat_sessions", "column": "summary", "type": "text"},
            {"table": "chat_archive", "column": "summary", "type": "text"},
            {"table": "chat_messages", "column": "name", "type": "text"}
        ]"#,
    )
    .unwrap();

    migrate_cmd(&db_path)
        .args(["--registry", registry.to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✗ failed `chat_archive.summary`: no such table"))
        .stdout(predicate::str::contains("Not attempted:\n- `chat_messages.name`"));

    migrate_cmd(&db_path)
        .args(["--registry", registry.to_str().unwrap(), "--best-effort"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✓ applied `chat_messages.name`"));
}

#[test]
fn test_missing_store_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("absent.db");

    migrate_cmd(&db_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unreachable"));
    assert!(!db_path.exists());
}

#[test]
fn test_invalid_registry_is_rejected_before_store_is_touched() {
    let (temp_dir, db_path) = create_chat_store();
    let registry = temp_dir.path().join("registry.json");
    std::fs::write(
        &registry,
        r#"[
            {"table": "characters", "column": "voice_sample", "type": "text"},
            {"table": "characters", "column": "voice_sample", "type": "text"}
        ]"#,
    )
    .unwrap();

    migrate_cmd(&db_path)
        .args(["--registry", registry.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate migration id 'characters.voice_sample'"));
}

#[test]
fn test_json_report() {
    let (_temp_dir, db_path) = create_chat_store();

    let output = migrate_cmd(&db_path)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 15);
    assert_eq!(results[0]["id"], "chat_sessions.response_style");
    assert_eq!(results[0]["status"], "applied");
    assert_eq!(report["dry_run"], false);
}

#[test]
fn test_status_command() {
    let (_temp_dir, db_path) = create_chat_store();

    migrate_cmd(&db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Migration Status"))
        .stdout(predicate::str::contains("0 recorded, 15 pending, 0 drifted"));

    migrate_cmd(&db_path).assert().success();

    migrate_cmd(&db_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("`lorebook_entries.weight`: applied at"))
        .stdout(predicate::str::contains("15 recorded, 0 pending, 0 drifted"));
}

#[test]
fn test_verify_command() {
    let (_temp_dir, db_path) = create_chat_store();

    migrate_cmd(&db_path)
        .arg("verify")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✗ `chat_messages.swipes`: column missing"));

    migrate_cmd(&db_path).assert().success();

    migrate_cmd(&db_path)
        .args(["verify", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"check\": \"ok\""));
}

#[test]
fn test_statement_batch_registry_leaves_store_untouched() {
    let (temp_dir, db_path) = create_chat_store();
    let registry = temp_dir.path().join("registry.json");
    std::fs::write(
        &registry,
        r#"[
            {"table": "lorebook_entries", "column": "weight", "type": "integer",
             "statement": "ALTER TABLE lorebook_entries ADD COLUMN weight INTEGER; CREATE INDEX idx_w ON lorebook_archive(weight)"}
        ]"#,
    )
    .unwrap();

    for _ in 0..2 {
        migrate_cmd(&db_path)
            .args(["--registry", registry.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("single SQL statement"));
    }

    let weight_columns: i64 = Connection::open(&db_path)
        .unwrap()
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_xinfo('lorebook_entries') WHERE name = 'weight'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(weight_columns, 0);
}
