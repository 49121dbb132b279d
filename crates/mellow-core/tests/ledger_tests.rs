mod common;

use mellow_core::{
    db::{AppliedState, Ledger},
    DriftPolicy, LedgerOutcome, MigrateError, Registry,
};

use common::{chat_store, ledger_rows, open};

#[test]
fn test_cold_store_has_no_entries() {
    let (_temp_dir, db_path) = chat_store();
    let db = open(&db_path);

    let ledger = Ledger::open(&db, DriftPolicy::Reconcile).expect("Failed to open ledger");

    assert!(ledger.is_bootstrapping());
    assert!(ledger.entries().unwrap().is_empty());
    assert_eq!(ledger.entry("chat_sessions.summary").unwrap(), None);
    // Opening the ledger must not create the bookkeeping table
    assert!(!db.table_exists("schema_migrations").unwrap());
}

#[test]
fn test_recording_twice_keeps_one_row() {
    let (_temp_dir, db_path) = chat_store();
    let db = open(&db_path);
    let ledger = Ledger::open(&db, DriftPolicy::Reconcile).unwrap();

    let first = ledger
        .record_applied("chat_messages.audio_path", LedgerOutcome::Applied)
        .unwrap();
    let second = ledger
        .record_applied("chat_messages.audio_path", LedgerOutcome::AlreadyPresent)
        .unwrap();

    assert_eq!(ledger_rows(&db_path, "chat_messages.audio_path"), 1);
    assert!(second.applied_at >= first.applied_at);

    let stored = ledger.entry("chat_messages.audio_path").unwrap().unwrap();
    assert_eq!(stored.outcome, LedgerOutcome::AlreadyPresent);
    assert_eq!(stored, second);
}

#[test]
fn test_entries_are_ordered_by_id() {
    let (_temp_dir, db_path) = chat_store();
    let db = open(&db_path);
    let ledger = Ledger::open(&db, DriftPolicy::Reconcile).unwrap();

    for id in ["personas.character_id", "characters.lorebooks", "lorebook_entries.weight"] {
        ledger.record_applied(id, LedgerOutcome::Applied).unwrap();
    }

    let ids: Vec<_> = ledger
        .entries()
        .unwrap()
        .into_iter()
        .map(|e| e.migration_id)
        .collect();
    assert_eq!(
        ids,
        ["characters.lorebooks", "lorebook_entries.weight", "personas.character_id"]
    );
}

#[test]
fn test_lookup_states() {
    let (_temp_dir, db_path) = chat_store();
    let db = open(&db_path);
    let registry = Registry::builtin().unwrap();
    let summary = registry.get("chat_sessions.summary").unwrap();
    let swipes = registry.get("chat_messages.swipes").unwrap();

    db.execute_ddl(summary.statement()).unwrap();

    // No bookkeeping table yet: introspection decides
    let ledger = Ledger::open(&db, DriftPolicy::Reconcile).unwrap();
    assert_eq!(ledger.lookup(summary).unwrap(), AppliedState::PresentInSchema);
    assert_eq!(ledger.lookup(swipes).unwrap(), AppliedState::Missing);
    assert!(ledger.has_applied(summary).unwrap());

    // Once the table exists, only recorded entries count
    ledger.record_applied(swipes.id(), LedgerOutcome::Applied).unwrap();
    let ledger = Ledger::open(&db, DriftPolicy::Reconcile).unwrap();
    assert!(!ledger.is_bootstrapping());
    assert_eq!(ledger.lookup(summary).unwrap(), AppliedState::Missing);
    assert!(matches!(ledger.lookup(swipes).unwrap(), AppliedState::Drifted(_)));

    let trusting = Ledger::open(&db, DriftPolicy::TrustLedger).unwrap();
    assert!(matches!(trusting.lookup(swipes).unwrap(), AppliedState::Recorded(_)));
}

#[test]
fn test_corrupt_outcome_is_a_database_error() {
    let (_temp_dir, db_path) = chat_store();
    let db = open(&db_path);
    let ledger = Ledger::open(&db, DriftPolicy::Reconcile).unwrap();
    ledger
        .record_applied("chat_messages.name", LedgerOutcome::Applied)
        .unwrap();

    rusqlite::Connection::open(&db_path)
        .unwrap()
        .execute(
            "UPDATE schema_migrations SET outcome = 'rolled-back' WHERE migration_id = 'chat_messages.name'",
            [],
        )
        .unwrap();

    let result = ledger.entry("chat_messages.name");
    assert!(matches!(result, Err(MigrateError::Database { .. })));
}
