//! Read-only views of a store: ledger status and schema verification.
//!
//! Neither function executes DDL or writes the ledger.

use crate::{
    db::{Database, DriftPolicy, Ledger},
    error::Result,
    models::{ColumnCheck, MigrationDescriptor, MigrationState, VerifyReport, VerifyResult},
    registry::Registry,
};

/// Ledger entry and live presence of every registered migration, in
/// declaration order.
pub fn status(db: &Database, registry: &Registry) -> Result<Vec<MigrationState>> {
    let ledger = Ledger::open(db, DriftPolicy::TrustLedger)?;
    registry
        .iter()
        .map(|descriptor| -> Result<MigrationState> {
            Ok(MigrationState {
                id: descriptor.id().to_string(),
                entry: ledger.entry(descriptor.id())?,
                present_in_schema: db
                    .column_exists(descriptor.target_table(), descriptor.column_name())?,
            })
        })
        .collect()
}

/// Checks that every descriptor's column exists with the declared type and
/// default.
pub fn verify(db: &Database, registry: &Registry) -> Result<VerifyReport> {
    db.probe()?;
    let results = registry
        .iter()
        .map(|descriptor| -> Result<VerifyResult> {
            Ok(VerifyResult {
                id: descriptor.id().to_string(),
                table: descriptor.target_table().to_string(),
                column: descriptor.column_name().to_string(),
                check: check_column(db, descriptor)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(VerifyReport { results })
}

fn check_column(db: &Database, descriptor: &MigrationDescriptor) -> Result<ColumnCheck> {
    if !db.table_exists(descriptor.target_table())? {
        return Ok(ColumnCheck::MissingTable);
    }
    let Some(info) = db.column_info(descriptor.target_table(), descriptor.column_name())? else {
        return Ok(ColumnCheck::MissingColumn);
    };

    let spec = descriptor.column();
    if !spec.column_type.matches_declared(&info.declared_type) {
        return Ok(ColumnCheck::TypeMismatch {
            expected: spec.column_type.sql_type().to_string(),
            actual: info.declared_type,
        });
    }

    let expected_default = spec.default.as_ref().map(|d| d.to_sql());
    if expected_default != info.default {
        return Ok(ColumnCheck::DefaultMismatch {
            expected: expected_default,
            actual: info.default,
        });
    }

    Ok(ColumnCheck::Ok)
}
