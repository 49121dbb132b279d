//! Data models for descriptors, ledger entries, and reports.
//!
//! This module contains the domain values the migration runner works with.
//! Display implementations for the report types live in [`crate::display`]
//! so that presentation stays separate from the data structures.
//!
//! - [`MigrationDescriptor`]: one immutable additive schema change
//! - [`ColumnSpec`] / [`ColumnType`] / [`DefaultValue`]: the declared shape of
//!   the added column
//! - [`LedgerEntry`] / [`LedgerOutcome`]: rows of the bookkeeping table
//! - [`RunReport`] / [`MigrationResult`] / [`MigrationStatus`]: the outcome
//!   of one runner invocation
//! - [`VerifyReport`]: the outcome of checking the live schema against a
//!   registry

pub mod column;
pub mod descriptor;
pub mod ledger;
pub mod report;
pub mod verify;


pub use column::{ColumnSpec, ColumnType, DefaultValue, ForeignKey};
pub use descriptor::MigrationDescriptor;
pub use ledger::{LedgerEntry, LedgerOutcome, MigrationState};
pub use report::{MigrationResult, MigrationStatus, RunReport};
pub use verify::{ColumnCheck, VerifyReport, VerifyResult};
