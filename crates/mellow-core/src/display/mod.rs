//! Markdown formatting of reports for terminal output.
//!
//! Domain reports implement [`std::fmt::Display`] directly
//! ([`crate::models::RunReport`], [`crate::models::VerifyReport`]); listings
//! that need extra context get a newtype wrapper ([`LedgerStatus`]). All
//! output is markdown, rendered rich or plain by the command line.
//!
//! - [`report`]: run and verification reports
//! - [`ledger`]: ledger status listing

pub mod ledger;
pub mod report;

pub use ledger::LedgerStatus;
