//! Command handlers.
//!
//! Each handler runs one [`Migrator`] operation, prints the result in the
//! requested format and maps it to a process exit code. Errors that prevent
//! a report (bad registry, unreachable store) are returned instead and
//! reported by `main`.

use std::{
    process::ExitCode,
    sync::{atomic::AtomicBool, Arc},
};

use anyhow::{Context, Result};
use log::warn;
use mellow_core::{LedgerStatus, Migrator};

use crate::{args::OutputFormat, renderer::TerminalRenderer};

/// Exit code for a run stopped by Ctrl-C, as shells report SIGINT.
pub const EXIT_INTERRUPTED: u8 = 130;

pub struct Cli {
    migrator: Migrator,
    renderer: TerminalRenderer,
    format: OutputFormat,
}

impl Cli {
    pub fn new(migrator: Migrator, renderer: TerminalRenderer, format: OutputFormat) -> Self {
        Self {
            migrator,
            renderer,
            format,
        }
    }

    /// Applies the registry.
    pub async fn run(&self, interrupt: Arc<AtomicBool>) -> Result<ExitCode> {
        let report = self
            .migrator
            .run_with_interrupt(Some(interrupt))
            .await
            .context("Migration run failed")?;

        match self.format {
            OutputFormat::Text => self.renderer.render(&report.to_string())?,
            OutputFormat::Json => println!("{}", report.to_json()?),
        }

        if report.interrupted {
            warn!("Interrupted; {} migrations not attempted", report.not_attempted.len());
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        } else if report.is_success() {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }

    /// Lists the ledger state of each registered migration.
    pub async fn status(&self) -> Result<ExitCode> {
        let status = LedgerStatus(
            self.migrator
                .status()
                .await
                .context("Failed to read migration status")?,
        );

        match self.format {
            OutputFormat::Text => self.renderer.render(&status.to_string())?,
            OutputFormat::Json => println!("{}", status.to_json()?),
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Compares the live schema against the registry.
    pub async fn verify(&self) -> Result<ExitCode> {
        let report = self
            .migrator
            .verify()
            .await
            .context("Failed to verify schema")?;

        match self.format {
            OutputFormat::Text => self.renderer.render(&report.to_string())?,
            OutputFormat::Json => println!("{}", report.to_json()?),
        }

        if report.is_success() {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }
}
