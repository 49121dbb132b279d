//! Mellowcake migration CLI
//!
//! Applies the chat store's additive schema migrations and inspects their
//! state.

mod args;
mod cli;
mod renderer;

use std::{
    process::ExitCode,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::{info, warn};
use mellow_core::{DriftPolicy, MigratorBuilder, Registry};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let Args {
        database_file,
        registry,
        no_color,
        format,
        busy_timeout,
        dry_run,
        best_effort,
        trust_ledger,
        command,
    } = Args::parse();

    let mut builder = MigratorBuilder::new()
        .with_database_path(database_file)
        .with_busy_timeout(Duration::from_secs(busy_timeout))
        .dry_run(dry_run)
        .best_effort(best_effort);
    if trust_ledger {
        builder = builder.drift_policy(DriftPolicy::TrustLedger);
    }
    if let Some(path) = registry {
        let registry = Registry::from_file(&path)
            .with_context(|| format!("Failed to load registry from {}", path.display()))?;
        builder = builder.with_registry(registry);
    }

    let migrator = builder
        .build()
        .await
        .context("Failed to initialize migrator")?;
    info!("Using store {}", migrator.db_path().display());

    let cli = Cli::new(migrator, TerminalRenderer::new(!no_color), format);

    match command {
        Some(Status) => cli.status().await,
        Some(Verify) => cli.verify().await,
        None => {
            let interrupt = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&interrupt);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received; finishing the current migration");
                    flag.store(true, Ordering::SeqCst);
                }
            });
            cli.run(interrupt).await
        }
    }
}
