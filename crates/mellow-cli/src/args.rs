use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Apply additive schema migrations to the Mellowcake chat store
///
/// With no command, every registered migration is applied in declaration
/// order. Migrations already recorded in the `schema_migrations` ledger are
/// skipped, so running the command repeatedly is safe.
#[derive(Parser)]
#[command(version, about, name = "migrate")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/mellowcake/mellowcake.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// JSON registry file to use instead of the built-in migrations
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Seconds a statement waits for another connection's lock
    #[arg(long, global = true, value_name = "SECS", default_value_t = 5)]
    pub busy_timeout: u64,

    /// Report what would run without executing DDL or writing the ledger
    #[arg(long)]
    pub dry_run: bool,

    /// Keep going after a failed migration instead of aborting
    #[arg(long)]
    pub best_effort: bool,

    /// Treat recorded migrations as applied without checking the schema
    #[arg(long)]
    pub trust_ledger: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Read-only commands; running without one applies the migrations.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the ledger entry and live presence of each migration
    #[command(alias = "st")]
    Status,
    /// Check every migrated column's type and default against the registry
    Verify,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown, rendered for the terminal
    Text,
    /// Pretty-printed JSON
    Json,
}
