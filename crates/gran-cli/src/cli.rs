//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Granulet - date-versioned SQL schema migrations
#[derive(Parser, Debug)]
#[command(name = "gran")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to start project discovery from
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Use this config file instead of discovering one
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new Granulet project
    Init(InitArgs),

    /// Create a new migration script
    New(NewArgs),

    /// Show applied and pending migrations
    Status(StatusArgs),

    /// Apply the next pending migration, all of them, or a specific one
    Update(UpdateArgs),

    /// Roll back the most recently applied migration
    Rollback(RollbackArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name; creates a directory of that name (default: initialise the project directory itself)
    pub name: Option<String>,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Migration name, used in the file name
    pub name: String,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable listing
    Table,
    /// JSON output
    Json,
}

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// `all`, or a migration file name / name / fragment (default: next pending)
    pub migration: Option<String>,
}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
