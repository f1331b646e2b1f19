//! gran-core - Core library for Granulet
//!
//! This crate provides the migration script model, directory repository,
//! version allocation, UP/DOWN script splitting, ledger entry types, and
//! project configuration shared by every Granulet component.

pub mod allocator;
pub mod config;
pub mod error;
pub mod history;
pub mod repository;
pub mod script;
pub mod splitter;
pub mod sql_utils;
mod template;
pub mod version;

pub use allocator::{next_version, next_version_among};
pub use config::{
    Config, DatabaseConfig, HistoryConfig, LockConfig, ALT_CONFIG_FILE_NAME, CONFIG_FILE_NAME,
};
pub use error::{CoreError, CoreResult};
pub use history::LedgerEntry;
pub use repository::{
    create_migration, create_migration_with_terminator, find_by_file_name, find_in, find_migration,
    list_migrations,
};
pub use script::{parse_file_name, MigrationScript, SCRIPT_EXTENSION};
pub use splitter::{ScriptSplitter, Section, DEFAULT_BATCH_TERMINATOR};
pub use version::{MigrationVersion, MAX_DAILY_SEQUENCE};
