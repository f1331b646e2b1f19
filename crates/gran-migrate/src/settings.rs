//! Engine settings derived from project configuration.

use crate::error::MigrateResult;
use gran_core::{Config, DEFAULT_BATCH_TERMINATOR};
use gran_ledger::LedgerIdentity;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the engine needs besides a store connection.
#[derive(Debug, Clone)]
pub struct MigratorSettings {
    /// Directory scanned for `*.sql` scripts
    pub migrations_dir: PathBuf,

    pub ledger: LedgerIdentity,

    pub batch_terminator: String,

    /// Lock expiry; `None` disables the advisory lock
    pub lock_expiry: Option<Duration>,
}

impl MigratorSettings {
    /// Defaults for scripts in `migrations_dir`, lock enabled.
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            ledger: LedgerIdentity::default(),
            batch_terminator: DEFAULT_BATCH_TERMINATOR.to_string(),
            lock_expiry: Some(gran_ledger::lock::DEFAULT_LOCK_EXPIRY),
        }
    }

    /// Settings for the project rooted at `root`.
    pub fn from_config(config: &Config, root: &Path) -> MigrateResult<Self> {
        Ok(Self {
            migrations_dir: config.migrations_path_absolute(root),
            ledger: LedgerIdentity::try_from(&config.history)?,
            batch_terminator: config.batch_terminator.clone(),
            lock_expiry: config
                .lock
                .enabled
                .then(|| Duration::from_secs(config.lock.expiry_secs)),
        })
    }

    pub fn without_lock(mut self) -> Self {
        self.lock_expiry = None;
        self
    }
}
