//! Results returned by engine operations.

use chrono::{DateTime, Utc};
use gran_core::{LedgerEntry, MigrationScript, MigrationVersion};
use serde::Serialize;

/// Result of targeting one migration by name.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The migration ran and was recorded
    Applied(LedgerEntry),
    /// The migration was already applied; nothing ran
    AlreadyApplied(MigrationScript),
}

/// What `rollback_last` undid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollbackReport {
    pub script: MigrationScript,
    pub version: MigrationVersion,
    /// Number of DOWN batches executed
    pub batches: usize,
    pub duration_ms: i64,
}

/// An applied script with the time it was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedMigration {
    #[serde(flatten)]
    pub script: MigrationScript,
    pub applied_at: DateTime<Utc>,
}

/// Snapshot of repository versus ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationStatus {
    /// Scripts with a successful ledger entry, in version order
    pub applied: Vec<AppliedMigration>,

    /// Scripts without one, in version order
    pub pending: Vec<MigrationScript>,

    /// File name of the highest applied version
    pub current_version: Option<String>,

    pub pending_count: usize,
}

impl MigrationStatus {
    pub fn new(applied: Vec<AppliedMigration>, pending: Vec<MigrationScript>) -> Self {
        let current_version = applied.last().map(|a| a.script.file_name.clone());
        let pending_count = pending.len();
        Self {
            applied,
            pending,
            current_version,
            pending_count,
        }
    }

    /// Whether every script has been applied.
    pub fn is_up_to_date(&self) -> bool {
        self.pending_count == 0
    }
}
