//! Ledger entry model shared by the ledger store and the engine.

use crate::script::MigrationScript;
use crate::version::MigrationVersion;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One recorded migration attempt.
///
/// Entries are written once and never updated; rolling back a migration
/// deletes its successful entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub version: MigrationVersion,

    /// File name of the script that was applied
    pub script_name: String,

    pub applied_at: DateTime<Utc>,

    /// Wall-clock time spent applying, in milliseconds
    pub execution_duration_ms: i64,

    pub success: bool,

    /// Error text for failed attempts
    pub error_message: Option<String>,
}

impl LedgerEntry {
    /// Entry for a successful application of `script`.
    pub fn succeeded(
        script: &MigrationScript,
        applied_at: DateTime<Utc>,
        execution_duration_ms: i64,
    ) -> Self {
        Self {
            version: script.version.clone(),
            script_name: script.file_name.clone(),
            applied_at,
            execution_duration_ms,
            success: true,
            error_message: None,
        }
    }

    /// Entry for a failed attempt at `script`.
    pub fn failed(
        script: &MigrationScript,
        applied_at: DateTime<Utc>,
        execution_duration_ms: i64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            version: script.version.clone(),
            script_name: script.file_name.clone(),
            applied_at,
            execution_duration_ms,
            success: false,
            error_message: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_constructors() {
        let script = MigrationScript::from_path(Path::new("2024.01.01_001_init.sql")).unwrap();
        let now = Utc::now();

        let ok = LedgerEntry::succeeded(&script, now, 12);
        assert!(ok.success);
        assert_eq!(ok.version, "2024.01.01_001");
        assert_eq!(ok.script_name, "2024.01.01_001_init.sql");
        assert_eq!(ok.error_message, None);

        let failed = LedgerEntry::failed(&script, now, 3, "boom");
        assert!(!failed.success);
        assert_eq!(failed.error_message.as_deref(), Some("boom"));
    }
}
