//! Error types for gran-migrate

use gran_core::CoreError;
use gran_db::DbError;
use gran_ledger::LedgerError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// No script matches the requested token (M001)
    #[error("[M001] Migration not found: {token}")]
    ScriptNotFound { token: String },

    /// The ledger has no successful entry to roll back (M002)
    #[error("[M002] No applied migrations to roll back")]
    NothingToRollBack,

    /// Rollback requested for a script without DOWN batches (M003)
    #[error("[M003] Migration {script} has no DOWN section; nothing was rolled back")]
    NoDownSection { script: String },

    /// A batch failed; the enclosing transaction was rolled back (M004)
    #[error("[M004] Batch {batch} of {script} failed")]
    BatchFailed {
        script: String,
        /// 1-based position of the batch within its section
        batch: usize,
        #[source]
        source: DbError,
    },

    /// Ledger operation failed (M005)
    #[error("[M005] {0}")]
    Ledger(#[from] LedgerError),

    /// Repository or configuration error (M006)
    #[error("[M006] {0}")]
    Core(#[from] CoreError),

    /// Store connection or transaction control failed (M007)
    #[error("[M007] {0}")]
    Store(#[from] DbError),

    /// A script could not be read from disk (M008)
    #[error("[M008] Failed to read migration {script}")]
    ScriptRead {
        script: String,
        #[source]
        source: CoreError,
    },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Render an error and all of its sources on one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
