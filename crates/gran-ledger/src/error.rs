//! Error types for gran-ledger

use gran_db::DbError;
use thiserror::Error;

/// Ledger and lock errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Schema or table name is not a plain identifier (L001)
    #[error("[L001] Invalid ledger identity: {0}")]
    InvalidIdentity(String),

    /// The store rejected a ledger operation (L002)
    #[error("[L002] Ledger unavailable while {context}")]
    Unavailable {
        context: String,
        #[source]
        source: DbError,
    },

    /// A stored row could not be decoded (L003)
    #[error("[L003] Corrupt ledger row: {0}")]
    CorruptRow(String),

    /// Another process holds the migration lock (L004)
    #[error("[L004] Migration lock held by {holder} until {expires_at}")]
    LockHeld { holder: String, expires_at: String },

    /// No successful entry exists for the version being removed (L005)
    #[error("[L005] No successful ledger entry for version {version}")]
    EntryMissing { version: String },
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Attach ledger context to a store error.
pub(crate) trait StoreContext<T> {
    fn store_context(self, context: &str) -> LedgerResult<T>;
}

impl<T> StoreContext<T> for Result<T, DbError> {
    fn store_context(self, context: &str) -> LedgerResult<T> {
        self.map_err(|source| LedgerError::Unavailable {
            context: context.to_string(),
            source,
        })
    }
}
