//! gran-ledger - Migration history for Granulet
//!
//! The ledger is an append/delete table in the target store recording every
//! migration attempt. A companion lock table serializes mutating commands
//! across processes.

pub mod error;
pub mod identity;
pub mod ledger;
pub mod lock;

pub use error::{LedgerError, LedgerResult};
pub use identity::LedgerIdentity;
pub use ledger::Ledger;
pub use lock::MigrationLock;
