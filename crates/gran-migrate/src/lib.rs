//! gran-migrate - Migration engine for Granulet
//!
//! [`Migrator`] ties the script repository, the splitter, and the history
//! ledger together. Every apply or rollback runs its batches inside a single
//! store transaction.

pub mod error;
pub mod migrator;
pub mod report;
pub mod settings;

pub use error::{MigrateError, MigrateResult};
pub use migrator::Migrator;
pub use report::{AppliedMigration, ApplyOutcome, MigrationStatus, RollbackReport};
pub use settings::MigratorSettings;
