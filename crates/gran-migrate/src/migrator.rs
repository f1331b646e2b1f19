//! The migration engine.

use crate::error::{error_chain, MigrateError, MigrateResult};
use crate::report::{AppliedMigration, ApplyOutcome, MigrationStatus, RollbackReport};
use crate::settings::MigratorSettings;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use gran_core::{
    create_migration_with_terminator, find_by_file_name, find_in, list_migrations, next_version,
    Config, LedgerEntry, MigrationScript, MigrationVersion, ScriptSplitter, Section,
};
use gran_db::{Database, DuckDbBackend};
use gran_ledger::{Ledger, MigrationLock};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Applies and rolls back migration scripts against one store.
///
/// Operations run one at a time. When the advisory lock is enabled, every
/// mutating operation holds it from ledger creation through commit.
pub struct Migrator {
    db: Arc<dyn Database>,
    ledger: Ledger,
    lock: Option<MigrationLock>,
    splitter: ScriptSplitter,
    migrations_dir: PathBuf,
}

impl Migrator {
    pub fn new(db: Arc<dyn Database>, settings: MigratorSettings) -> Self {
        let lock = settings
            .lock_expiry
            .map(|expiry| MigrationLock::new(db.clone(), settings.ledger.clone(), expiry));
        Self {
            ledger: Ledger::new(db.clone(), settings.ledger),
            db,
            lock,
            splitter: ScriptSplitter::new(settings.batch_terminator),
            migrations_dir: settings.migrations_dir,
        }
    }

    /// Open the project's DuckDB database and build an engine for it.
    pub fn from_config(config: &Config, root: &Path) -> MigrateResult<Self> {
        let settings = MigratorSettings::from_config(config, root)?;
        let db = match config.database_path_absolute(root) {
            Some(path) => DuckDbBackend::from_path(&path)?,
            None => DuckDbBackend::in_memory()?,
        };
        Ok(Self::new(Arc::new(db), settings))
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // Repository passthroughs

    /// Scripts on disk, in version order.
    pub fn list_migrations(&self) -> MigrateResult<Vec<MigrationScript>> {
        Ok(list_migrations(&self.migrations_dir)?)
    }

    /// Resolve a token to a script; `None` when nothing matches.
    pub fn find_migration(&self, token: &str) -> MigrateResult<Option<MigrationScript>> {
        let scripts = self.list_migrations()?;
        Ok(find_in(&scripts, token).cloned())
    }

    /// The version the next created script would get.
    pub fn next_version(&self, now: NaiveDateTime) -> MigrateResult<MigrationVersion> {
        Ok(next_version(&self.migrations_dir, now)?)
    }

    /// Create a new script from the template.
    pub fn create_migration(&self, name: &str, now: NaiveDateTime) -> MigrateResult<MigrationScript> {
        Ok(create_migration_with_terminator(
            &self.migrations_dir,
            name,
            now,
            self.splitter.terminator(),
        )?)
    }

    // Ledger queries

    /// Create the ledger if it does not exist yet.
    pub async fn ensure_ledger(&self) -> MigrateResult<()> {
        Ok(self.ledger.ensure_store().await?)
    }

    pub async fn applied_set(&self) -> MigrateResult<BTreeSet<MigrationVersion>> {
        self.ensure_ledger().await?;
        Ok(self.ledger.applied_set().await?)
    }

    pub async fn all_applied(&self) -> MigrateResult<Vec<LedgerEntry>> {
        self.ensure_ledger().await?;
        Ok(self.ledger.all_applied().await?)
    }

    pub async fn last_applied(&self) -> MigrateResult<Option<LedgerEntry>> {
        self.ensure_ledger().await?;
        Ok(self.ledger.last_applied().await?)
    }

    /// Scripts not yet applied, in version order.
    pub async fn pending(&self) -> MigrateResult<Vec<MigrationScript>> {
        let applied = self.applied_set().await?;
        Ok(self
            .list_migrations()?
            .into_iter()
            .filter(|s| !applied.contains(&s.version))
            .collect())
    }

    // Mutating operations

    /// Apply one script regardless of its position in the pending order.
    ///
    /// An already-applied script is not run again; its existing entry is
    /// returned.
    pub async fn apply_one(&self, script: &MigrationScript) -> MigrateResult<LedgerEntry> {
        self.acquire_lock().await?;
        let result = self.apply_one_locked(script).await;
        self.release_lock().await;
        result
    }

    /// Apply the lowest pending version, if any.
    pub async fn apply_next(&self) -> MigrateResult<Option<LedgerEntry>> {
        self.acquire_lock().await?;
        let result = self.apply_next_locked().await;
        self.release_lock().await;
        result
    }

    /// Apply every pending version in order, stopping at the first failure.
    pub async fn apply_all(&self) -> MigrateResult<Vec<LedgerEntry>> {
        self.acquire_lock().await?;
        let result = self.apply_all_locked().await;
        self.release_lock().await;
        result
    }

    /// Apply the script `token` resolves to, unless it is already applied.
    pub async fn apply_specific(&self, token: &str) -> MigrateResult<ApplyOutcome> {
        self.acquire_lock().await?;
        let result = self.apply_specific_locked(token).await;
        self.release_lock().await;
        result
    }

    /// Undo the most recently applied migration by `applied_at`.
    pub async fn rollback_last(&self) -> MigrateResult<RollbackReport> {
        self.acquire_lock().await?;
        let result = self.rollback_last_locked().await;
        self.release_lock().await;
        result
    }

    /// Repository against ledger.
    ///
    /// `current_version` follows version order, so it can differ from what
    /// [`rollback_last`](Self::rollback_last) would undo when migrations were
    /// applied out of order.
    pub async fn status(&self) -> MigrateResult<MigrationStatus> {
        let entries = self.all_applied().await?;
        let applied_at: BTreeMap<MigrationVersion, DateTime<Utc>> = entries
            .into_iter()
            .map(|e| (e.version, e.applied_at))
            .collect();

        let (applied, pending): (Vec<_>, Vec<_>) = self
            .list_migrations()?
            .into_iter()
            .partition(|s| applied_at.contains_key(&s.version));

        let applied = applied
            .into_iter()
            .filter_map(|script| {
                let at = *applied_at.get(&script.version)?;
                Some(AppliedMigration {
                    script,
                    applied_at: at,
                })
            })
            .collect();

        Ok(MigrationStatus::new(applied, pending))
    }

    async fn acquire_lock(&self) -> MigrateResult<()> {
        if let Some(lock) = &self.lock {
            lock.acquire().await?;
        }
        Ok(())
    }

    async fn release_lock(&self) {
        if let Some(lock) = &self.lock {
            if let Err(e) = lock.release().await {
                log::warn!("Failed to release migration lock: {e}");
            }
        }
    }

    async fn apply_one_locked(&self, script: &MigrationScript) -> MigrateResult<LedgerEntry> {
        let existing = self
            .all_applied()
            .await?
            .into_iter()
            .find(|e| e.version == script.version);
        if let Some(entry) = existing {
            log::info!("{} is already applied", script.file_name);
            return Ok(entry);
        }
        self.apply_script(script).await
    }

    async fn apply_next_locked(&self) -> MigrateResult<Option<LedgerEntry>> {
        let pending = self.pending().await?;
        match pending.first() {
            Some(script) => self.apply_script(script).await.map(Some),
            None => {
                log::info!("No pending migrations");
                Ok(None)
            }
        }
    }

    async fn apply_all_locked(&self) -> MigrateResult<Vec<LedgerEntry>> {
        let pending = self.pending().await?;
        if pending.is_empty() {
            log::info!("No pending migrations");
        }
        let mut applied = Vec::with_capacity(pending.len());
        for script in &pending {
            match self.apply_script(script).await {
                Ok(entry) => applied.push(entry),
                Err(e) => {
                    if !applied.is_empty() {
                        log::warn!(
                            "{} migration(s) committed before {} failed",
                            applied.len(),
                            script.file_name
                        );
                    }
                    return Err(e);
                }
            }
        }
        Ok(applied)
    }

    async fn apply_specific_locked(&self, token: &str) -> MigrateResult<ApplyOutcome> {
        let script = self
            .find_migration(token)?
            .ok_or_else(|| MigrateError::ScriptNotFound {
                token: token.to_string(),
            })?;
        if self.applied_set().await?.contains(&script.version) {
            log::info!("{} is already applied", script.file_name);
            return Ok(ApplyOutcome::AlreadyApplied(script));
        }
        self.apply_script(&script).await.map(ApplyOutcome::Applied)
    }

    /// Run one script's UP section in a transaction and record the outcome.
    async fn apply_script(&self, script: &MigrationScript) -> MigrateResult<LedgerEntry> {
        let content = read_script(script)?;
        let batches = self.splitter.batches(&content, Section::Up);
        if batches.is_empty() {
            log::warn!("{} has no UP batches", script.file_name);
        }

        log::info!("Applying {}", script.file_name);
        let applied_at = now_utc();
        let started = Instant::now();

        self.db.begin_transaction().await?;
        let attempt = async {
            self.run_batches(script, &batches).await?;
            let entry = LedgerEntry::succeeded(script, applied_at, elapsed_ms(started));
            self.ledger.record(&entry).await?;
            self.db.commit().await?;
            Ok::<_, MigrateError>(entry)
        }
        .await;

        match attempt {
            Ok(entry) => {
                log::info!(
                    "Applied {} in {}ms",
                    script.file_name,
                    entry.execution_duration_ms
                );
                Ok(entry)
            }
            Err(err) => {
                self.abort_transaction().await;
                let failure =
                    LedgerEntry::failed(script, applied_at, elapsed_ms(started), error_chain(&err));
                if let Err(record_err) = self.ledger.record(&failure).await {
                    log::warn!(
                        "Failed to record failed attempt for {}: {record_err}",
                        script.file_name
                    );
                }
                log::error!("Migration {} failed: {}", script.file_name, error_chain(&err));
                Err(err)
            }
        }
    }

    async fn rollback_last_locked(&self) -> MigrateResult<RollbackReport> {
        self.ensure_ledger().await?;
        let last = self
            .ledger
            .last_applied()
            .await?
            .ok_or(MigrateError::NothingToRollBack)?;

        let scripts = self.list_migrations()?;
        let script = find_by_file_name(&scripts, &last.script_name)
            .filter(|s| s.version == last.version)
            .cloned()
            .ok_or_else(|| MigrateError::ScriptNotFound {
                token: last.script_name.clone(),
            })?;

        let content = read_script(&script)?;
        let batches = self.splitter.batches(&content, Section::Down);
        if batches.is_empty() {
            return Err(MigrateError::NoDownSection {
                script: script.file_name,
            });
        }

        log::info!("Rolling back {}", script.file_name);
        let started = Instant::now();

        self.db.begin_transaction().await?;
        let attempt = async {
            self.run_batches(&script, &batches).await?;
            self.ledger.unrecord(&last.version).await?;
            self.db.commit().await?;
            Ok::<_, MigrateError>(())
        }
        .await;

        if let Err(err) = attempt {
            self.abort_transaction().await;
            log::error!("Rollback of {} failed: {}", script.file_name, error_chain(&err));
            return Err(err);
        }

        let duration_ms = elapsed_ms(started);
        log::info!("Rolled back {} in {duration_ms}ms", script.file_name);
        Ok(RollbackReport {
            version: last.version,
            batches: batches.len(),
            script,
            duration_ms,
        })
    }

    async fn run_batches(&self, script: &MigrationScript, batches: &[String]) -> MigrateResult<()> {
        for (idx, batch) in batches.iter().enumerate() {
            log::debug!(
                "Executing batch {}/{} of {}",
                idx + 1,
                batches.len(),
                script.file_name
            );
            self.db
                .execute_batch(batch)
                .await
                .map_err(|source| MigrateError::BatchFailed {
                    script: script.file_name.clone(),
                    batch: idx + 1,
                    source,
                })?;
        }
        Ok(())
    }

    async fn abort_transaction(&self) {
        if let Err(e) = self.db.rollback().await {
            log::warn!("Transaction rollback failed: {e}");
        }
    }
}

fn read_script(script: &MigrationScript) -> MigrateResult<String> {
    script
        .read_content()
        .map_err(|source| MigrateError::ScriptRead {
            script: script.file_name.clone(),
            source,
        })
}

/// Current time at the ledger's microsecond precision.
fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}
