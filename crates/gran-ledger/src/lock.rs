//! Advisory lock serializing migration commands against one ledger.
//!
//! The lock is a single row (`id = 1`) in `<ledger table>_lock`. A holder
//! that crashes leaves its row behind; once `expires_at` passes, the next
//! acquirer takes it over.

use crate::error::{LedgerError, LedgerResult, StoreContext};
use crate::identity::LedgerIdentity;
use chrono::{DateTime, Utc};
use gran_db::{Database, SqlValue};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Default lock lifetime.
pub const DEFAULT_LOCK_EXPIRY: Duration = Duration::from_secs(300);

/// Cross-process migration lock.
pub struct MigrationLock {
    db: Arc<dyn Database>,
    identity: LedgerIdentity,
    holder: String,
    expiry: Duration,
}

impl MigrationLock {
    /// Lock keyed by `identity`; the holder id is `<pid>:<uuid>`.
    pub fn new(db: Arc<dyn Database>, identity: LedgerIdentity, expiry: Duration) -> Self {
        Self {
            db,
            identity,
            holder: format!("{}:{}", std::process::id(), Uuid::new_v4()),
            expiry,
        }
    }

    /// Identifier written into the lock row while held.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Take the lock, failing fast with [`LedgerError::LockHeld`] when another
    /// live holder has it.
    pub async fn acquire(&self) -> LedgerResult<()> {
        self.ensure_table().await?;

        let now = Utc::now().timestamp();
        let expires = now + self.expiry_secs();
        let table = self.identity.qualified_lock();

        let insert = format!(
            "INSERT INTO {table} (id, locked_by, locked_at, expires_at) VALUES (1, ?, ?, ?)"
        );
        let insert_params = [
            SqlValue::from(self.holder.as_str()),
            SqlValue::from(now),
            SqlValue::from(expires),
        ];
        let insert_err = match self.db.execute_params(&insert, &insert_params).await {
            Ok(_) => {
                log::debug!("Acquired migration lock as {}", self.holder);
                return Ok(());
            }
            Err(e) => e,
        };

        let rows = self
            .db
            .query_rows(
                &format!("SELECT locked_by, expires_at FROM {table} WHERE id = 1"),
                &[],
            )
            .await
            .store_context("reading migration lock")?;
        let Some(row) = rows.first() else {
            // Insert failed for a reason other than an existing holder.
            return Err(LedgerError::Unavailable {
                context: "acquiring migration lock".to_string(),
                source: insert_err,
            });
        };
        let corrupt = |e: gran_db::DbError| LedgerError::CorruptRow(e.to_string());
        let locked_by = row.get_str(0).map_err(corrupt)?.to_string();
        let expires_at = row.get_i64(1).map_err(corrupt)?;

        if expires_at < now {
            let takeover = format!(
                "UPDATE {table} SET locked_by = ?, locked_at = ?, expires_at = ? \
                 WHERE id = 1 AND expires_at < ?"
            );
            let taken = self
                .db
                .execute_params(
                    &takeover,
                    &[
                        SqlValue::from(self.holder.as_str()),
                        SqlValue::from(now),
                        SqlValue::from(expires),
                        SqlValue::from(now),
                    ],
                )
                .await
                .store_context("taking over expired migration lock")?;
            if taken == 1 {
                log::warn!("Took over expired migration lock from {locked_by}");
                return Ok(());
            }
        }

        Err(LedgerError::LockHeld {
            holder: locked_by,
            expires_at: format_epoch(expires_at),
        })
    }

    /// Release the lock if this instance holds it.
    pub async fn release(&self) -> LedgerResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE id = 1 AND locked_by = ?",
            self.identity.qualified_lock()
        );
        let released = self
            .db
            .execute_params(&sql, &[SqlValue::from(self.holder.as_str())])
            .await
            .store_context("releasing migration lock")?;
        if released == 0 {
            log::warn!("Migration lock was not held by {} at release", self.holder);
        }
        Ok(())
    }

    async fn ensure_table(&self) -> LedgerResult<()> {
        self.db
            .create_schema_if_not_exists(&gran_core::sql_utils::quote_ident(
                self.identity.schema(),
            ))
            .await
            .store_context("creating lock schema")?;
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                locked_by VARCHAR NOT NULL,
                locked_at BIGINT NOT NULL,
                expires_at BIGINT NOT NULL
            )",
            self.identity.qualified_lock()
        );
        self.db
            .execute_batch(&ddl)
            .await
            .store_context("creating lock table")
    }

    fn expiry_secs(&self) -> i64 {
        i64::try_from(self.expiry.as_secs()).unwrap_or(i64::MAX / 2)
    }
}

fn format_epoch(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gran_db::DuckDbBackend;

    fn shared_db() -> Arc<dyn Database> {
        Arc::new(DuckDbBackend::in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let db = shared_db();
        let lock = MigrationLock::new(db.clone(), LedgerIdentity::default(), DEFAULT_LOCK_EXPIRY);
        lock.acquire().await.unwrap();
        assert!(db.relation_exists("__migration_history_lock").await.unwrap());

        lock.release().await.unwrap();
        lock.acquire().await.unwrap();
        lock.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_second_holder_fails_fast() {
        let db = shared_db();
        let first = MigrationLock::new(db.clone(), LedgerIdentity::default(), DEFAULT_LOCK_EXPIRY);
        let second = MigrationLock::new(db.clone(), LedgerIdentity::default(), DEFAULT_LOCK_EXPIRY);
        assert_ne!(first.holder(), second.holder());

        first.acquire().await.unwrap();
        let err = second.acquire().await.unwrap_err();
        match err {
            LedgerError::LockHeld { holder, .. } => assert_eq!(holder, first.holder()),
            other => panic!("expected LockHeld, got {other:?}"),
        }

        // release by a non-holder leaves the lock in place
        second.release().await.unwrap();
        assert!(second.acquire().await.is_err());

        first.release().await.unwrap();
        second.acquire().await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_lock_is_taken_over() {
        let db = shared_db();
        let stale = MigrationLock::new(db.clone(), LedgerIdentity::default(), DEFAULT_LOCK_EXPIRY);
        stale.acquire().await.unwrap();
        db.execute("UPDATE \"main\".\"__migration_history_lock\" SET expires_at = 0")
            .await
            .unwrap();

        let fresh = MigrationLock::new(db.clone(), LedgerIdentity::default(), DEFAULT_LOCK_EXPIRY);
        fresh.acquire().await.unwrap();

        let rows = db
            .query_rows(
                "SELECT locked_by FROM \"main\".\"__migration_history_lock\"",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(rows[0].get_str(0).unwrap(), fresh.holder());
    }

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_epoch(0), "1970-01-01T00:00:00+00:00");
    }
}
