//! History ledger stored in the target database.

use crate::error::{LedgerError, LedgerResult, StoreContext};
use crate::identity::LedgerIdentity;
use chrono::{DateTime, NaiveDateTime, Utc};
use gran_core::{LedgerEntry, MigrationVersion};
use gran_db::{Database, Row, SqlValue};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Format used to bind `applied_at` (microsecond precision, UTC).
const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format of a TIMESTAMP cast to VARCHAR; the fraction may be absent.
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const ENTRY_COLUMNS: &str = "version, script_name, CAST(applied_at AS VARCHAR), \
                             execution_duration_ms, success, error_message";

/// Append/delete record of migration attempts.
///
/// The ledger issues its statements through the same [`Database`] handle as
/// the engine, so [`record`](Self::record) and [`unrecord`](Self::unrecord)
/// join whatever transaction the caller has open.
pub struct Ledger {
    db: Arc<dyn Database>,
    identity: LedgerIdentity,
}

impl Ledger {
    pub fn new(db: Arc<dyn Database>, identity: LedgerIdentity) -> Self {
        Self { db, identity }
    }

    pub fn identity(&self) -> &LedgerIdentity {
        &self.identity
    }

    /// Create the ledger schema, table, and index if missing.
    ///
    /// Idempotent; existing rows are never touched.
    pub async fn ensure_store(&self) -> LedgerResult<()> {
        let table = self.identity.qualified();
        self.db
            .create_schema_if_not_exists(&gran_core::sql_utils::quote_ident(
                self.identity.schema(),
            ))
            .await
            .store_context("creating ledger schema")?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                version VARCHAR NOT NULL,
                script_name VARCHAR NOT NULL,
                applied_at TIMESTAMP NOT NULL,
                execution_duration_ms BIGINT NOT NULL,
                success BOOLEAN NOT NULL,
                error_message VARCHAR
            );
            CREATE INDEX IF NOT EXISTS {index} ON {table} (applied_at);",
            index = gran_core::sql_utils::quote_ident(&self.identity.applied_at_index()),
        );
        self.db
            .execute_batch(&ddl)
            .await
            .store_context("creating ledger table")?;
        log::debug!("Ledger {} ready", self.identity);
        Ok(())
    }

    /// Versions with at least one successful entry.
    pub async fn applied_set(&self) -> LedgerResult<BTreeSet<MigrationVersion>> {
        let sql = format!(
            "SELECT DISTINCT version FROM {} WHERE success",
            self.identity.qualified()
        );
        let rows = self
            .db
            .query_rows(&sql, &[])
            .await
            .store_context("reading applied versions")?;

        rows.iter()
            .map(|row| {
                row.get_str(0)
                    .map(MigrationVersion::from)
                    .map_err(|e| LedgerError::CorruptRow(e.to_string()))
            })
            .collect()
    }

    /// Successful entries, oldest first.
    pub async fn all_applied(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} WHERE success ORDER BY applied_at, version",
            self.identity.qualified()
        );
        self.query_entries(&sql, "reading applied entries").await
    }

    /// Most recent successful entry by `applied_at`.
    pub async fn last_applied(&self) -> LedgerResult<Option<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} WHERE success \
             ORDER BY applied_at DESC, version DESC LIMIT 1",
            self.identity.qualified()
        );
        let mut entries = self.query_entries(&sql, "reading last applied entry").await?;
        Ok(entries.pop())
    }

    /// Every recorded attempt, successes and failures, oldest first.
    pub async fn attempts(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} ORDER BY applied_at, version",
            self.identity.qualified()
        );
        self.query_entries(&sql, "reading ledger attempts").await
    }

    /// Append one entry.
    pub async fn record(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        let sql = format!(
            "INSERT INTO {} (version, script_name, applied_at, execution_duration_ms, success, error_message) \
             VALUES (?, ?, CAST(? AS TIMESTAMP), ?, ?, ?)",
            self.identity.qualified()
        );
        let params = [
            SqlValue::from(entry.version.as_str()),
            SqlValue::from(entry.script_name.as_str()),
            SqlValue::from(
                entry
                    .applied_at
                    .naive_utc()
                    .format(TIMESTAMP_WRITE_FORMAT)
                    .to_string(),
            ),
            SqlValue::from(entry.execution_duration_ms),
            SqlValue::from(entry.success),
            SqlValue::from(entry.error_message.clone()),
        ];
        self.db
            .execute_params(&sql, &params)
            .await
            .store_context("recording ledger entry")?;
        log::debug!(
            "Recorded {} attempt for {}",
            if entry.success { "successful" } else { "failed" },
            entry.version
        );
        Ok(())
    }

    /// Delete the successful entry for `version`. Failure rows are kept.
    pub async fn unrecord(&self, version: &MigrationVersion) -> LedgerResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE version = ? AND success",
            self.identity.qualified()
        );
        let deleted = self
            .db
            .execute_params(&sql, &[SqlValue::from(version.as_str())])
            .await
            .store_context("removing ledger entry")?;
        if deleted == 0 {
            return Err(LedgerError::EntryMissing {
                version: version.to_string(),
            });
        }
        Ok(())
    }

    async fn query_entries(&self, sql: &str, context: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let rows = self
            .db
            .query_rows(sql, &[])
            .await
            .store_context(context)?;
        rows.iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: &Row) -> LedgerResult<LedgerEntry> {
    let corrupt = |e: gran_db::DbError| LedgerError::CorruptRow(e.to_string());

    let applied_at_text = row.get_str(2).map_err(corrupt)?;
    let applied_at = NaiveDateTime::parse_from_str(applied_at_text, TIMESTAMP_READ_FORMAT)
        .map_err(|e| {
            LedgerError::CorruptRow(format!("applied_at '{applied_at_text}': {e}"))
        })?;

    Ok(LedgerEntry {
        version: MigrationVersion::from(row.get_str(0).map_err(corrupt)?),
        script_name: row.get_str(1).map_err(corrupt)?.to_string(),
        applied_at: DateTime::<Utc>::from_naive_utc_and_offset(applied_at, Utc),
        execution_duration_ms: row.get_i64(3).map_err(corrupt)?,
        success: row.get_bool(4).map_err(corrupt)?,
        error_message: row.get_opt_str(5).map_err(corrupt)?.map(str::to_string),
    })
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
