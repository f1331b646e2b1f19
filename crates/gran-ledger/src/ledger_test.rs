use super::*;
use chrono::{Duration, TimeZone};
use gran_db::DuckDbBackend;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
}

fn entry(version: &str, name: &str, at: DateTime<Utc>, success: bool) -> LedgerEntry {
    LedgerEntry {
        version: MigrationVersion::from(version),
        script_name: format!("{version}_{name}.sql"),
        applied_at: at,
        execution_duration_ms: 5,
        success,
        error_message: (!success).then(|| "boom".to_string()),
    }
}

async fn ledger() -> Ledger {
    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ledger = Ledger::new(db, LedgerIdentity::default());
    ledger.ensure_store().await.unwrap();
    ledger
}

#[tokio::test]
async fn test_ensure_store_is_idempotent() {
    let ledger = ledger().await;
    ledger
        .record(&entry("2024.01.01_001", "init", ts(0), true))
        .await
        .unwrap();

    ledger.ensure_store().await.unwrap();
    assert_eq!(ledger.attempts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_ensure_store_custom_schema() {
    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ledger = Ledger::new(
        db.clone(),
        LedgerIdentity::new("ops", "schema_history").unwrap(),
    );
    ledger.ensure_store().await.unwrap();
    assert!(db.relation_exists("ops.schema_history").await.unwrap());
}

#[tokio::test]
async fn test_empty_ledger() {
    let ledger = ledger().await;
    assert!(ledger.applied_set().await.unwrap().is_empty());
    assert!(ledger.all_applied().await.unwrap().is_empty());
    assert!(ledger.last_applied().await.unwrap().is_none());
}

#[tokio::test]
async fn test_applied_set_ignores_failures() {
    let ledger = ledger().await;
    ledger
        .record(&entry("2024.01.01_001", "init", ts(0), true))
        .await
        .unwrap();
    ledger
        .record(&entry("2024.01.01_002", "bad", ts(10), false))
        .await
        .unwrap();

    let applied = ledger.applied_set().await.unwrap();
    assert_eq!(applied.len(), 1);
    assert!(applied.contains("2024.01.01_001"));
    assert_eq!(ledger.attempts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_all_applied_ordered_by_time() {
    let ledger = ledger().await;
    // applied out of version order
    ledger
        .record(&entry("2024.01.01_002", "second", ts(0), true))
        .await
        .unwrap();
    ledger
        .record(&entry("2024.01.01_001", "first", ts(60), true))
        .await
        .unwrap();

    let all = ledger.all_applied().await.unwrap();
    let versions: Vec<&str> = all.iter().map(|e| e.version.as_str()).collect();
    assert_eq!(versions, vec!["2024.01.01_002", "2024.01.01_001"]);

    let last = ledger.last_applied().await.unwrap().unwrap();
    assert_eq!(last.version, "2024.01.01_001");
}

#[tokio::test]
async fn test_equal_timestamps_break_ties_by_version() {
    let ledger = ledger().await;
    ledger
        .record(&entry("2024.01.01_002", "b", ts(0), true))
        .await
        .unwrap();
    ledger
        .record(&entry("2024.01.01_001", "a", ts(0), true))
        .await
        .unwrap();

    let last = ledger.last_applied().await.unwrap().unwrap();
    assert_eq!(last.version, "2024.01.01_002");
}

#[tokio::test]
async fn test_entry_fields_survive_storage() {
    let ledger = ledger().await;
    let at = ts(5) + Duration::microseconds(123_456);
    let failed = entry("2024.01.01_003", "oops", at, false);
    ledger.record(&failed).await.unwrap();

    let stored = ledger.attempts().await.unwrap();
    assert_eq!(stored, vec![failed]);
}

#[tokio::test]
async fn test_unrecord_removes_only_success_row() {
    let ledger = ledger().await;
    ledger
        .record(&entry("2024.01.01_001", "init", ts(0), false))
        .await
        .unwrap();
    ledger
        .record(&entry("2024.01.01_001", "init", ts(10), true))
        .await
        .unwrap();

    ledger
        .unrecord(&MigrationVersion::from("2024.01.01_001"))
        .await
        .unwrap();

    assert!(ledger.applied_set().await.unwrap().is_empty());
    let remaining = ledger.attempts().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].success);
}

#[tokio::test]
async fn test_unrecord_missing_entry() {
    let ledger = ledger().await;
    let err = ledger
        .unrecord(&MigrationVersion::from("2024.01.01_009"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EntryMissing { .. }));
}

#[tokio::test]
async fn test_record_joins_open_transaction() {
    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ledger = Ledger::new(db.clone(), LedgerIdentity::default());
    ledger.ensure_store().await.unwrap();

    db.begin_transaction().await.unwrap();
    ledger
        .record(&entry("2024.01.01_001", "init", ts(0), true))
        .await
        .unwrap();
    db.rollback().await.unwrap();

    assert!(ledger.applied_set().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reads_without_store_are_unavailable() {
    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ledger = Ledger::new(db, LedgerIdentity::default());
    let err = ledger.applied_set().await.unwrap_err();
    assert!(matches!(err, LedgerError::Unavailable { .. }));
}
