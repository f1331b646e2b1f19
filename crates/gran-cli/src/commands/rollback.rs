//! Rollback command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, RollbackArgs};
use crate::commands::common::{build_migrator, load_project};

/// Execute the rollback command
pub(crate) async fn execute(_args: &RollbackArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = build_migrator(&project)?;

    let report = migrator.rollback_last().await.context("Rollback failed")?;
    println!(
        "Rolled back {} ({} batch(es), {}ms)",
        report.script.file_name, report.batches, report.duration_ms
    );
    Ok(())
}
