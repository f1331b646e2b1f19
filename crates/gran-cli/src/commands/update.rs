//! Update command implementation - applies pending migrations

use anyhow::{Context, Result};
use gran_core::LedgerEntry;
use gran_migrate::ApplyOutcome;

use crate::cli::{GlobalArgs, UpdateArgs};
use crate::commands::common::{build_migrator, load_project};

/// Execute the update command
pub(crate) async fn execute(args: &UpdateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = build_migrator(&project)?;

    match args.migration.as_deref() {
        None => match migrator.apply_next().await.context("Update failed")? {
            Some(entry) => print_applied(&entry),
            None => println!("No pending migrations."),
        },
        Some(target) if target.eq_ignore_ascii_case("all") => {
            let applied = migrator.apply_all().await.context("Update failed")?;
            if applied.is_empty() {
                println!("No pending migrations.");
            }
            for entry in &applied {
                print_applied(entry);
            }
            if !applied.is_empty() {
                println!("\n{} migration(s) applied.", applied.len());
            }
        }
        Some(token) => match migrator
            .apply_specific(token)
            .await
            .with_context(|| format!("Update of '{token}' failed"))?
        {
            ApplyOutcome::Applied(entry) => print_applied(&entry),
            ApplyOutcome::AlreadyApplied(script) => {
                println!("Migration {} is already applied.", script.file_name)
            }
        },
    }
    Ok(())
}

fn print_applied(entry: &LedgerEntry) {
    println!(
        "Applied {} ({}ms)",
        entry.script_name, entry.execution_duration_ms
    );
}
