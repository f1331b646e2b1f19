//! Status command implementation

use anyhow::Result;
use gran_migrate::MigrationStatus;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{build_migrator, load_project, print_table};

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrator = build_migrator(&project)?;
    let status = migrator.status().await?;

    match args.output {
        StatusOutput::Table => print_status(&status),
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&status)?),
    }
    Ok(())
}

fn print_status(status: &MigrationStatus) {
    println!("Applied migrations:");
    if status.applied.is_empty() {
        println!("  (none)");
    } else {
        let rows: Vec<Vec<String>> = status
            .applied
            .iter()
            .map(|a| {
                vec![
                    a.script.version.to_string(),
                    a.script.name.clone(),
                    a.applied_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]
            })
            .collect();
        print_table(&["VERSION", "NAME", "APPLIED AT (UTC)"], &rows);
    }

    println!("\nPending migrations:");
    if status.pending.is_empty() {
        println!("  (none)");
    } else {
        let rows: Vec<Vec<String>> = status
            .pending
            .iter()
            .map(|s| vec![s.version.to_string(), s.name.clone()])
            .collect();
        print_table(&["VERSION", "NAME"], &rows);
    }

    println!();
    println!(
        "Current version: {}",
        status.current_version.as_deref().unwrap_or("(none)")
    );
    println!("Pending count: {}", status.pending_count);
}
