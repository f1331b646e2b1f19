//! New command implementation - creates a migration script from the template

use anyhow::{Context, Result};
use chrono::Local;
use gran_core::create_migration_with_terminator;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::load_project;

/// Execute the new command
pub(crate) async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrations = project.config.migrations_path_absolute(&project.root);

    let script = create_migration_with_terminator(
        &migrations,
        &args.name,
        Local::now().naive_local(),
        &project.config.batch_terminator,
    )
    .with_context(|| format!("Failed to create migration '{}'", args.name))?;

    println!("Created migration: {}", script.path.display());
    Ok(())
}
