//! Init command implementation - scaffolds a new Granulet project

use anyhow::{Context, Result};
use gran_core::Config;
use std::fs;
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};

const DEFAULT_PROJECT_NAME: &str = "granulet";

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let base = Path::new(&global.project_dir);

    let (project_dir, name) = match &args.name {
        Some(name) => {
            validate_project_name(name)?;
            (base.join(name), name.clone())
        }
        None => {
            let name = fs::canonicalize(base)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
            (base.to_path_buf(), name)
        }
    };

    if let Some(existing) = Config::file_in(&project_dir) {
        anyhow::bail!(
            "A Granulet project already exists at '{}'",
            existing.display()
        );
    }

    println!("Creating new Granulet project: {}\n", name);

    let mut config = Config::new(&name);
    config.database.path = format!("{}.duckdb", database_stem(&name));

    let migrations = config.migrations_path_absolute(&project_dir);
    fs::create_dir_all(&migrations)
        .with_context(|| format!("Failed to create directory: {}", migrations.display()))?;
    let config_path = config
        .save(&project_dir)
        .context("Failed to write project config")?;

    println!("  Created {}", config_path.display());
    println!("  Created {}/", migrations.display());
    println!("\nNext: gran new <migration_name>");
    Ok(())
}

fn validate_project_name(name: &str) -> Result<()> {
    if name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
        || name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not be empty, contain '/', '\\', '..', or start with '.' or '-'",
            name
        );
    }
    Ok(())
}

/// Database file stem derived from the project name.
fn database_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        stem
    }
}
