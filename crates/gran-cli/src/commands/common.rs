//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use gran_core::{Config, CoreError, CONFIG_FILE_NAME};
use gran_migrate::Migrator;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// A discovered project: its root directory and loaded configuration.
#[derive(Debug)]
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

/// Locate and load the project for this invocation.
///
/// `--config` names the file directly and its directory becomes the root.
/// Otherwise discovery walks up from `--project-dir`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    if let Some(config_path) = &global.config {
        let path = Path::new(config_path);
        let config = Config::load(path).context("Failed to load project")?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        return Ok(Project { root, config });
    }

    let start = std::fs::canonicalize(&global.project_dir)
        .with_context(|| format!("Project directory not found: {}", global.project_dir))?;
    let root = Config::discover(&start).ok_or_else(|| CoreError::ConfigNotFound {
        path: start.join(CONFIG_FILE_NAME).display().to_string(),
    })?;
    let config = Config::load_from_dir(&root).context("Failed to load project")?;
    log::debug!("Using project '{}' at {}", config.name, root.display());
    Ok(Project { root, config })
}

/// Open the project's database and build the engine.
pub(crate) fn build_migrator(project: &Project) -> Result<Migrator> {
    Migrator::from_config(&project.config, &project.root).with_context(|| {
        format!(
            "Failed to open database '{}'",
            project.config.database.path
        )
    })
}

/// Column widths large enough for `headers` and every cell.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Render a left-aligned table: header, dashed separator, rows.
pub(crate) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = calculate_column_widths(headers, rows);
    let render = |cells: Vec<String>| cells.join("  ").trim_end().to_string();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| format!("{:<width$}", h, width = w))
            .collect(),
    ));
    lines.push(render(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        lines.push(render(
            row.iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
                .collect(),
        ));
    }
    lines.join("\n")
}

/// Print a formatted table to stdout.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", format_table(headers, rows));
}
