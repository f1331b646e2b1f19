//! Migration directory scanning, lookup, and script creation.

use crate::allocator::next_version_among;
use crate::error::{CoreError, CoreResult};
use crate::script::{is_script_path, MigrationScript, SCRIPT_EXTENSION};
use crate::splitter::DEFAULT_BATCH_TERMINATOR;
use crate::template;
use chrono::NaiveDateTime;
use std::path::Path;

/// List the migration scripts in `dir`, sorted by version.
///
/// A missing directory is an empty list. Only regular `*.sql` files directly
/// inside `dir` are considered; equal versions are ordered by file name.
pub fn list_migrations(dir: &Path) -> CoreResult<Vec<MigrationScript>> {
    if !dir.is_dir() {
        log::debug!("Migrations directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() || !is_script_path(&path) {
            continue;
        }
        match MigrationScript::from_path(&path) {
            Some(script) => scripts.push(script),
            None => log::warn!("Skipping non UTF-8 script name: {}", path.display()),
        }
    }

    scripts.sort_by(|a, b| {
        a.version
            .cmp(&b.version)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    Ok(scripts)
}

/// Resolve `token` against already-listed scripts.
///
/// Policies are tried in order and the first that matches wins:
/// 1. file name equals the token (case-insensitive)
/// 2. file name equals the token plus `.sql`
/// 3. name equals the token (case-insensitive)
/// 4. file name contains the token (case-insensitive)
///
/// `scripts` is expected in version order, so ties go to the earliest version.
pub fn find_in<'a>(scripts: &'a [MigrationScript], token: &str) -> Option<&'a MigrationScript> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let folded = fold_case(token);
    let with_ext = format!("{folded}.{SCRIPT_EXTENSION}");

    find_by_file_name(scripts, token)
        .or_else(|| scripts.iter().find(|s| fold_case(&s.file_name) == with_ext))
        .or_else(|| scripts.iter().find(|s| fold_case(&s.name) == folded))
        .or_else(|| {
            scripts
                .iter()
                .find(|s| fold_case(&s.file_name).contains(&folded))
        })
}

/// The script whose file name equals `file_name` (case-insensitive).
pub fn find_by_file_name<'a>(
    scripts: &'a [MigrationScript],
    file_name: &str,
) -> Option<&'a MigrationScript> {
    let folded = fold_case(file_name.trim());
    scripts.iter().find(|s| fold_case(&s.file_name) == folded)
}

fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Find one migration in `dir` by file name, name, or file name fragment.
pub fn find_migration(dir: &Path, token: &str) -> CoreResult<Option<MigrationScript>> {
    let scripts = list_migrations(dir)?;
    Ok(find_in(&scripts, token).cloned())
}

/// Create a new migration script in `dir` from the standard template.
///
/// The directory is created if needed. Whitespace in `name` becomes `_`.
pub fn create_migration(
    dir: &Path,
    name: &str,
    now: NaiveDateTime,
) -> CoreResult<MigrationScript> {
    create_migration_with_terminator(dir, name, now, DEFAULT_BATCH_TERMINATOR)
}

/// [`create_migration`] with a project-specific batch terminator in the template.
pub fn create_migration_with_terminator(
    dir: &Path,
    name: &str,
    now: NaiveDateTime,
    terminator: &str,
) -> CoreResult<MigrationScript> {
    let slug = normalize_name(name)?;

    std::fs::create_dir_all(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let existing = list_migrations(dir)?;
    let version = next_version_among(&existing, now.date())?;
    let file_name = format!("{version}_{slug}.{SCRIPT_EXTENSION}");
    let path = dir.join(&file_name);

    if path.exists() {
        return Err(CoreError::MigrationExists {
            path: path.display().to_string(),
        });
    }

    let body = template::render(&slug, &version, now, terminator);
    std::fs::write(&path, body).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    log::info!("Created migration {}", path.display());

    Ok(MigrationScript {
        version,
        name: slug,
        file_name,
        path,
    })
}

/// Turn a user-supplied name into a file name slug.
fn normalize_name(name: &str) -> CoreResult<String> {
    let invalid = |reason: &str| CoreError::InvalidMigrationName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if trimmed.contains(['/', '\\']) || trimmed.contains("..") {
        return Err(invalid("name cannot contain path separators or '..'"));
    }
    if trimmed.starts_with('.') {
        return Err(invalid("name cannot start with '.'"));
    }

    Ok(trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_"))
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
