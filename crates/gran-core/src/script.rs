//! Migration script model and file name parsing

use crate::error::{CoreError, CoreResult};
use crate::version::{MigrationVersion, VERSION_SEPARATOR};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File extension of migration scripts.
pub const SCRIPT_EXTENSION: &str = "sql";

/// A migration script discovered on disk.
///
/// The body is not cached; [`read_content`](Self::read_content) reads the
/// file each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationScript {
    /// Ordered version token
    pub version: MigrationVersion,

    /// Slug portion of the file name
    pub name: String,

    /// File name including extension (also the ledger's script name)
    pub file_name: String,

    /// Absolute or project-relative path to the file
    pub path: PathBuf,
}

impl MigrationScript {
    /// Build a script from a path, parsing version and name from the file name.
    ///
    /// Returns `None` when the path has no UTF-8 file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let (version, name) = parse_file_name(&file_name);
        Some(Self {
            version,
            name,
            file_name,
            path: path.to_path_buf(),
        })
    }

    /// Read the current script body from disk.
    pub fn read_content(&self) -> CoreResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| CoreError::IoWithPath {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

/// Whether `path` names a migration script (`*.sql`, any case).
pub(crate) fn is_script_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SCRIPT_EXTENSION))
}

/// Remove a trailing `.sql` (any case); other names are returned whole since
/// the version's own dots would otherwise be mistaken for an extension.
fn strip_script_extension(file_name: &str) -> &str {
    let ext_len = SCRIPT_EXTENSION.len() + 1;
    if file_name.len() > ext_len && file_name.is_char_boundary(file_name.len() - ext_len) {
        let (stem, ext) = file_name.split_at(file_name.len() - ext_len);
        if ext.starts_with('.') && ext[1..].eq_ignore_ascii_case(SCRIPT_EXTENSION) {
            return stem;
        }
    }
    file_name
}

/// Split a script file name into `(version, name)`.
///
/// The stem (file name minus `.sql`) is split on `_`:
/// - three or more segments: the first two form the version
///   (`YYYY.MM.DD_NNN`) and the rest, re-joined, is the name;
/// - exactly two segments: first is the version, second the name;
/// - anything else falls back to the whole stem for both fields.
///
/// Empty leading segments also take the fallback so that no script ends up
/// with an empty version.
pub fn parse_file_name(file_name: &str) -> (MigrationVersion, String) {
    let stem = strip_script_extension(file_name);

    let parts: Vec<&str> = stem.split(VERSION_SEPARATOR).collect();
    match parts.as_slice() {
        [date, seq, rest @ ..] if !rest.is_empty() && !date.is_empty() && !seq.is_empty() => {
            let version = format!("{date}{VERSION_SEPARATOR}{seq}");
            let name = rest.join("_");
            (MigrationVersion::new(version), name)
        }
        [version, name] if !version.is_empty() && !name.is_empty() => {
            (MigrationVersion::new(*version), (*name).to_string())
        }
        _ => {
            log::debug!("Unrecognised migration file name '{file_name}', using stem as version");
            (MigrationVersion::new(stem), stem.to_string())
        }
    }
}
