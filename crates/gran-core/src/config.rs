//! Configuration types and parsing for granulet.yml

use crate::error::{CoreError, CoreResult};
use crate::splitter::DEFAULT_BATCH_TERMINATOR;
use crate::sql_utils::is_valid_identifier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Primary config file name.
pub const CONFIG_FILE_NAME: &str = "granulet.yml";

/// Alternate config file name, checked after [`CONFIG_FILE_NAME`].
pub const ALT_CONFIG_FILE_NAME: &str = "granulet.yaml";

const DEFAULT_DB_PATH: &str = ":memory:";
const DEFAULT_LOCK_EXPIRY_SECS: u64 = 300;

/// Main project configuration from granulet.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory holding migration scripts, relative to the project root
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Line token that separates batches inside a section
    #[serde(default = "default_batch_terminator")]
    pub batch_terminator: String,

    /// Target store connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Ledger table location
    #[serde(default)]
    pub history: HistoryConfig,

    /// Advisory lock settings
    #[serde(default)]
    pub lock: LockConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Where the history ledger lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    #[serde(default = "default_history_schema")]
    pub schema: String,

    #[serde(default = "default_history_table")]
    pub table: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            schema: default_history_schema(),
            table: default_history_table(),
        }
    }
}

/// Advisory lock taken around mutating operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds after which a held lock is considered stale
    #[serde(default = "default_lock_expiry_secs")]
    pub expiry_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expiry_secs: DEFAULT_LOCK_EXPIRY_SECS,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_batch_terminator() -> String {
    DEFAULT_BATCH_TERMINATOR.to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_history_schema() -> String {
    "main".to_string()
}

fn default_history_table() -> String {
    "__migration_history".to_string()
}

fn default_lock_expiry_secs() -> u64 {
    DEFAULT_LOCK_EXPIRY_SECS
}

impl Config {
    /// A fresh configuration with every default filled in.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            migrations_path: default_migrations_path(),
            batch_terminator: default_batch_terminator(),
            database: DatabaseConfig::default(),
            history: HistoryConfig::default(),
            lock: LockConfig::default(),
        }
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for granulet.yml or granulet.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::file_in(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAME).display().to_string(),
            }),
        }
    }

    /// Write this configuration to `dir/granulet.yml`, returning the path.
    pub fn save(&self, dir: &Path) -> CoreResult<PathBuf> {
        self.validate()?;
        let path = dir.join(CONFIG_FILE_NAME);
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(&path, yaml).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(path)
    }

    /// Walk from `start` up through its ancestors looking for a project
    /// directory (one containing a config file).
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| Self::file_in(dir).is_some())
            .map(Path::to_path_buf)
    }

    /// Config file inside `dir`, if one exists.
    pub fn file_in(dir: &Path) -> Option<PathBuf> {
        [CONFIG_FILE_NAME, ALT_CONFIG_FILE_NAME]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Absolute migrations directory for a project rooted at `root`.
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.migrations_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// Absolute database path, or `None` for an in-memory database.
    pub fn database_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        if self.database.path == DEFAULT_DB_PATH {
            return None;
        }
        let path = Path::new(&self.database.path);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }

        let terminator = self.batch_terminator.trim();
        if terminator.is_empty() || terminator.contains(char::is_whitespace) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "batch_terminator must be a single non-empty token, got '{}'",
                    self.batch_terminator
                ),
            });
        }

        for (key, value) in [
            ("history.schema", &self.history.schema),
            ("history.table", &self.history.table),
        ] {
            if !is_valid_identifier(value) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{key} '{value}' is not a valid identifier (letters, digits, underscore)"
                    ),
                });
            }
        }

        if self.lock.expiry_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "lock.expiry_secs must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
