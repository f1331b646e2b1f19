//! Where the ledger lives in the target store.

use crate::error::{LedgerError, LedgerResult};
use gran_core::sql_utils::{is_valid_identifier, quote_pair};
use gran_core::HistoryConfig;
use std::fmt;

/// Default ledger schema.
pub const DEFAULT_SCHEMA: &str = "main";

/// Default ledger table.
pub const DEFAULT_TABLE: &str = "__migration_history";

/// Validated `schema.table` pair naming the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerIdentity {
    schema: String,
    table: String,
}

impl LedgerIdentity {
    /// Build an identity; both parts must match `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> LedgerResult<Self> {
        let schema = schema.into();
        let table = table.into();
        for part in [&schema, &table] {
            if !is_valid_identifier(part) {
                return Err(LedgerError::InvalidIdentity(format!(
                    "'{part}' is not a valid identifier"
                )));
            }
        }
        Ok(Self { schema, table })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Quoted `"schema"."table"` for the ledger table.
    pub fn qualified(&self) -> String {
        quote_pair(&self.schema, &self.table)
    }

    /// Unquoted name of the companion lock table.
    pub fn lock_table(&self) -> String {
        format!("{}_lock", self.table)
    }

    /// Quoted `"schema"."<table>_lock"`.
    pub fn qualified_lock(&self) -> String {
        quote_pair(&self.schema, &self.lock_table())
    }

    /// Name of the `applied_at` index.
    pub(crate) fn applied_at_index(&self) -> String {
        format!("ix_{}_applied_at", self.table)
    }
}

impl Default for LedgerIdentity {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl TryFrom<&HistoryConfig> for LedgerIdentity {
    type Error = LedgerError;

    fn try_from(config: &HistoryConfig) -> LedgerResult<Self> {
        Self::new(config.schema.clone(), config.table.clone())
    }
}

impl fmt::Display for LedgerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let id = LedgerIdentity::default();
        assert_eq!(id.to_string(), "main.__migration_history");
        assert_eq!(id.qualified(), r#""main"."__migration_history""#);
        assert_eq!(id.qualified_lock(), r#""main"."__migration_history_lock""#);
    }

    #[test]
    fn test_rejects_injection() {
        let err = LedgerIdentity::new("main", "t; DROP TABLE x").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidIdentity(_)));
        assert!(LedgerIdentity::new("", "t").is_err());
    }

    #[test]
    fn test_from_history_config() {
        let config = HistoryConfig {
            schema: "ops".to_string(),
            table: "history".to_string(),
        };
        let id = LedgerIdentity::try_from(&config).unwrap();
        assert_eq!(id.schema(), "ops");
        assert_eq!(id.table(), "history");
    }
}
