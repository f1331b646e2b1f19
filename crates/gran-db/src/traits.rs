//! Database trait definition and the small value model it exchanges.

use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use std::fmt;

/// Database abstraction trait for Granulet
///
/// One implementation wraps one connection, so transaction control applies to
/// every statement issued through the same value until commit or rollback.
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute one or more statements in a single round trip
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a parameterised statement, returns affected rows
    async fn execute_params(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Run a parameterised query and collect every row
    async fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Row>>;

    /// Start an explicit transaction
    async fn begin_transaction(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Check if a table or view exists (`table` or `schema.table`)
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// A bound parameter or a value read back from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Boolean(b) => write!(f, "{b}"),
            SqlValue::Integer(i) => write!(f, "{i}"),
            SqlValue::Real(r) => write!(f, "{r}"),
            SqlValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Integer(i)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Boolean(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// One result row, columns in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `idx`.
    pub fn get(&self, idx: usize) -> DbResult<&SqlValue> {
        self.values
            .get(idx)
            .ok_or_else(|| DbError::RowDecode(format!("column {idx} out of range")))
    }

    /// Non-null text column.
    pub fn get_str(&self, idx: usize) -> DbResult<&str> {
        match self.get(idx)? {
            SqlValue::Text(s) => Ok(s),
            other => Err(unexpected(idx, "text", other)),
        }
    }

    /// Nullable text column.
    pub fn get_opt_str(&self, idx: usize) -> DbResult<Option<&str>> {
        match self.get(idx)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(s) => Ok(Some(s)),
            other => Err(unexpected(idx, "text or NULL", other)),
        }
    }

    /// Non-null integer column.
    pub fn get_i64(&self, idx: usize) -> DbResult<i64> {
        match self.get(idx)? {
            SqlValue::Integer(i) => Ok(*i),
            other => Err(unexpected(idx, "integer", other)),
        }
    }

    /// Non-null boolean column.
    pub fn get_bool(&self, idx: usize) -> DbResult<bool> {
        match self.get(idx)? {
            SqlValue::Boolean(b) => Ok(*b),
            other => Err(unexpected(idx, "boolean", other)),
        }
    }
}

fn unexpected(idx: usize, expected: &str, got: &SqlValue) -> DbError {
    DbError::RowDecode(format!("column {idx}: expected {expected}, got {got:?}"))
}
