//! Strongly-typed migration version token.
//!
//! Versions have the shape `YYYY.MM.DD_NNN`: a dotted date followed by a
//! zero-padded three digit daily sequence. Because every component is
//! fixed-width, plain string ordering is chronological-then-sequence ordering,
//! so the newtype derives `Ord` straight from the inner `String`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Highest daily sequence number a version can carry.
pub const MAX_DAILY_SEQUENCE: u32 = 999;

/// `chrono` format of the date component.
pub const VERSION_DATE_FORMAT: &str = "%Y.%m.%d";

/// Separator between the date component and the daily sequence.
pub const VERSION_SEPARATOR: char = '_';

/// Sortable migration version token (`YYYY.MM.DD_NNN`).
///
/// Files whose names do not follow the convention still get a version (the
/// parser falls back to the file stem), so the wrapper does not enforce the
/// shape; [`sequence`](Self::sequence) returns `None` for such tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationVersion(String);

impl MigrationVersion {
    /// Wrap an already-formatted version token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Build a version from a date and a daily sequence number.
    pub fn from_parts(date: NaiveDate, sequence: u32) -> Self {
        Self(format!(
            "{}{}{:03}",
            Self::date_prefix(date),
            VERSION_SEPARATOR,
            sequence
        ))
    }

    /// Format the date component of a version for `date`.
    pub fn date_prefix(date: NaiveDate) -> String {
        date.format(VERSION_DATE_FORMAT).to_string()
    }

    /// Whether this version was allocated on `date`.
    pub fn is_on(&self, date: NaiveDate) -> bool {
        let prefix = Self::date_prefix(date);
        self.0
            .strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.starts_with(VERSION_SEPARATOR))
    }

    /// Daily sequence number, if the token carries a numeric one.
    pub fn sequence(&self) -> Option<u32> {
        let mut parts = self.0.split(VERSION_SEPARATOR);
        parts.next()?;
        parts.next()?.parse().ok()
    }

    /// Return the underlying token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationVersion {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationVersion {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for MigrationVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MigrationVersion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for MigrationVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationVersion {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
