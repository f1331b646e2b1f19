//! Date-based version allocation.

use crate::error::{CoreError, CoreResult};
use crate::repository::list_migrations;
use crate::script::MigrationScript;
use crate::version::{MigrationVersion, MAX_DAILY_SEQUENCE};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// Allocate the next version for scripts in `dir` at local time `now`.
///
/// Read-only: calling it twice without creating a file returns the same value.
pub fn next_version(dir: &Path, now: NaiveDateTime) -> CoreResult<MigrationVersion> {
    let scripts = list_migrations(dir)?;
    next_version_among(&scripts, now.date())
}

/// Allocate the next version for `date` given the already-known scripts.
///
/// The sequence is one more than the highest sequence among versions on the
/// same date, starting at `001`. Versions without a numeric sequence count as
/// zero.
pub fn next_version_among(
    scripts: &[MigrationScript],
    date: NaiveDate,
) -> CoreResult<MigrationVersion> {
    let highest = scripts
        .iter()
        .filter(|s| s.version.is_on(date))
        .map(|s| s.version.sequence().unwrap_or(0))
        .max()
        .unwrap_or(0);

    let next = highest
        .checked_add(1)
        .filter(|next| *next <= MAX_DAILY_SEQUENCE)
        .ok_or_else(|| CoreError::SequenceExhausted {
            date: MigrationVersion::date_prefix(date),
            max: MAX_DAILY_SEQUENCE,
        })?;

    let version = MigrationVersion::from_parts(date, next);
    log::debug!("Allocated migration version {version}");
    Ok(version)
}
