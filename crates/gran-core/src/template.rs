//! Body written into newly created migration scripts.

use crate::version::MigrationVersion;
use chrono::NaiveDateTime;

const RULE: &str = "-- =============================================";

/// Render a new migration script.
///
/// Guidance stays in the header: an untouched template has no UP batches and
/// an empty DOWN section.
pub(crate) fn render(
    name: &str,
    version: &MigrationVersion,
    generated: NaiveDateTime,
    terminator: &str,
) -> String {
    let generated = generated.format("%Y-%m-%d %H:%M:%S");
    format!(
        "\
{RULE}
-- Migration: {name}
-- Version: {version}
-- Generated: {generated}
{RULE}
-- Write forward SQL below the UP marker; it runs on `gran update`.
-- Write SQL that undoes it below the DOWN marker; it runs on `gran rollback`.
-- Separate statements that must run as distinct batches with a line
-- containing only `{terminator}`.

{RULE}
-- UP Migration (Apply)
{RULE}

{terminator}

{RULE}
-- DOWN Migration (Rollback)
{RULE}

{terminator}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::{ScriptSplitter, Section};
    use chrono::NaiveDate;

    fn rendered() -> String {
        let generated = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        render(
            "add_users",
            &MigrationVersion::new("2024.05.06_001"),
            generated,
            "GO",
        )
    }

    #[test]
    fn test_header_fields() {
        let body = rendered();
        assert!(body.contains("-- Migration: add_users"));
        assert!(body.contains("-- Version: 2024.05.06_001"));
        assert!(body.contains("-- Generated: 2024-05-06 07:08:09"));
    }

    #[test]
    fn test_untouched_template_has_no_batches() {
        let body = rendered();
        let splitter = ScriptSplitter::default();
        assert!(splitter.batches(&body, Section::Up).is_empty());
        assert!(splitter.batches(&body, Section::Down).is_empty());
    }
}
