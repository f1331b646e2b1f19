use super::*;

const BASIC: &str = "-- UP Migration\nCREATE TABLE t(x INT);\nGO\n-- DOWN Migration\nDROP TABLE t;\nGO";

fn splitter() -> ScriptSplitter {
    ScriptSplitter::default()
}

#[test]
fn test_basic_up_section() {
    let up = splitter().extract_section(BASIC, Section::Up);
    assert_eq!(up, "CREATE TABLE t(x INT);");
    assert_eq!(splitter().split_batches(&up), vec!["CREATE TABLE t(x INT);"]);
}

#[test]
fn test_basic_down_section() {
    let down = splitter().extract_section(BASIC, Section::Down);
    assert_eq!(down, "DROP TABLE t;");
}

#[test]
fn test_markers_are_case_insensitive() {
    let content = "-- up migration (apply)\nSELECT 1;\n-- Down MIGRATION (rollback)\nSELECT 2;";
    assert_eq!(splitter().extract_section(content, Section::Up), "SELECT 1;");
    assert_eq!(splitter().extract_section(content, Section::Down), "SELECT 2;");
}

#[test]
fn test_separator_lines_are_excluded() {
    let content = "\
-- =============================================
-- UP Migration (Apply)
-- =============================================
CREATE TABLE a (id INT);
GO

-- =============================================
-- DOWN Migration (Rollback)
-- =============================================
DROP TABLE a;
GO
";
    assert_eq!(
        splitter().extract_section(content, Section::Up),
        "CREATE TABLE a (id INT);"
    );
    assert_eq!(
        splitter().extract_section(content, Section::Down),
        "DROP TABLE a;"
    );
}

#[test]
fn test_header_before_up_marker_is_ignored() {
    let content = "-- Migration: x\n-- Version: 2024.01.01_001\n-- UP Migration\nSELECT 1;";
    assert_eq!(splitter().extract_section(content, Section::Up), "SELECT 1;");
}

#[test]
fn test_no_markers_whole_content_is_up() {
    let content = "CREATE TABLE a (id INT);\nGO\nCREATE TABLE b (id INT);\n";
    let up = splitter().extract_section(content, Section::Up);
    assert_eq!(up, "CREATE TABLE a (id INT);\nGO\nCREATE TABLE b (id INT);");
    assert_eq!(
        splitter().split_batches(&up),
        vec!["CREATE TABLE a (id INT);", "CREATE TABLE b (id INT);"]
    );
    assert_eq!(splitter().extract_section(content, Section::Down), "");
}

#[test]
fn test_only_down_marker_up_is_everything_before() {
    let content = "CREATE TABLE a (id INT);\nGO\n-- DOWN Migration\nDROP TABLE a;";
    assert_eq!(
        splitter().extract_section(content, Section::Up),
        "CREATE TABLE a (id INT);"
    );
    assert_eq!(
        splitter().extract_section(content, Section::Down),
        "DROP TABLE a;"
    );
}

#[test]
fn test_missing_down_marker_yields_empty_down() {
    let content = "-- UP Migration\nCREATE TABLE a (id INT);\nGO";
    assert!(splitter().extract_section(content, Section::Down).is_empty());
    assert!(splitter().batches(content, Section::Down).is_empty());
}

#[test]
fn test_down_marker_before_up_marker() {
    let content = "-- DOWN Migration\nDROP TABLE a;\n-- UP Migration\nCREATE TABLE a (id INT);";
    assert_eq!(
        splitter().extract_section(content, Section::Up),
        "CREATE TABLE a (id INT);"
    );
    assert_eq!(
        splitter().extract_section(content, Section::Down),
        "DROP TABLE a;"
    );
}

#[test]
fn test_only_first_marker_counts() {
    let content = "-- UP Migration\nSELECT 1;\n-- UP Migration again\nSELECT 2;";
    let up = splitter().extract_section(content, Section::Up);
    assert_eq!(up, "SELECT 1;\n-- UP Migration again\nSELECT 2;");
}

#[test]
fn test_split_multiple_batches() {
    let text = "CREATE TABLE a (id INT);\nGO\nINSERT INTO a VALUES (1);\ngo\n  Go  \nSELECT * FROM a;";
    assert_eq!(
        splitter().split_batches(text),
        vec![
            "CREATE TABLE a (id INT);",
            "INSERT INTO a VALUES (1);",
            "SELECT * FROM a;"
        ]
    );
}

#[test]
fn test_split_drops_leading_and_trailing_terminators() {
    let text = "GO\n\nGO\nSELECT 1;\nGO\n\nGO\n";
    assert_eq!(splitter().split_batches(text), vec!["SELECT 1;"]);
}

#[test]
fn test_split_keeps_batch_internals_verbatim() {
    let text = "\n-- create the table\nCREATE TABLE a (\n    id INT -- key\n);\n\nGO";
    assert_eq!(
        splitter().split_batches(text),
        vec!["-- create the table\nCREATE TABLE a (\n    id INT -- key\n);"]
    );
}

#[test]
fn test_terminator_must_be_whole_line() {
    let text = "SELECT 'GO';\nGOTO label\nGO";
    assert_eq!(
        splitter().split_batches(text),
        vec!["SELECT 'GO';\nGOTO label"]
    );
}

#[test]
fn test_custom_terminator() {
    let splitter = ScriptSplitter::new(";;");
    let text = "SELECT 1;\n;;\nSELECT 2;\nGO";
    assert_eq!(splitter.terminator(), ";;");
    assert_eq!(splitter.split_batches(text), vec!["SELECT 1;", "SELECT 2;\nGO"]);
}

#[test]
fn test_crlf_line_endings() {
    let content = "-- UP Migration\r\nSELECT 1;\r\nGO\r\n-- DOWN Migration\r\nSELECT 2;\r\nGO\r\n";
    assert_eq!(splitter().batches(content, Section::Up), vec!["SELECT 1;"]);
    assert_eq!(splitter().batches(content, Section::Down), vec!["SELECT 2;"]);
}

#[test]
fn test_empty_content() {
    assert!(splitter().extract_section("", Section::Up).is_empty());
    assert!(splitter().split_batches("").is_empty());
}
