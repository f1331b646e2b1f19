//! UP/DOWN section extraction and batch splitting for migration scripts.
//!
//! Scripts are scanned line by line in two passes. The first pass locates the
//! first UP marker and the first DOWN marker; the second tags every line with
//! the section it belongs to. Extraction then filters by tag.

/// Default batch terminator line.
pub const DEFAULT_BATCH_TERMINATOR: &str = "GO";

const UP_MARKER: &str = "-- up migration";
const DOWN_MARKER: &str = "-- down migration";

/// Which half of a migration script to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Forward migration
    Up,
    /// Reverse migration
    Down,
}

/// Per-line classification produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineTag {
    /// Outside any marked section
    Unmarked,
    Up,
    Down,
    /// The section marker line itself
    Marker,
    /// Decorative `-- =====` line inside a marked section
    Separator,
}

/// Splits migration scripts into sections and executable batches.
#[derive(Debug, Clone)]
pub struct ScriptSplitter {
    terminator: String,
}

impl Default for ScriptSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_TERMINATOR)
    }
}

impl ScriptSplitter {
    /// Create a splitter that separates batches on `terminator` lines.
    pub fn new(terminator: impl Into<String>) -> Self {
        Self {
            terminator: terminator.into(),
        }
    }

    /// The batch terminator token.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Extract the text of one section of a script.
    ///
    /// UP is the text between the UP marker and the DOWN marker (or end of
    /// file). Without an UP marker the whole script is UP, unless a DOWN marker
    /// exists, in which case UP is everything before it. DOWN is empty when
    /// there is no DOWN marker.
    ///
    /// Leading and trailing blank lines and terminator lines are trimmed.
    pub fn extract_section(&self, content: &str, section: Section) -> String {
        let lines: Vec<&str> = content.lines().collect();
        let (up_marker, down_marker) = find_markers(&lines);
        let tags = tag_lines(&lines, up_marker, down_marker);

        let wanted = match (section, up_marker, down_marker) {
            (Section::Up, Some(_), _) => LineTag::Up,
            (Section::Up, None, _) => LineTag::Unmarked,
            (Section::Down, _, Some(_)) => LineTag::Down,
            (Section::Down, _, None) => return String::new(),
        };

        let selected: Vec<&str> = lines
            .iter()
            .zip(&tags)
            .filter(|(_, tag)| **tag == wanted)
            .map(|(line, _)| *line)
            .collect();

        let trimmed = trim_lines(&selected, |line| {
            line.trim().is_empty() || self.is_terminator(line)
        });
        trimmed.join("\n")
    }

    /// Split section text into ordered, non-empty batches.
    ///
    /// A batch ends at any line that, trimmed, equals the terminator
    /// (case-insensitive). Consecutive terminators and blank batches produce
    /// nothing. Batch bodies are passed through verbatim apart from dropping
    /// leading and trailing blank lines.
    pub fn split_batches(&self, section_text: &str) -> Vec<String> {
        let mut batches = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in section_text.lines() {
            if self.is_terminator(line) {
                flush_batch(&mut current, &mut batches);
            } else {
                current.push(line);
            }
        }
        flush_batch(&mut current, &mut batches);

        batches
    }

    /// Extract a section and split it in one step.
    pub fn batches(&self, content: &str, section: Section) -> Vec<String> {
        self.split_batches(&self.extract_section(content, section))
    }

    fn is_terminator(&self, line: &str) -> bool {
        line.trim().eq_ignore_ascii_case(&self.terminator)
    }
}

/// Classify a line as a section marker.
fn marker_of(line: &str) -> Option<Section> {
    let lowered = line.trim().to_lowercase();
    if lowered.starts_with(UP_MARKER) {
        Some(Section::Up)
    } else if lowered.starts_with(DOWN_MARKER) {
        Some(Section::Down)
    } else {
        None
    }
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("--") && trimmed.contains("===")
}

/// First pass: index of the first UP marker and first DOWN marker.
fn find_markers(lines: &[&str]) -> (Option<usize>, Option<usize>) {
    let mut up = None;
    let mut down = None;
    for (idx, line) in lines.iter().enumerate() {
        match marker_of(line) {
            Some(Section::Up) if up.is_none() => up = Some(idx),
            Some(Section::Down) if down.is_none() => down = Some(idx),
            _ => {}
        }
        if up.is_some() && down.is_some() {
            break;
        }
    }
    (up, down)
}

/// Second pass: tag each line with the section it belongs to.
fn tag_lines(lines: &[&str], up: Option<usize>, down: Option<usize>) -> Vec<LineTag> {
    let mut region = LineTag::Unmarked;
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if Some(idx) == up {
                region = LineTag::Up;
                LineTag::Marker
            } else if Some(idx) == down {
                region = LineTag::Down;
                LineTag::Marker
            } else if region != LineTag::Unmarked && is_separator(line) {
                LineTag::Separator
            } else {
                region
            }
        })
        .collect()
}

/// Drop lines matching `skip` from both ends.
fn trim_lines<'a, F>(lines: &[&'a str], skip: F) -> Vec<&'a str>
where
    F: Fn(&str) -> bool,
{
    let start = lines.iter().position(|l| !skip(l));
    let end = lines.iter().rposition(|l| !skip(l));
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

fn flush_batch<'a>(current: &mut Vec<&'a str>, batches: &mut Vec<String>) {
    let body = trim_lines(current, |line| line.trim().is_empty());
    if !body.is_empty() {
        batches.push(body.join("\n"));
    }
    current.clear();
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
