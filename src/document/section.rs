//! Markdown Section Extraction
//!
//! `path.md#Section` includes only the part of a file under the heading
//! whose text matches `Section`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::directive::FenceTracker;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").expect("valid regex"));

/// Level and text of an ATX heading line.
fn heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str();
    Some((level, text))
}

/// Extracts the section titled `section` (case-insensitive).
///
/// The section runs from its heading line up to the next heading of the
/// same or a higher level. Headings inside fenced code blocks are ignored.
/// Returns `None` when no heading matches.
///
/// # Example
///
/// ```
/// use workflow_imports::document::extract_section;
///
/// let content = "# Guide\n## Setup\nrun it\n### Detail\nmore\n## Usage\nuse it\n";
/// assert_eq!(
///     extract_section(content, "setup").unwrap(),
///     "## Setup\nrun it\n### Detail\nmore"
/// );
/// ```
pub fn extract_section(content: &str, section: &str) -> Option<String> {
    let wanted = section.trim().to_lowercase();
    let mut fences = FenceTracker::default();
    let mut level: Option<usize> = None;
    let mut collected: Vec<&str> = Vec::new();

    for line in content.lines() {
        let fenced = fences.observe(line);

        if !fenced {
            if let Some((heading_level, text)) = heading(line) {
                match level {
                    Some(current) if heading_level <= current => break,
                    None if text.to_lowercase() == wanted => {
                        level = Some(heading_level);
                        collected.push(line);
                        continue;
                    }
                    _ => {}
                }
            }
        }

        if level.is_some() {
            collected.push(line);
        }
    }

    level?;
    Some(collected.join("\n").trim_end().to_string())
}
