//! Schema Error Cleanup
//!
//! JSON-schema validators report `oneOf` failures as one line per schema
//! alternative. Most alternatives fail only because the value has the
//! wrong JSON type for that arm ("got string, want object"), which says
//! nothing useful to the author. These helpers reduce such reports to a
//! single readable line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Header line some validators wrap their report in.
const VALIDATION_HEADER: &str = "jsonschema validation failed with";

/// Fallback when nothing readable is left.
pub const GENERIC_SCHEMA_ERROR: &str = "schema validation failed";

static TYPE_CONFLICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"got \w+, want \w+").expect("valid regex"));

static AT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^at '([^']*)':\s*(.*)$").expect("valid regex"));

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed.strip_prefix("- ").unwrap_or(trimmed).trim()
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Cleans a `oneOf` failure report.
///
/// Type-conflict branches are dropped. Surviving branches lose their
/// `at '<path>':` prefix: branches at the path of the `oneOf` itself (or
/// at the document root) keep just the message, deeper branches keep their
/// last path segment, quoted. Branches are joined with `"; "`.
///
/// When every branch is a type conflict the input is returned unchanged.
///
/// # Example
///
/// ```
/// use workflow_imports::validation::clean_one_of_message;
///
/// let raw = "at '/engine': 'oneOf' failed, none matched\n\
///            - at '/engine': value must be one of 'a','b'\n\
///            - at '/engine': got string, want object";
/// assert_eq!(clean_one_of_message(raw), "value must be one of 'a','b'");
/// ```
pub fn clean_one_of_message(message: &str) -> String {
    let mut one_of_path: Option<String> = None;
    let mut meaningful: Vec<String> = Vec::new();

    for line in message.lines() {
        let line = strip_bullet(line);
        if line.is_empty() {
            continue;
        }

        if line.contains("'oneOf' failed") {
            if one_of_path.is_none() {
                one_of_path = AT_PATH
                    .captures(line)
                    .map(|caps| caps[1].to_string())
                    .or_else(|| Some(String::new()));
            }
            continue;
        }

        if TYPE_CONFLICT.is_match(line) {
            continue;
        }

        let cleaned = match AT_PATH.captures(line) {
            Some(caps) => {
                let path = &caps[1];
                let text = &caps[2];
                let is_own_path = one_of_path.as_deref() == Some(path);
                if path.is_empty() || path == "/" || is_own_path {
                    text.to_string()
                } else {
                    format!("'{}': {}", last_segment(path), text)
                }
            }
            None => line.to_string(),
        };

        if !cleaned.is_empty() {
            meaningful.push(cleaned);
        }
    }

    if meaningful.is_empty() {
        return message.to_string();
    }
    meaningful.join("; ")
}

/// Cleans any schema validation report into one line.
///
/// The validator's header line and a root-level `at '': ` prefix are
/// always removed; `oneOf` reports go through [`clean_one_of_message`].
/// Falls back to [`GENERIC_SCHEMA_ERROR`] when nothing is left.
pub fn clean_schema_error(raw: &str) -> String {
    let body: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.contains(VALIDATION_HEADER))
        .collect();

    if body.is_empty() {
        return GENERIC_SCHEMA_ERROR.to_string();
    }

    if let Some(start) = body.iter().position(|line| line.contains("'oneOf' failed")) {
        let block: Vec<&str> = body[start..].iter().map(|line| strip_bullet(line)).collect();
        let cleaned = clean_one_of_message(&block.join("\n"));
        let cleaned = cleaned.trim();
        return if cleaned.is_empty() {
            GENERIC_SCHEMA_ERROR.to_string()
        } else {
            cleaned.to_string()
        };
    }

    let cleaned: Vec<&str> = body
        .iter()
        .map(|line| strip_bullet(line))
        .map(|line| line.strip_prefix("at '': ").unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .collect();

    if cleaned.is_empty() {
        GENERIC_SCHEMA_ERROR.to_string()
    } else {
        cleaned.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_of_keeps_meaningful_branch() {
        let raw = "at '/engine': 'oneOf' failed, none matched\n\
                   - at '/engine': value must be one of 'a','b'\n\
                   - at '/engine': got string, want object";
        let cleaned = clean_one_of_message(raw);
        assert!(cleaned.contains("value must be one of 'a','b'"));
        assert!(!cleaned.contains("oneOf"));
        assert!(!cleaned.contains("got string, want object"));
    }

    #[test]
    fn test_one_of_all_type_conflicts_returns_original() {
        let raw = "at '/tools': 'oneOf' failed, none matched\n\
                   - at '/tools': got string, want object\n\
                   - at '/tools': got string, want array";
        assert_eq!(clean_one_of_message(raw), raw);
    }

    #[test]
    fn test_one_of_deeper_branches_keep_last_segment() {
        let raw = "at '/engine': 'oneOf' failed, none matched\n\
                   - at '/engine': got object, want string\n\
                   - at '/engine/version': value must be >= 1\n\
                   - at '/engine': missing property 'id'";
        assert_eq!(
            clean_one_of_message(raw),
            "'version': value must be >= 1; missing property 'id'"
        );
    }

    #[test]
    fn test_one_of_root_branch_loses_prefix() {
        let raw = "at '': 'oneOf' failed, none matched\n- at '': missing property 'on'";
        assert_eq!(clean_one_of_message(raw), "missing property 'on'");
    }

    #[test]
    fn test_schema_error_strips_header_and_root_prefix() {
        let raw = "jsonschema validation failed with 'included_file_schema.json#'\n\
                   - at '': additional properties 'on' not allowed";
        assert_eq!(clean_schema_error(raw), "additional properties 'on' not allowed");
    }

    #[test]
    fn test_schema_error_with_nested_one_of() {
        let raw = "jsonschema validation failed with 'included_file_schema.json#'\n\
                   - at '/engine': 'oneOf' failed, none matched\n  \
                     - at '/engine': value must be one of 'claude', 'codex'\n  \
                     - at '/engine': got string, want object";
        assert_eq!(
            clean_schema_error(raw),
            "value must be one of 'claude', 'codex'"
        );
    }

    #[test]
    fn test_schema_error_keeps_non_root_paths() {
        let raw = "at '/imports': got string, want array";
        assert_eq!(clean_schema_error(raw), "at '/imports': got string, want array");
    }

    #[test]
    fn test_schema_error_fallback() {
        assert_eq!(clean_schema_error(""), GENERIC_SCHEMA_ERROR);
        assert_eq!(
            clean_schema_error("jsonschema validation failed with 'x.json'\n"),
            GENERIC_SCHEMA_ERROR
        );
        assert_eq!(clean_schema_error("at '': "), GENERIC_SCHEMA_ERROR);
    }
}
