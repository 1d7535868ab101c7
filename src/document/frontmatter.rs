//! Markdown Frontmatter
//!
//! Splits a workflow markdown file into its YAML frontmatter and body and
//! reads the fields the resolver consumes.
//!
//! ```markdown
//! ---
//! imports:
//!   - shared/tools.md
//! tools:
//!   github:
//!     allowed: [get_issue]
//! ---
//!
//! # Body
//! ```

use serde_json::{Map, Value};

/// A markdown file split into frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Parsed frontmatter; an empty object when the file has none
    pub frontmatter: Value,
    pub body: String,
}

impl Document {
    /// Parses markdown content.
    ///
    /// # Errors
    ///
    /// Returns a message when the frontmatter is unterminated, is not valid
    /// YAML, or is not a mapping.
    pub fn parse(content: &str) -> Result<Self, String> {
        let (yaml, body) = split_frontmatter(content)?;

        let frontmatter = match yaml {
            Some(yaml) if !yaml.trim().is_empty() => {
                let value: Value = serde_yaml::from_str(yaml)
                    .map_err(|e| format!("invalid frontmatter YAML: {}", e))?;
                match value {
                    Value::Object(_) => value,
                    Value::Null => Value::Object(Map::new()),
                    _ => return Err("frontmatter must be a mapping".to_string()),
                }
            }
            _ => Value::Object(Map::new()),
        };

        Ok(Self {
            frontmatter,
            body: body.to_string(),
        })
    }

    pub fn has_frontmatter(&self) -> bool {
        self.frontmatter.as_object().is_some_and(|map| !map.is_empty())
    }

    /// Entries of the `imports:` field.
    pub fn imports(&self) -> Result<Vec<String>, String> {
        imports_list(&self.frontmatter)
    }
}

/// Splits `content` into the raw frontmatter YAML (if any) and the body.
///
/// Frontmatter must start on the first line with `---` and end with a
/// line containing only `---`.
pub fn split_frontmatter(content: &str) -> Result<(Option<&str>, &str), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) => line,
        None => return Ok((None, content)),
    };
    if first.trim_end() != "---" {
        return Ok((None, content));
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            return Ok((Some(&content[start..offset]), &content[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err("frontmatter is not closed with '---'".to_string())
}

/// Reads the `imports:` field.
///
/// An absent or null field is an empty list; any non-sequence value, or a
/// non-string entry, is an error.
pub fn imports_list(frontmatter: &Value) -> Result<Vec<String>, String> {
    match frontmatter.get("imports") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
                Value::String(_) => Err("imports entries must not be empty".to_string()),
                other => Err(format!("imports entries must be strings, got {}", type_name(other))),
            })
            .collect(),
        Some(other) => Err(format!(
            "imports must be a sequence, got {}",
            type_name(other)
        )),
    }
}

/// JSON type name as used in validation messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_frontmatter() {
        let doc = Document::parse("---\ntools:\n  github: null\n---\n# Title\n\nBody\n").unwrap();
        assert_eq!(doc.frontmatter, json!({"tools": {"github": null}}));
        assert_eq!(doc.body, "# Title\n\nBody\n");
        assert!(doc.has_frontmatter());
    }

    #[test]
    fn test_parse_without_frontmatter() {
        let doc = Document::parse("# Title\n---\nnot frontmatter\n").unwrap();
        assert_eq!(doc.frontmatter, json!({}));
        assert_eq!(doc.body, "# Title\n---\nnot frontmatter\n");
        assert!(!doc.has_frontmatter());
    }

    #[test]
    fn test_parse_crlf_and_empty_frontmatter() {
        let doc = Document::parse("---\r\n---\r\nBody\r\n").unwrap();
        assert_eq!(doc.frontmatter, json!({}));
        assert_eq!(doc.body, "Body\r\n");
    }

    #[test]
    fn test_parse_unterminated_frontmatter() {
        assert!(Document::parse("---\ntools: {}\n# no end\n").is_err());
    }

    #[test]
    fn test_parse_non_mapping_frontmatter() {
        assert!(Document::parse("---\n- a\n- b\n---\nBody").is_err());
        assert!(Document::parse("---\ntools: [unclosed\n---\n").is_err());
    }

    #[test]
    fn test_imports_list() {
        let doc =
            Document::parse("---\nimports:\n  - shared/a.md\n  - octo/lib/b.md@v1\n---\n").unwrap();
        assert_eq!(doc.imports().unwrap(), vec!["shared/a.md", "octo/lib/b.md@v1"]);
    }

    #[test]
    fn test_imports_must_be_sequence() {
        let err = imports_list(&json!({"imports": "shared/a.md"})).unwrap_err();
        assert!(err.contains("sequence"));
        assert!(imports_list(&json!({"imports": {"a": 1}})).is_err());
        assert!(imports_list(&json!({"imports": [1]})).is_err());
        assert!(imports_list(&json!({"imports": [""]})).is_err());
        assert!(imports_list(&json!({"imports": null})).unwrap().is_empty());
        assert!(imports_list(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&json!("x")), "string");
        assert_eq!(type_name(&json!(3)), "integer");
        assert_eq!(type_name(&json!(1.5)), "number");
        assert_eq!(type_name(&json!([])), "array");
    }
}
