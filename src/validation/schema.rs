//! Included File Schema
//!
//! Checks the frontmatter of imported files. Files anywhere under the
//! workflows directory are held to the schema strictly; files elsewhere
//! (agent files, instruction files) only produce warnings.
//!
//! Reports are worded like a JSON-schema validator's so that
//! [`clean_schema_error`](super::clean_schema_error) can simplify them.

use serde_json::{Map, Value};

use crate::document::frontmatter::type_name;

/// Identifier used in the report header.
pub const INCLUDED_FILE_SCHEMA: &str = "included_file_schema.json#";

/// Top-level keys an imported file may declare.
pub const ALLOWED_KEYS: &[&str] = &[
    "applyTo",
    "description",
    "engine",
    "imports",
    "inputs",
    "mcp-servers",
    "model",
    "name",
    "network",
    "permissions",
    "runtimes",
    "safe-outputs",
    "secret-masking",
    "services",
    "steps",
    "tools",
];

/// Engine identifiers accepted in string form.
pub const ENGINES: &[&str] = &["claude", "codex", "copilot", "custom"];

/// How a validation failure is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Failure aborts resolution
    Strict,
    /// Failure is reported as a warning
    Permissive,
}

impl ValidationMode {
    /// Mode for an imported file at `path`.
    ///
    /// Strict for files anywhere under the workflows directory, including its
    /// subdirectories, permissive everywhere else.
    pub fn for_path(path: &str, workflows_dir: &str) -> Self {
        let path = path.replace('\\', "/");
        let dir = workflows_dir.trim_matches('/');
        if dir.is_empty() {
            return ValidationMode::Permissive;
        }

        let nested = format!("/{}/", dir);
        let rest = if let Some(rest) = path.strip_prefix(&format!("{}/", dir)) {
            Some(rest)
        } else {
            path.rfind(&nested).map(|index| &path[index + nested.len()..])
        };

        match rest {
            Some(name) if !name.is_empty() => ValidationMode::Strict,
            _ => ValidationMode::Permissive,
        }
    }
}

/// A frontmatter validator for imported files.
pub trait FrontmatterValidator {
    /// Validates `frontmatter`; on failure returns the raw report.
    fn validate(&self, frontmatter: &Value) -> Result<(), String>;
}

/// Built-in schema for imported workflow files.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludedFileSchema;

impl IncludedFileSchema {
    fn violation(&self, frontmatter: &Value) -> Option<String> {
        let map = match frontmatter {
            Value::Object(map) => map,
            other => return Some(format!("at '': got {}, want object", type_name(other))),
        };

        if let Some(report) = unknown_keys(map) {
            return Some(report);
        }

        for key in ["description", "name", "model"] {
            if let Some(value) = map.get(key) {
                if !value.is_string() {
                    return Some(type_conflict(key, value, "string"));
                }
            }
        }

        if let Some(imports) = map.get("imports") {
            match imports {
                Value::Array(items) => {
                    if let Some((index, item)) =
                        items.iter().enumerate().find(|(_, item)| !item.is_string())
                    {
                        return Some(type_conflict(&format!("imports/{}", index), item, "string"));
                    }
                }
                Value::Null => {}
                other => return Some(type_conflict("imports", other, "array")),
            }
        }

        if let Some(tools) = map.get("tools") {
            if !matches!(tools, Value::Object(_) | Value::Array(_) | Value::Null) {
                let got = type_name(tools);
                return Some(one_of(
                    "tools",
                    &[
                        format!("got {}, want object", got),
                        format!("got {}, want array", got),
                    ],
                ));
            }
        }

        if let Some(servers) = map.get("mcp-servers") {
            if !matches!(servers, Value::Object(_) | Value::Null) {
                return Some(type_conflict("mcp-servers", servers, "object"));
            }
        }

        if let Some(engine) = map.get("engine") {
            if let Some(report) = check_engine(engine) {
                return Some(report);
            }
        }

        None
    }
}

impl FrontmatterValidator for IncludedFileSchema {
    fn validate(&self, frontmatter: &Value) -> Result<(), String> {
        match self.violation(frontmatter) {
            None => Ok(()),
            Some(report) => Err(format!(
                "jsonschema validation failed with '{}'\n- {}",
                INCLUDED_FILE_SCHEMA, report
            )),
        }
    }
}

fn unknown_keys(map: &Map<String, Value>) -> Option<String> {
    let mut unknown: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|key| !ALLOWED_KEYS.contains(key))
        .collect();

    if unknown.is_empty() {
        return None;
    }

    unknown.sort_unstable();
    let quoted: Vec<String> = unknown.iter().map(|key| format!("'{}'", key)).collect();
    Some(format!("at '': additional properties {} not allowed", quoted.join(", ")))
}

fn type_conflict(pointer: &str, value: &Value, want: &str) -> String {
    format!("at '/{}': got {}, want {}", pointer, type_name(value), want)
}

/// A `oneOf` report. Branches without their own `at` prefix are reported at
/// `pointer`.
fn one_of(pointer: &str, branches: &[String]) -> String {
    let mut report = format!("at '/{}': 'oneOf' failed, none matched", pointer);
    for branch in branches {
        if branch.starts_with("at '") {
            report.push_str(&format!("\n  - {}", branch));
        } else {
            report.push_str(&format!("\n  - at '/{}': {}", pointer, branch));
        }
    }
    report
}

fn check_engine(engine: &Value) -> Option<String> {
    let allowed: Vec<String> = ENGINES.iter().map(|name| format!("'{}'", name)).collect();
    let enum_branch = format!("value must be one of {}", allowed.join(", "));

    match engine {
        Value::String(name) if ENGINES.contains(&name.as_str()) => None,
        Value::String(_) => Some(one_of(
            "engine",
            &[enum_branch, "got string, want object".to_string()],
        )),
        Value::Object(fields) => match fields.get("id") {
            Some(Value::String(id)) if ENGINES.contains(&id.as_str()) => None,
            Some(Value::String(_)) => Some(one_of(
                "engine",
                &[
                    "got object, want string".to_string(),
                    format!("at '/engine/id': {}", enum_branch),
                ],
            )),
            Some(other) => Some(one_of(
                "engine",
                &[
                    "got object, want string".to_string(),
                    format!("at '/engine/id': got {}, want string", type_name(other)),
                ],
            )),
            None => Some(one_of(
                "engine",
                &[
                    "got object, want string".to_string(),
                    "missing property 'id'".to_string(),
                ],
            )),
        },
        other => {
            let got = type_name(other);
            Some(one_of(
                "engine",
                &[
                    format!("got {}, want string", got),
                    format!("got {}, want object", got),
                ],
            ))
        }
    }
}
