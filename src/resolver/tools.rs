//! Tools Merger
//!
//! Folds the `tools:` and `mcp-servers:` blocks of every file in an import
//! graph into one object. Merging only ever adds capabilities:
//!
//! - objects merge key by key, recursively
//! - arrays (allow-lists) are unioned, keeping first-seen order
//! - `null` and `false` are replaced by any other value
//! - `true` (allow everything) wins over an allow-list
//! - any other conflicting scalar keeps the value seen first

use log::debug;
use serde_json::{Map, Value};

/// Tools declared by one file's frontmatter.
///
/// Agent-style files declare `tools` as an array of names. That dialect
/// contributes nothing, so the result is an empty object. Entries of
/// `mcp-servers` are folded in alongside the tools.
pub fn extract_tools(frontmatter: &Value) -> Map<String, Value> {
    let mut tools = match frontmatter.get("tools") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Array(_)) => {
            debug!("Skipping agent-style tools list");
            Map::new()
        }
        _ => Map::new(),
    };

    if let Some(Value::Object(servers)) = frontmatter.get("mcp-servers") {
        merge_tools(&mut tools, servers);
    }

    tools
}

/// Merges `incoming` into `accumulated`.
pub fn merge_tools(accumulated: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (name, value) in incoming {
        match accumulated.get_mut(name) {
            Some(existing) => merge_value(existing, value),
            None => {
                accumulated.insert(name.clone(), value.clone());
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value) {
    match (&mut *existing, incoming) {
        (Value::Object(current), Value::Object(new)) => {
            merge_tools(current, new);
            return;
        }
        (Value::Array(current), Value::Array(new)) => {
            union_into(current, new);
            return;
        }
        (Value::Array(current), Value::String(_)) => {
            union_into(current, std::slice::from_ref(incoming));
            return;
        }
        _ => {}
    }

    let replacement = match (&*existing, incoming) {
        (Value::Null | Value::Bool(false), new) if !new.is_null() => Some(incoming.clone()),
        (Value::String(_), Value::Array(new)) => {
            let mut merged = vec![existing.clone()];
            union_into(&mut merged, new);
            Some(Value::Array(merged))
        }
        (Value::Array(_), Value::Bool(true)) => Some(Value::Bool(true)),
        (current, new) if current != new && !new.is_null() => {
            debug!("Keeping {} over conflicting {}", current, new);
            None
        }
        _ => None,
    };

    if let Some(value) = replacement {
        *existing = value;
    }
}

fn union_into(current: &mut Vec<Value>, incoming: &[Value]) {
    for item in incoming {
        if !current.contains(item) {
            current.push(item.clone());
        }
    }
}

/// Running merge of every file's tools in one resolution.
#[derive(Debug, Default, Clone)]
pub struct ToolsAccumulator {
    tools: Map<String, Value>,
}

impl ToolsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in the tools declared by one file's frontmatter.
    pub fn merge_frontmatter(&mut self, frontmatter: &Value) {
        let tools = extract_tools(frontmatter);
        if !tools.is_empty() {
            merge_tools(&mut self.tools, &tools);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.tools
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_merge_inserts_new_tools() {
        let mut tools = map(json!({"github": {"allowed": ["get_issue"]}}));
        merge_tools(&mut tools, &map(json!({"bash": ["ls"]})));
        assert_eq!(
            Value::Object(tools),
            json!({"github": {"allowed": ["get_issue"]}, "bash": ["ls"]})
        );
    }

    #[test]
    fn test_merge_unions_nested_allow_lists() {
        let mut tools = map(json!({
            "github": {"allowed": ["get_issue", "list_issues"], "mode": "local"}
        }));
        let extra = map(json!({
            "github": {"allowed": ["list_issues", "create_issue"], "read-only": true}
        }));
        merge_tools(&mut tools, &extra);
        assert_eq!(
            Value::Object(tools),
            json!({"github": {
                "allowed": ["get_issue", "list_issues", "create_issue"],
                "mode": "local",
                "read-only": true
            }})
        );
    }

    #[test]
    fn test_merge_never_drops_capabilities() {
        let mut tools = map(json!({
            "bash": true,
            "edit": null,
            "web-fetch": false,
            "playwright": ["a"]
        }));
        let extra = map(json!({
            "bash": ["ls"],
            "edit": {"mode": "all"},
            "web-fetch": null,
            "playwright": true
        }));
        merge_tools(&mut tools, &extra);
        assert_eq!(tools["bash"], json!(true));
        assert_eq!(tools["edit"], json!({"mode": "all"}));
        assert_eq!(tools["web-fetch"], json!(false));
        assert_eq!(tools["playwright"], json!(true));
    }

    #[test]
    fn test_merge_string_and_array() {
        let mut tools = map(json!({"bash": "ls", "cat": ["cat a"]}));
        merge_tools(&mut tools, &map(json!({"bash": ["pwd", "ls"], "cat": "cat b"})));
        assert_eq!(tools["bash"], json!(["ls", "pwd"]));
        assert_eq!(tools["cat"], json!(["cat a", "cat b"]));
    }

    #[test]
    fn test_merge_scalar_conflict_keeps_first() {
        let mut tools = map(json!({"github": {"mode": "local"}}));
        merge_tools(&mut tools, &map(json!({"github": {"mode": "remote"}})));
        assert_eq!(tools["github"]["mode"], json!("local"));
    }

    #[test]
    fn test_extract_tools_skips_agent_arrays() {
        assert!(extract_tools(&json!({"tools": ["read", "edit"]})).is_empty());
        assert!(extract_tools(&json!({"description": "x"})).is_empty());
        assert!(extract_tools(&json!({"tools": "github"})).is_empty());
    }

    #[test]
    fn test_extract_tools_folds_mcp_servers() {
        let tools = extract_tools(&json!({
            "tools": {"github": null},
            "mcp-servers": {"notion": {"command": "npx", "allowed": ["search"]}}
        }));
        assert_eq!(
            Value::Object(tools),
            json!({"github": null, "notion": {"command": "npx", "allowed": ["search"]}})
        );
    }

    #[test]
    fn test_accumulator_output_is_valid_json() {
        let mut acc = ToolsAccumulator::new();
        assert!(acc.is_empty());
        acc.merge_frontmatter(&json!({"tools": {"bash": ["ls"]}}));
        acc.merge_frontmatter(&json!({"tools": ["agent", "style"]}));
        acc.merge_frontmatter(&json!({"tools": {"bash": ["pwd"]}}));
        assert_eq!(acc.as_map().len(), 1);

        let text = serde_json::to_string(&acc.into_value()).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, json!({"bash": ["ls", "pwd"]}));
    }
}
