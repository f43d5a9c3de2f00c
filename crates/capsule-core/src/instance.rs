//! The capsule instance tree.
//!
//! A tree is authored externally and is read-only to the pipeline. Generators
//! walk it by reference; nothing in this crate mutates an instance once built.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One placement of a capsule in a project's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleInstance {
    /// Unique id of this placement.
    pub id: String,
    /// Id of the capsule this instance places (e.g. `button`).
    pub capsule_id: String,
    /// Configured property values, in authoring order.
    #[serde(default)]
    pub props: IndexMap<String, Value>,
    /// Ordered child instances.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CapsuleInstance>,
}

impl CapsuleInstance {
    /// Create an instance with no props and no children.
    pub fn new(id: impl Into<String>, capsule_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capsule_id: capsule_id.into(),
            props: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Set a property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Append a child instance.
    pub fn with_child(mut self, child: CapsuleInstance) -> Self {
        self.children.push(child);
        self
    }

    /// Get a raw property value.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Get a property as a string. Numbers and booleans are stringified.
    pub fn prop_str(&self, key: &str) -> Option<String> {
        match self.props.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Get a property as a string, or a fallback.
    pub fn prop_str_or(&self, key: &str, fallback: &str) -> String {
        self.prop_str(key).unwrap_or_else(|| fallback.to_string())
    }

    /// Get a property as a finite number. Numeric strings are parsed;
    /// `"NaN"` and `"inf"` are rejected.
    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        let value = match self.props.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// Get a property as a boolean.
    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        match self.props.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get a property as a list of strings (non-string items are skipped).
    pub fn prop_list(&self, key: &str) -> Vec<String> {
        match self.props.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get a property as a list of numbers (non-numeric items are skipped).
    pub fn prop_numbers(&self, key: &str) -> Vec<f64> {
        match self.props.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_f64).collect(),
            _ => Vec::new(),
        }
    }

    /// Visit every instance depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CapsuleInstance)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CapsuleInstance {
        CapsuleInstance::new("root", "stack")
            .with_child(CapsuleInstance::new("title", "text").with_prop("text", "Hello"))
            .with_child(
                CapsuleInstance::new("card", "card")
                    .with_child(CapsuleInstance::new("ok", "button").with_prop("label", "OK")),
            )
    }

    #[test]
    fn test_walk_order() {
        let tree = sample();
        let mut ids = Vec::new();
        tree.walk(&mut |i| ids.push(i.id.as_str()));
        assert_eq!(ids, vec!["root", "title", "card", "ok"]);
    }

    #[test]
    fn test_prop_accessors() {
        let inst = CapsuleInstance::new("p", "progress")
            .with_prop("value", 0.5)
            .with_prop("label", 42)
            .with_prop("enabled", "true")
            .with_prop("items", json!(["a", 1, null]));

        assert_eq!(inst.prop_f64("value"), Some(0.5));
        assert_eq!(inst.prop_str("label").as_deref(), Some("42"));
        assert_eq!(inst.prop_bool("enabled"), Some(true));
        assert_eq!(inst.prop_list("items"), vec!["a".to_string(), "1".to_string()]);
        assert_eq!(inst.prop_str_or("missing", "x"), "x");
    }

    #[test]
    fn test_prop_f64_rejects_non_finite() {
        let inst = CapsuleInstance::new("s", "spacer")
            .with_prop("a", "NaN")
            .with_prop("b", "inf")
            .with_prop("c", "-infinity")
            .with_prop("d", " 12.5 ");
        assert_eq!(inst.prop_f64("a"), None);
        assert_eq!(inst.prop_f64("b"), None);
        assert_eq!(inst.prop_f64("c"), None);
        assert_eq!(inst.prop_f64("d"), Some(12.5));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let inst: CapsuleInstance = serde_json::from_value(json!({
            "id": "b1",
            "capsuleId": "button",
            "props": {"label": "Go"}
        }))
        .unwrap();
        assert_eq!(inst.capsule_id, "button");
        assert!(inst.children.is_empty());
        assert_eq!(inst.prop_str("label").as_deref(), Some("Go"));
    }
}
