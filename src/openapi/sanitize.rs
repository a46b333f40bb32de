//! Read-only elision from `required`.

use serde_json::Value;

/// Removes read-only property names from a schema node's `required` list.
///
/// Only the node itself is inspected; nested schemas are left alone. A node
/// without both `properties` and `required` is returned unchanged, and only
/// names whose property schema declares `readOnly: true` are removed.
pub fn sanitize_read_only(mut node: Value) -> Value {
    let Some(keywords) = node.as_object_mut() else {
        return node;
    };

    let read_only: Vec<String> = match keywords.get("properties").and_then(Value::as_object) {
        Some(properties) => properties
            .iter()
            .filter(|(_, schema)| schema.get("readOnly") == Some(&Value::Bool(true)))
            .map(|(name, _)| name.clone())
            .collect(),
        None => return node,
    };
    if read_only.is_empty() {
        return node;
    }

    if let Some(Value::Array(required)) = keywords.get_mut("required") {
        required.retain(|name| {
            name.as_str()
                .map_or(true, |name| !read_only.iter().any(|read_only| read_only == name))
        });
    }
    node
}
