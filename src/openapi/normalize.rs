//! OpenAPI 3 `nullable` normalization.

use serde_json::{json, Value};

/// Rewrites OpenAPI 3 `nullable: true` markers into draft-04 unions.
///
/// A node with `type` and `nullable: true` becomes either
/// `oneOf: [{type: "null"}, {type, enum}]` when it also has an `enum`, or a
/// `type` array with `"null"` added. Every nested object and array is
/// visited. Normalizing an already normalized schema is a no-op.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::openapi::normalize_openapi_v3;
/// use serde_json::json;
///
/// let schema = json!({"properties": {"name": {"type": "string", "nullable": true}}});
/// assert_eq!(
///     normalize_openapi_v3(&schema),
///     json!({"properties": {"name": {"type": ["string", "null"]}}})
/// );
/// ```
pub fn normalize_openapi_v3(schema: &Value) -> Value {
    let mut normalized = schema.clone();
    normalize_in_place(&mut normalized);
    normalized
}

fn normalize_in_place(value: &mut Value) {
    match value {
        Value::Object(keywords) => {
            let nullable = keywords.get("nullable") == Some(&Value::Bool(true));
            let has_type = keywords.get("type").is_some_and(|t| !t.is_null());
            if nullable && has_type {
                keywords.remove("nullable");
                match (keywords.remove("type"), keywords.remove("enum")) {
                    (Some(ty), Some(allowed)) => {
                        keywords.insert(
                            "oneOf".to_string(),
                            json!([{"type": "null"}, {"type": ty, "enum": allowed}]),
                        );
                    }
                    (Some(ty), None) => {
                        keywords.insert("type".to_string(), with_null(ty));
                    }
                    (None, _) => {}
                }
            }

            for nested in keywords.values_mut() {
                normalize_in_place(nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_in_place),
        _ => {}
    }
}

fn with_null(ty: Value) -> Value {
    match ty {
        Value::Array(mut types) => {
            if !types.iter().any(|t| t == "null") {
                types.push(json!("null"));
            }
            Value::Array(types)
        }
        single => json!([single, "null"]),
    }
}
