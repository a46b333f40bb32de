//! Conversion of OpenAPI parameter lists into per-location JSON Schemas.
//!
//! Each non-body location becomes an object schema whose properties are the
//! parameters declared `in` that location. OpenAPI 3 parameters contribute
//! their `schema`; OpenAPI 2 parameters carry their validation keywords
//! inline, and those are copied out. The OpenAPI 2 upload type
//! `type: file` has no JSON Schema counterpart and is dropped, so a file
//! parameter only contributes its `required` entry.

use serde_json::{json, Map, Value};

/// Parameter keywords that are JSON Schema validation keywords in OpenAPI 2.
const VALIDATION_KEYWORDS: &[&str] = &[
    "type",
    "format",
    "items",
    "enum",
    "default",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "multipleOf",
    "additionalItems",
    "properties",
    "additionalProperties",
    "maxProperties",
    "minProperties",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "nullable",
    "readOnly",
];

/// The schemas derived from one operation's parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchemas {
    /// The `schema` of the first `in: body` parameter.
    pub body: Option<Value>,
    pub form_data: Option<Value>,
    pub headers: Option<Value>,
    pub path: Option<Value>,
    pub query: Option<Value>,
}

/// Converts an OpenAPI parameter list into per-location schemas.
///
/// A location without parameters yields `None`. Entries that are not
/// objects, or lack `in`, are skipped.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::convert_parameters;
/// use serde_json::json;
///
/// let schemas = convert_parameters(&[
///     json!({"name": "id", "in": "path", "required": true, "type": "integer"}),
///     json!({"name": "limit", "in": "query", "schema": {"type": "integer", "maximum": 50}}),
/// ]);
///
/// assert_eq!(
///     schemas.path,
///     Some(json!({"properties": {"id": {"type": "integer"}}, "required": ["id"]}))
/// );
/// assert_eq!(
///     schemas.query,
///     Some(json!({"properties": {"limit": {"type": "integer", "maximum": 50}}}))
/// );
/// assert!(schemas.headers.is_none());
/// ```
pub fn convert_parameters(parameters: &[Value]) -> ParameterSchemas {
    let body = parameters
        .iter()
        .find(|param| location_of(param) == Some("body"))
        .and_then(|param| param.get("schema").cloned());

    ParameterSchemas {
        body,
        form_data: location_schema(parameters, "formData"),
        headers: location_schema(parameters, "header"),
        path: location_schema(parameters, "path"),
        query: location_schema(parameters, "query"),
    }
}

/// Returns true when a `body` or `formData` parameter is required.
pub fn is_body_required(parameters: &[Value]) -> bool {
    parameters.iter().any(|param| {
        matches!(location_of(param), Some("body" | "formData"))
            && param.get("required") == Some(&Value::Bool(true))
    })
}

/// Lower-cases the property names and `required` entries of a header schema.
pub(crate) fn lowercase_header_names(mut schema: Value) -> Value {
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        let lowered: Map<String, Value> = std::mem::take(properties)
            .into_iter()
            .map(|(name, property)| (name.to_lowercase(), property))
            .collect();
        *properties = lowered;
    }
    if let Some(Value::Array(required)) = schema.get_mut("required") {
        for name in required.iter_mut() {
            if let Value::String(name) = name {
                *name = name.to_lowercase();
            }
        }
    }
    schema
}

fn location_of(param: &Value) -> Option<&str> {
    param.get("in").and_then(Value::as_str)
}

fn location_schema(parameters: &[Value], location: &str) -> Option<Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in parameters.iter().filter(|param| location_of(param) == Some(location)) {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        properties.insert(name.to_string(), property_schema(param));
        if param.get("required") == Some(&Value::Bool(true)) {
            required.push(json!(name));
        }
    }

    if properties.is_empty() {
        return None;
    }
    let mut schema = Map::new();
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    Some(Value::Object(schema))
}

fn property_schema(param: &Value) -> Value {
    if let Some(schema) = param.get("schema") {
        return schema.clone();
    }
    let copied: Map<String, Value> = VALIDATION_KEYWORDS
        .iter()
        .filter_map(|keyword| param.get(*keyword).map(|value| (*keyword, value)))
        .filter(|(keyword, value)| !(*keyword == "type" && value.as_str() == Some("file")))
        .map(|(keyword, value)| (keyword.to_string(), value.clone()))
        .collect();
    Value::Object(copied)
}
