//! The request shape handed to the validator.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// An incoming HTTP request, reduced to the parts that get validated.
///
/// Header names may use any case. A body of `None` or JSON `null` counts as
/// absent.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::Request;
/// use serde_json::json;
///
/// let request = Request::new()
///     .with_header("Content-Type", "application/json")
///     .with_param("id", json!("42"))
///     .with_body(json!({"name": "Rex"}));
///
/// assert_eq!(request.header("content-type"), Some("application/json"));
/// assert!(request.has_body());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub body: Option<Value>,
    pub headers: IndexMap<String, String>,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: Value) -> Self {
        self.query.insert(name.into(), value);
        self
    }

    /// Returns true when the request carries a non-null body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|body| !body.is_null())
    }

    /// Looks up a header value, ignoring the case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the headers as a JSON object with lower-cased names.
    ///
    /// When two names differ only in case, the last one wins.
    pub fn lowercased_headers(&self) -> Value {
        Value::Object(
            self.headers
                .iter()
                .map(|(name, value)| (name.to_lowercase(), Value::String(value.clone())))
                .collect(),
        )
    }
}
