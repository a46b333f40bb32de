//! Consumer-facing request validation errors.
//!
//! [`ValidationError`] is the stable shape handed to callers regardless of
//! which engine keyword produced the failure. [`RequestRejection`] pairs the
//! errors with the HTTP status the request should be rejected with.

use std::fmt::{self, Display};

use http::StatusCode;
use serde_json::{json, Map, Value};

/// The part of the request an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Body,
    Path,
    Query,
    Headers,
    FormData,
}

impl Location {
    /// Returns the wire name of this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Path => "path",
            Location::Query => "query",
            Location::Headers => "headers",
            Location::FormData => "formData",
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation error in its public shape.
///
/// `path` is a dot-path into the validated location and never carries an
/// `instance.` or `body.` prefix. `error_code` is absent for `$ref` failures
/// and for body-missing errors; those carry `schema` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: Option<String>,
    pub error_code: Option<String>,
    pub message: String,
    pub location: Location,
    pub schema: Option<Value>,
}

impl ValidationError {
    /// Creates an error with only a message and a location.
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            path: None,
            error_code: None,
            message: message.into(),
            location,
            schema: None,
        }
    }

    /// Sets the path and returns self for chaining.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Sets the schema and returns self for chaining.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Renders this error as JSON using the camel-cased wire field names.
    ///
    /// Absent fields are omitted rather than rendered as `null`.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if let Some(path) = &self.path {
            object.insert("path".to_string(), json!(path));
        }
        if let Some(code) = &self.error_code {
            object.insert("errorCode".to_string(), json!(code));
        }
        object.insert("message".to_string(), json!(self.message));
        object.insert("location".to_string(), json!(self.location.as_str()));
        if let Some(schema) = &self.schema {
            object.insert("schema".to_string(), schema.clone());
        }
        Value::Object(object)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} {}: {}", self.location, path, self.message),
            None => write!(f, "{}: {}", self.location, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// The outcome of a failed request validation.
///
/// `status` is `400 Bad Request` for schema failures and missing bodies, and
/// `415 Unsupported Media Type` when no declared media type matched.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRejection {
    pub status: StatusCode,
    pub errors: Vec<ValidationError>,
}

impl RequestRejection {
    pub fn bad_request(errors: Vec<ValidationError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            errors,
        }
    }

    pub fn unsupported_media_type(error: ValidationError) -> Self {
        Self {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            errors: vec![error],
        }
    }

    /// Renders `{ "status": <u16>, "errors": [...] }`.
    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status.as_u16(),
            "errors": self.errors.iter().map(ValidationError::to_json).collect::<Vec<_>>(),
        })
    }
}

impl Display for RequestRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "request rejected with status {}:", self.status.as_u16())?;
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for RequestRejection {}
