//! Mapping of raw engine failures to the public error shape.

use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::error::{Location, SchemaError, ValidationError};

/// Post-processes every mapped error; receives the mapped error and the raw
/// failure it came from.
pub type ErrorTransformer = Arc<dyn Fn(ValidationError, &SchemaError) -> ValidationError + Send + Sync>;

const ERROR_CODE_SUFFIX: &str = ".openapi.requestValidation";

/// Converts a raw failure found in `location` into a [`ValidationError`].
///
/// The path is `instance` followed by the failure's data path (and the
/// missing property for `required`), with the `instance.` prefix removed,
/// and `instance.body` plus `body.` for body failures. `$ref` failures carry
/// `schema: {"$ref": ...}` instead of an error code.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::{mapper::to_validation_error, JsonPath, Location, SchemaError};
/// use serde_json::json;
///
/// let raw = SchemaError::new(
///     JsonPath::from_field("body"),
///     "required",
///     "should have required property 'name'",
/// )
/// .with_param("missingProperty", json!("name"));
///
/// let error = to_validation_error(&raw, Location::Body);
/// assert_eq!(error.path.as_deref(), Some("name"));
/// assert_eq!(error.error_code.as_deref(), Some("required.openapi.requestValidation"));
/// ```
pub fn to_validation_error(error: &SchemaError, location: Location) -> ValidationError {
    let mut path = format!("instance{}", error.path);
    if let Some(missing) = error.param_str("missingProperty") {
        path.push('.');
        path.push_str(missing);
    }

    let path = match location {
        Location::Body => strip_body_prefix(&path),
        _ => path.strip_prefix("instance").map(|rest| rest.strip_prefix('.').unwrap_or(rest)),
    }
    .unwrap_or(path.as_str());
    let path = match location {
        Location::Body => path.strip_prefix("body.").unwrap_or(path),
        _ => path,
    };

    let mut mapped = ValidationError::new(location, body_message(&error.message, location));
    if !path.is_empty() {
        mapped = mapped.with_path(path);
    }

    if error.keyword == "$ref" {
        let reference = error.params.get("ref").cloned().unwrap_or_default();
        mapped.with_schema(json!({ "$ref": reference }))
    } else {
        mapped.with_error_code(format!("{}{}", error.keyword, ERROR_CODE_SUFFIX))
    }
}

fn strip_body_prefix(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("instance.body")?;
    Some(rest.strip_prefix('.').unwrap_or(rest))
}

fn body_message(message: &str, location: Location) -> String {
    if location != Location::Body {
        return message.to_string();
    }
    if let Some(rest) = message.strip_prefix("instance.body.") {
        format!("instance.{}", rest)
    } else if let Some(rest) = message.strip_prefix("instance.body ") {
        format!("instance {}", rest)
    } else {
        message.to_string()
    }
}

/// Maps raw failures, applying the configured transformer if any.
#[derive(Clone, Default)]
pub struct ErrorMapper {
    transformer: Option<ErrorTransformer>,
}

impl ErrorMapper {
    pub fn new(transformer: Option<ErrorTransformer>) -> Self {
        Self { transformer }
    }

    pub fn map(&self, error: &SchemaError, location: Location) -> ValidationError {
        let mapped = to_validation_error(error, location);
        match &self.transformer {
            Some(transform) => transform(mapped, error),
            None => mapped,
        }
    }
}

impl fmt::Debug for ErrorMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMapper")
            .field("transformer", &self.transformer.is_some())
            .finish()
    }
}
