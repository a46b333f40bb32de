//! Raw schema validation failures.
//!
//! This module provides [`SchemaError`] for single engine failures and
//! [`SchemaErrors`] for accumulating multiple failures.

use std::fmt::{self, Display};

use serde_json::{Map, Value};
use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single failure reported by the schema engine.
///
/// `SchemaError` keeps the raw shape a JSON Schema validator reports:
/// - **path**: where in the validated value the failure occurred
/// - **keyword**: the schema keyword that failed (`required`, `type`, ...)
/// - **message**: human-readable description
/// - **params**: keyword-specific details (`missingProperty`, `ref`, ...)
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::{JsonPath, SchemaError};
/// use serde_json::json;
///
/// let error = SchemaError::new(
///     JsonPath::root().push_field("body"),
///     "required",
///     "should have required property 'name'",
/// )
/// .with_param("missingProperty", json!("name"));
///
/// assert_eq!(error.keyword, "required");
/// assert_eq!(error.param_str("missingProperty"), Some("name"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    /// The path to the value that failed validation.
    pub path: JsonPath,
    /// The schema keyword that produced the failure.
    pub keyword: String,
    /// Human-readable error message.
    pub message: String,
    /// Keyword-specific parameters.
    pub params: Map<String, Value>,
}

impl SchemaError {
    /// Creates a new schema error with no params.
    pub fn new(path: JsonPath, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            keyword: keyword.into(),
            message: message.into(),
            params: Map::new(),
        }
    }

    /// Adds a keyword parameter and returns self for chaining.
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Returns a string parameter, if present.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for SchemaError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<SchemaError>();
    assert_sync::<SchemaError>();
};

/// A non-empty collection of schema failures.
///
/// `SchemaErrors` wraps a `NonEmptyVec<SchemaError>` so a
/// `Validation<T, SchemaErrors>` failure always carries at least one error.
/// It implements `Semigroup`, so failures from sibling keywords combine.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaErrors(NonEmptyVec<SchemaError>);

impl SchemaErrors {
    /// Creates a `SchemaErrors` containing a single error.
    pub fn single(error: SchemaError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `SchemaErrors` from a vec, or `None` when it is empty.
    pub fn try_from_vec(errors: Vec<SchemaError>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let head = Self::single(errors.next()?);
        Some(errors.fold(head, |acc, error| acc.combine(Self::single(error))))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaError> {
        self.0.iter()
    }

    /// Returns all errors produced by the given keyword.
    pub fn with_keyword(&self, keyword: &str) -> Vec<&SchemaError> {
        self.0.iter().filter(|e| e.keyword == keyword).collect()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &SchemaError {
        self.0.head()
    }

    /// Converts this collection into a `Vec<SchemaError>`.
    pub fn into_vec(self) -> Vec<SchemaError> {
        self.0.into_vec()
    }
}

impl Semigroup for SchemaErrors {
    fn combine(self, other: Self) -> Self {
        SchemaErrors(self.0.combine(other.0))
    }
}

impl Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

impl IntoIterator for SchemaErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}
