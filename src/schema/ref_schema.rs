//! Schema reference type.
//!
//! This module provides [`RefSchema`], the compiled form of `$ref`. The
//! target is compiled once into the schema's reference table; validation
//! looks it up there and tracks the reference depth so recursive schemas
//! terminate.

use serde_json::{json, Value};
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;
use crate::validation::ValidationContext;
use crate::ValidationResult;

use super::traits::SchemaLike;

/// A compiled `$ref`.
///
/// `key` is the canonical key of the target in the reference table;
/// `reference` is the string as written in the schema and is what failures
/// report.
pub struct RefSchema {
    key: String,
    reference: String,
}

impl RefSchema {
    pub(crate) fn new(key: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reference: reference.into(),
        }
    }

    /// Returns the reference as written in the schema.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    fn failure(&self, path: &JsonPath, message: String) -> ValidationResult<()> {
        Validation::Failure(SchemaErrors::single(
            SchemaError::new(path.clone(), "$ref", message).with_param("ref", json!(self.reference)),
        ))
    }
}

impl SchemaLike for RefSchema {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        // Check depth before resolving to prevent infinite loops
        if context.depth() >= context.max_depth() {
            return self.failure(
                path,
                format!(
                    "maximum reference depth {} exceeded resolving {}",
                    context.max_depth(),
                    self.reference
                ),
            );
        }

        match context.reference(&self.key) {
            Some(schema) => schema.validate(value, path, &context.increment_depth()),
            None => self.failure(path, format!("can't resolve reference {}", self.reference)),
        }
    }
}
