//! Traits for schema polymorphism.
//!
//! This module provides the [`SchemaLike`] trait implemented by every
//! compiled constraint group (string, numeric, object, array, combinators,
//! references) and by the [`SchemaNode`](super::SchemaNode) that holds them.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{SchemaError, SchemaErrors};
use crate::path::JsonPath;
use crate::validation::ValidationContext;
use crate::ValidationResult;

/// A compiled schema fragment that can validate JSON values.
///
/// Implementations accumulate every failure they find instead of stopping at
/// the first one. The `Send + Sync` bounds let compiled schemas be shared
/// across request-handling threads.
pub trait SchemaLike: Send + Sync {
    /// Validates a value located at `path`.
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()>;
}

/// Turns a list of collected failures into a validation result.
pub(crate) fn finish(errors: Vec<SchemaError>) -> ValidationResult<()> {
    match SchemaErrors::try_from_vec(errors) {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(()),
    }
}

/// Appends the failures of `result`, if any, to `errors`.
pub(crate) fn absorb(errors: &mut Vec<SchemaError>, result: ValidationResult<()>) {
    if let Validation::Failure(failures) = result {
        errors.extend(failures);
    }
}
