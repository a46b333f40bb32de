//! The JSON Schema engine.
//!
//! Schemas are compiled once ([`SchemaCompiler`]) into a [`CompiledSchema`]
//! that validates any number of values, from any number of threads,
//! accumulating every failure instead of stopping at the first one.
//!
//! The dialect is draft-04 as used by OpenAPI 2/3 after `nullable` has been
//! normalized away. `readOnly: true` is enforced as a constraint: a request
//! must not carry a non-null value for a read-only property.
//!
//! # Example
//!
//! ```rust
//! use openapi_request_validator::{FormatRegistry, SchemaCompiler, SchemaRegistry};
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::new();
//! let formats = FormatRegistry::new();
//! let schema = SchemaCompiler::new(&registry, &formats)
//!     .compile(&json!({"type": "string", "minLength": 1, "maxLength": 100}))
//!     .unwrap();
//!
//! assert!(schema.validate(&json!("hello")).is_success());
//! assert!(schema.validate(&json!("")).is_failure());
//! ```

mod array;
mod combinators;
mod compiler;
mod format;
mod keywords;
mod numeric;
mod object;
mod ref_schema;
mod string;
mod traits;

use serde_json::{json, Value};
use stillwater::Validation;

use crate::error::SchemaError;
use crate::path::JsonPath;
use crate::validation::{RefTable, ValidationContext};
use crate::ValidationResult;

pub use array::ArraySchema;
pub use combinators::CombinatorSchema;
pub use compiler::{SchemaCompiler, DEFAULT_MAX_DEPTH};
pub use format::{FormatFn, FormatRegistry};
pub use keywords::JsonType;
pub use numeric::NumericSchema;
pub use object::ObjectSchema;
pub use ref_schema::RefSchema;
pub use string::StringSchema;
pub use traits::SchemaLike;

use keywords::values_equal;
use traits::{absorb, finish};

/// Errors raised while compiling a schema.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A `$ref` could not be found in the registry or the document.
    #[error("can't resolve reference {0}")]
    UnresolvedReference(String),

    /// A `pattern` is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A keyword has a value of the wrong shape.
    #[error("invalid '{keyword}' keyword: {reason}")]
    InvalidKeyword { keyword: String, reason: String },
}

impl CompileError {
    pub(crate) fn invalid_keyword(keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::InvalidKeyword {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }
}

/// One compiled schema object.
///
/// Type-specific constraint groups only apply to values of their type, so a
/// node may carry string, numeric, object and array constraints at once.
#[derive(Default)]
pub struct SchemaNode {
    reference: Option<RefSchema>,
    types: Option<Vec<JsonType>>,
    enum_values: Option<Vec<Value>>,
    read_only: bool,
    string: Option<StringSchema>,
    numeric: Option<NumericSchema>,
    object: Option<ObjectSchema>,
    array: Option<ArraySchema>,
    combinators: Vec<CombinatorSchema>,
}

impl SchemaNode {
    fn from_reference(reference: RefSchema) -> Self {
        Self {
            reference: Some(reference),
            ..Self::default()
        }
    }

    fn check_type(&self, value: &Value, path: &JsonPath) -> Option<SchemaError> {
        let types = self.types.as_ref()?;
        if types.iter().any(|t| t.matches(value)) {
            return None;
        }
        let expected = types.iter().map(JsonType::as_str).collect::<Vec<_>>().join(",");
        Some(
            SchemaError::new(path.clone(), "type", format!("should be {}", expected))
                .with_param("type", json!(expected)),
        )
    }

    fn check_enum(&self, value: &Value, path: &JsonPath) -> Option<SchemaError> {
        let allowed = self.enum_values.as_ref()?;
        if allowed.iter().any(|candidate| values_equal(candidate, value)) {
            return None;
        }
        Some(
            SchemaError::new(path.clone(), "enum", "should be equal to one of the allowed values")
                .with_param("allowedValues", json!(allowed)),
        )
    }

    fn check_read_only(&self, value: &Value, path: &JsonPath) -> Option<SchemaError> {
        if !self.read_only || value.is_null() {
            return None;
        }
        Some(
            SchemaError::new(path.clone(), "readOnly", "is read-only")
                .with_param("readOnly", json!(path.last_field().unwrap_or_default())),
        )
    }
}

impl SchemaLike for SchemaNode {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        if let Some(reference) = &self.reference {
            return reference.validate(value, path, context);
        }

        let mut errors: Vec<SchemaError> = [
            self.check_type(value, path),
            self.check_enum(value, path),
            self.check_read_only(value, path),
        ]
        .into_iter()
        .flatten()
        .collect();

        if let Some(string) = &self.string {
            absorb(&mut errors, string.validate(value, path, context));
        }
        if let Some(numeric) = &self.numeric {
            absorb(&mut errors, numeric.validate(value, path, context));
        }
        if let Some(object) = &self.object {
            absorb(&mut errors, object.validate(value, path, context));
        }
        if let Some(array) = &self.array {
            absorb(&mut errors, array.validate(value, path, context));
        }
        for combinator in &self.combinators {
            absorb(&mut errors, combinator.validate(value, path, context));
        }

        finish(errors)
    }
}

/// A compiled, immutable validator for one schema document.
///
/// `CompiledSchema` is `Send + Sync`; validation borrows it immutably and
/// keeps all per-call state on the stack.
pub struct CompiledSchema {
    root: SchemaNode,
    refs: RefTable,
    max_depth: usize,
}

impl CompiledSchema {
    /// Validates a value, returning every failure found.
    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let context = ValidationContext::new(&self.refs, self.max_depth);
        self.root.validate(value, &JsonPath::root(), &context)
    }

    /// Returns true when `value` passes validation.
    pub fn is_valid(&self, value: &Value) -> bool {
        matches!(self.validate(value), Validation::Success(()))
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<CompiledSchema>();
    assert_sync::<CompiledSchema>();
};
