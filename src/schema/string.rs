//! String constraints.
//!
//! This module provides [`StringSchema`], the compiled form of the
//! `minLength`, `maxLength`, `pattern` and `format` keywords. The
//! constraints only apply to string values; other values pass untouched.

use regex::Regex;
use serde_json::{json, Map, Value};
use stillwater::Validation;

use crate::error::SchemaError;
use crate::path::JsonPath;
use crate::validation::ValidationContext;
use crate::ValidationResult;

use super::format::{Format, FormatRegistry};
use super::keywords::usize_keyword;
use super::traits::{finish, SchemaLike};
use super::CompileError;

/// A constraint applied to string values.
#[derive(Clone)]
enum StringConstraint {
    MinLength(usize),
    MaxLength(usize),
    Pattern { regex: Regex, source: String },
    Format { name: String, format: Format },
}

/// Compiled string keywords of one schema node.
///
/// Lengths count Unicode scalar values, not bytes. All violated constraints
/// are reported.
#[derive(Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
}

impl StringSchema {
    /// Compiles the string keywords of a node; `None` when it has none.
    pub(crate) fn compile(
        keywords: &Map<String, Value>,
        formats: &FormatRegistry,
    ) -> Result<Option<Self>, CompileError> {
        let mut constraints = Vec::new();

        if let Some(min) = usize_keyword(keywords, "minLength")? {
            constraints.push(StringConstraint::MinLength(min));
        }
        if let Some(max) = usize_keyword(keywords, "maxLength")? {
            constraints.push(StringConstraint::MaxLength(max));
        }
        if let Some(pattern) = keywords.get("pattern") {
            let source = pattern
                .as_str()
                .ok_or_else(|| CompileError::invalid_keyword("pattern", "must be a string"))?;
            let regex = Regex::new(source).map_err(|err| CompileError::InvalidPattern {
                pattern: source.to_string(),
                source: err,
            })?;
            constraints.push(StringConstraint::Pattern {
                regex,
                source: source.to_string(),
            });
        }
        if let Some(name) = keywords.get("format").and_then(Value::as_str) {
            if let Some(format) = formats.lookup(name) {
                constraints.push(StringConstraint::Format {
                    name: name.to_string(),
                    format,
                });
            }
        }

        Ok(if constraints.is_empty() {
            None
        } else {
            Some(Self { constraints })
        })
    }
}

impl SchemaLike for StringSchema {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        _context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        let Some(s) = value.as_str() else {
            return Validation::Success(());
        };

        let errors = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();
        finish(errors)
    }
}

/// Checks a single constraint and returns an error if it fails.
fn check_constraint(constraint: &StringConstraint, value: &str, path: &JsonPath) -> Option<SchemaError> {
    match constraint {
        StringConstraint::MinLength(min) => (value.chars().count() < *min).then(|| {
            SchemaError::new(
                path.clone(),
                "minLength",
                format!("should NOT be shorter than {} characters", min),
            )
            .with_param("limit", json!(min))
        }),
        StringConstraint::MaxLength(max) => (value.chars().count() > *max).then(|| {
            SchemaError::new(
                path.clone(),
                "maxLength",
                format!("should NOT be longer than {} characters", max),
            )
            .with_param("limit", json!(max))
        }),
        StringConstraint::Pattern { regex, source } => (!regex.is_match(value)).then(|| {
            SchemaError::new(path.clone(), "pattern", format!("should match pattern \"{}\"", source))
                .with_param("pattern", json!(source))
        }),
        StringConstraint::Format { name, format } => (!format.check(value)).then(|| {
            SchemaError::new(path.clone(), "format", format!("should match format \"{}\"", name))
                .with_param("format", json!(name))
        }),
    }
}
