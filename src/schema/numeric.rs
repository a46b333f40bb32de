//! Numeric constraints.
//!
//! This module provides [`NumericSchema`], the compiled form of `minimum`,
//! `maximum`, `exclusiveMinimum`, `exclusiveMaximum` and `multipleOf`.
//! Both the draft-04 boolean form of the exclusive keywords and the later
//! numeric form are accepted. A numeric exclusive keyword is a bound of its
//! own and is checked alongside `minimum`/`maximum`.

use serde_json::{json, Map, Value};
use stillwater::Validation;

use crate::error::SchemaError;
use crate::path::JsonPath;
use crate::validation::ValidationContext;
use crate::ValidationResult;

use super::keywords::{flag_keyword, number_keyword};
use super::traits::{finish, SchemaLike};
use super::CompileError;

/// One side of a numeric range.
#[derive(Debug, Clone)]
struct Bound {
    keyword: &'static str,
    limit: f64,
    raw: Value,
    exclusive: bool,
}

/// Compiled numeric keywords of one schema node.
#[derive(Debug, Clone, Default)]
pub struct NumericSchema {
    lower: Vec<Bound>,
    upper: Vec<Bound>,
    multiple_of: Option<(f64, Value)>,
}

impl NumericSchema {
    /// Compiles the numeric keywords of a node; `None` when it has none.
    pub(crate) fn compile(keywords: &Map<String, Value>) -> Result<Option<Self>, CompileError> {
        let lower = bounds(keywords, "minimum", "exclusiveMinimum")?;
        let upper = bounds(keywords, "maximum", "exclusiveMaximum")?;
        let multiple_of = match number_keyword(keywords, "multipleOf")? {
            Some((n, _)) if n <= 0.0 => {
                return Err(CompileError::invalid_keyword("multipleOf", "must be greater than 0"))
            }
            other => other,
        };

        if lower.is_empty() && upper.is_empty() && multiple_of.is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            lower,
            upper,
            multiple_of,
        }))
    }

    fn check_lower(bound: &Bound, n: f64, path: &JsonPath) -> Option<SchemaError> {
        let violated = if bound.exclusive { n <= bound.limit } else { n < bound.limit };
        let comparison = if bound.exclusive { ">" } else { ">=" };
        violated.then(|| bound_error(bound, comparison, path))
    }

    fn check_upper(bound: &Bound, n: f64, path: &JsonPath) -> Option<SchemaError> {
        let violated = if bound.exclusive { n >= bound.limit } else { n > bound.limit };
        let comparison = if bound.exclusive { "<" } else { "<=" };
        violated.then(|| bound_error(bound, comparison, path))
    }
}

/// Reads the bounds set by `limit_name` and its exclusive companion keyword.
///
/// A boolean `exclusive_name` modifies `limit_name`; a numeric one is an
/// additional exclusive bound.
fn bounds(
    keywords: &Map<String, Value>,
    limit_name: &'static str,
    exclusive_name: &'static str,
) -> Result<Vec<Bound>, CompileError> {
    let mut bounds = Vec::new();
    if let Some((limit, raw)) = number_keyword(keywords, limit_name)? {
        bounds.push(Bound {
            keyword: limit_name,
            limit,
            raw,
            exclusive: flag_keyword(keywords, exclusive_name),
        });
    }

    if let Some(raw) = keywords.get(exclusive_name).filter(|v| v.is_number()) {
        let limit = raw
            .as_f64()
            .ok_or_else(|| CompileError::invalid_keyword(exclusive_name, "must be a number"))?;
        bounds.push(Bound {
            keyword: exclusive_name,
            limit,
            raw: raw.clone(),
            exclusive: true,
        });
    }
    Ok(bounds)
}

fn bound_error(bound: &Bound, comparison: &str, path: &JsonPath) -> SchemaError {
    SchemaError::new(
        path.clone(),
        bound.keyword,
        format!("should be {} {}", comparison, bound.raw),
    )
    .with_param("comparison", json!(comparison))
    .with_param("limit", bound.raw.clone())
    .with_param("exclusive", json!(bound.exclusive))
}

impl SchemaLike for NumericSchema {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        _context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        let Some(n) = value.as_f64() else {
            return Validation::Success(());
        };

        let mut errors: Vec<SchemaError> = self
            .lower
            .iter()
            .filter_map(|b| Self::check_lower(b, n, path))
            .chain(self.upper.iter().filter_map(|b| Self::check_upper(b, n, path)))
            .collect();
        if let Some((divisor, raw)) = &self.multiple_of {
            let quotient = n / divisor;
            if (quotient - quotient.round()).abs() > 1e-9 {
                errors.push(
                    SchemaError::new(path.clone(), "multipleOf", format!("should be multiple of {}", raw))
                        .with_param("multipleOf", raw.clone()),
                );
            }
        }
        finish(errors)
    }
}
