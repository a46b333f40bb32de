//! Schema combinators.
//!
//! This module provides [`CombinatorSchema`], the compiled form of
//! `allOf`, `anyOf`, `oneOf` and `not`:
//! - `AllOf`: every branch must match; branch failures are accumulated
//! - `AnyOf`: at least one branch must match (short-circuits on the first)
//! - `OneOf`: exactly one branch must match
//! - `Not`: the branch must not match
//!
//! `anyOf`, `oneOf` and `not` report a single summary failure rather than
//! the failures of each branch.

use serde_json::{json, Map, Value};
use stillwater::Validation;

use crate::error::SchemaError;
use crate::path::JsonPath;
use crate::registry::Document;
use crate::validation::ValidationContext;
use crate::ValidationResult;

use super::compiler::CompileSession;
use super::traits::{absorb, finish, SchemaLike};
use super::{CompileError, SchemaNode};

pub enum CombinatorSchema {
    AllOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    Not(Box<SchemaNode>),
}

impl CombinatorSchema {
    /// Compiles every combinator keyword present on a node.
    pub(crate) fn compile(
        keywords: &Map<String, Value>,
        session: &mut CompileSession<'_>,
        document: &Document,
    ) -> Result<Vec<Self>, CompileError> {
        let mut combinators = Vec::new();

        for keyword in ["allOf", "anyOf", "oneOf"] {
            let Some(branches) = keywords.get(keyword) else {
                continue;
            };
            let branches = branches
                .as_array()
                .filter(|branches| !branches.is_empty())
                .ok_or_else(|| CompileError::invalid_keyword(keyword, "must be a non-empty array"))?;
            let nodes = branches
                .iter()
                .map(|branch| session.node(branch, document))
                .collect::<Result<Vec<_>, _>>()?;

            combinators.push(match keyword {
                "allOf" => CombinatorSchema::AllOf(nodes),
                "anyOf" => CombinatorSchema::AnyOf(nodes),
                _ => CombinatorSchema::OneOf(nodes),
            });
        }

        if let Some(schema) = keywords.get("not") {
            combinators.push(CombinatorSchema::Not(Box::new(session.node(schema, document)?)));
        }

        Ok(combinators)
    }

    fn validate_all_of(
        branches: &[SchemaNode],
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        let mut errors = Vec::new();
        for branch in branches {
            absorb(&mut errors, branch.validate(value, path, context));
        }
        finish(errors)
    }

    fn validate_any_of(
        branches: &[SchemaNode],
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        if branches
            .iter()
            .any(|branch| branch.validate(value, path, context).is_success())
        {
            return Validation::Success(());
        }
        finish(vec![SchemaError::new(
            path.clone(),
            "anyOf",
            "should match some schema in anyOf",
        )])
    }

    fn validate_one_of(
        branches: &[SchemaNode],
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        let passing: Vec<usize> = branches
            .iter()
            .enumerate()
            .filter(|(_, branch)| branch.validate(value, path, context).is_success())
            .map(|(index, _)| index)
            .collect();

        if passing.len() == 1 {
            return Validation::Success(());
        }
        let passing_schemas = if passing.is_empty() {
            Value::Null
        } else {
            json!(passing)
        };
        finish(vec![SchemaError::new(
            path.clone(),
            "oneOf",
            "should match exactly one schema in oneOf",
        )
        .with_param("passingSchemas", passing_schemas)])
    }
}

impl SchemaLike for CombinatorSchema {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        match self {
            CombinatorSchema::AllOf(branches) => Self::validate_all_of(branches, value, path, context),
            CombinatorSchema::AnyOf(branches) => Self::validate_any_of(branches, value, path, context),
            CombinatorSchema::OneOf(branches) => Self::validate_one_of(branches, value, path, context),
            CombinatorSchema::Not(branch) => {
                if branch.validate(value, path, context).is_success() {
                    finish(vec![SchemaError::new(path.clone(), "not", "should NOT be valid")])
                } else {
                    Validation::Success(())
                }
            }
        }
    }
}
