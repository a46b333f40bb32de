//! Array constraints.
//!
//! This module provides [`ArraySchema`], the compiled form of `items` (a
//! single schema, or a list of positional schemas with `additionalItems`
//! for the rest), `minItems`, `maxItems` and `uniqueItems`.

use serde_json::{json, Map, Value};
use stillwater::Validation;

use crate::error::SchemaError;
use crate::path::JsonPath;
use crate::registry::Document;
use crate::validation::ValidationContext;
use crate::ValidationResult;

use super::compiler::CompileSession;
use super::keywords::{flag_keyword, usize_keyword, values_equal};
use super::traits::{absorb, finish, SchemaLike};
use super::{CompileError, SchemaNode};

/// The compiled `items` keyword.
enum Items {
    /// Every item must satisfy the schema.
    Each(Box<SchemaNode>),
    /// Item `i` must satisfy schema `i`; items past the list are governed by
    /// `additionalItems`.
    Positional {
        schemas: Vec<SchemaNode>,
        additional: AdditionalItems,
    },
}

enum AdditionalItems {
    Allow,
    Deny,
    Validate(Box<SchemaNode>),
}

/// Compiled array keywords of one schema node.
///
/// Every item is validated, and failures carry the item index in their path.
pub struct ArraySchema {
    items: Option<Items>,
    min_items: Option<usize>,
    max_items: Option<usize>,
    unique_items: bool,
}

impl ArraySchema {
    /// Compiles the array keywords of a node; `None` when it has none.
    pub(crate) fn compile(
        keywords: &Map<String, Value>,
        session: &mut CompileSession<'_>,
        document: &Document,
    ) -> Result<Option<Self>, CompileError> {
        let items = match keywords.get("items") {
            None => None,
            Some(Value::Array(positional)) => {
                let schemas = positional
                    .iter()
                    .map(|schema| session.node(schema, document))
                    .collect::<Result<Vec<_>, _>>()?;
                let additional = match keywords.get("additionalItems") {
                    None | Some(Value::Bool(true)) => AdditionalItems::Allow,
                    Some(Value::Bool(false)) => AdditionalItems::Deny,
                    Some(schema) => AdditionalItems::Validate(Box::new(session.node(schema, document)?)),
                };
                Some(Items::Positional { schemas, additional })
            }
            Some(schema) => Some(Items::Each(Box::new(session.node(schema, document)?))),
        };
        let min_items = usize_keyword(keywords, "minItems")?;
        let max_items = usize_keyword(keywords, "maxItems")?;
        let unique_items = flag_keyword(keywords, "uniqueItems");

        if items.is_none() && min_items.is_none() && max_items.is_none() && !unique_items {
            return Ok(None);
        }
        Ok(Some(Self {
            items,
            min_items,
            max_items,
            unique_items,
        }))
    }
}

/// Finds the first pair of equal items, as `(earlier, later)` indices.
fn first_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    (1..items.len()).find_map(|later| {
        (0..later)
            .find(|earlier| values_equal(&items[*earlier], &items[later]))
            .map(|earlier| (earlier, later))
    })
}

impl SchemaLike for ArraySchema {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        let Some(items) = value.as_array() else {
            return Validation::Success(());
        };

        let mut errors = Vec::new();

        if let Some(min) = self.min_items.filter(|min| items.len() < *min) {
            errors.push(
                SchemaError::new(path.clone(), "minItems", format!("should NOT have fewer than {} items", min))
                    .with_param("limit", json!(min)),
            );
        }
        if let Some(max) = self.max_items.filter(|max| items.len() > *max) {
            errors.push(
                SchemaError::new(path.clone(), "maxItems", format!("should NOT have more than {} items", max))
                    .with_param("limit", json!(max)),
            );
        }
        if self.unique_items {
            if let Some((earlier, later)) = first_duplicate(items) {
                errors.push(
                    SchemaError::new(
                        path.clone(),
                        "uniqueItems",
                        format!(
                            "should NOT have duplicate items (items ## {} and {} are identical)",
                            earlier, later
                        ),
                    )
                    .with_param("i", json!(later))
                    .with_param("j", json!(earlier)),
                );
            }
        }

        match &self.items {
            None => {}
            Some(Items::Each(schema)) => {
                for (index, item) in items.iter().enumerate() {
                    absorb(&mut errors, schema.validate(item, &path.push_index(index), context));
                }
            }
            Some(Items::Positional { schemas, additional }) => {
                for (index, (item, schema)) in items.iter().zip(schemas).enumerate() {
                    absorb(&mut errors, schema.validate(item, &path.push_index(index), context));
                }
                let rest = items.iter().enumerate().skip(schemas.len());
                match additional {
                    AdditionalItems::Allow => {}
                    AdditionalItems::Deny if items.len() > schemas.len() => errors.push(
                        SchemaError::new(
                            path.clone(),
                            "additionalItems",
                            format!("should NOT have more than {} items", schemas.len()),
                        )
                        .with_param("limit", json!(schemas.len())),
                    ),
                    AdditionalItems::Deny => {}
                    AdditionalItems::Validate(schema) => {
                        for (index, item) in rest {
                            absorb(&mut errors, schema.validate(item, &path.push_index(index), context));
                        }
                    }
                }
            }
        }

        finish(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_duplicate() {
        assert_eq!(first_duplicate(&[json!(1), json!(2), json!(3)]), None);
        assert_eq!(first_duplicate(&[json!(1), json!(2), json!(1.0)]), Some((0, 2)));
        assert_eq!(
            first_duplicate(&[json!({"a": 1}), json!("x"), json!("x"), json!({"a": 1})]),
            Some((1, 2))
        );
    }
}
