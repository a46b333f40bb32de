//! Object constraints.
//!
//! This module provides [`ObjectSchema`], the compiled form of
//! `properties`, `patternProperties`, `required`, `additionalProperties`,
//! `dependencies`, `minProperties` and `maxProperties`. Property failures
//! from every field are accumulated.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};
use stillwater::Validation;

use crate::error::SchemaError;
use crate::path::JsonPath;
use crate::registry::Document;
use crate::validation::ValidationContext;
use crate::ValidationResult;

use super::compiler::CompileSession;
use super::keywords::usize_keyword;
use super::traits::{absorb, finish, SchemaLike};
use super::{CompileError, SchemaNode};

/// How to handle properties matched by neither `properties` nor
/// `patternProperties`.
enum AdditionalProperties {
    /// Allow unknown properties (default behavior).
    Allow,
    /// Reject unknown properties.
    Deny,
    /// Validate unknown properties against a schema.
    Validate(Box<SchemaNode>),
}

/// A property name pattern and the schema its matches must satisfy.
struct PatternProperty {
    regex: Regex,
    schema: SchemaNode,
}

/// What the presence of a property requires.
enum Dependency {
    /// Other properties that must be present too.
    Properties(Vec<String>),
    /// A schema the whole object must satisfy.
    Schema(Box<SchemaNode>),
}

/// Compiled object keywords of one schema node.
///
/// Properties keep their declaration order, so failures are reported in the
/// order the schema lists the fields.
pub struct ObjectSchema {
    properties: IndexMap<String, SchemaNode>,
    pattern_properties: Vec<PatternProperty>,
    required: Vec<String>,
    additional_properties: AdditionalProperties,
    dependencies: IndexMap<String, Dependency>,
    min_properties: Option<usize>,
    max_properties: Option<usize>,
}

impl ObjectSchema {
    /// Compiles the object keywords of a node; `None` when it has none.
    pub(crate) fn compile(
        keywords: &Map<String, Value>,
        session: &mut CompileSession<'_>,
        document: &Document,
    ) -> Result<Option<Self>, CompileError> {
        let mut properties = IndexMap::new();
        if let Some(declared) = keywords.get("properties") {
            let declared = declared
                .as_object()
                .ok_or_else(|| CompileError::invalid_keyword("properties", "must be an object"))?;
            for (name, schema) in declared {
                properties.insert(name.clone(), session.node(schema, document)?);
            }
        }

        let mut pattern_properties = Vec::new();
        if let Some(declared) = keywords.get("patternProperties") {
            let declared = declared
                .as_object()
                .ok_or_else(|| CompileError::invalid_keyword("patternProperties", "must be an object"))?;
            for (pattern, schema) in declared {
                let regex = Regex::new(pattern).map_err(|source| CompileError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                pattern_properties.push(PatternProperty {
                    regex,
                    schema: session.node(schema, document)?,
                });
            }
        }

        let required = match keywords.get("required") {
            None => Vec::new(),
            Some(names) => string_list("required", names)?,
        };

        let additional_properties = match keywords.get("additionalProperties") {
            None | Some(Value::Bool(true)) => AdditionalProperties::Allow,
            Some(Value::Bool(false)) => AdditionalProperties::Deny,
            Some(schema) => AdditionalProperties::Validate(Box::new(session.node(schema, document)?)),
        };

        let mut dependencies = IndexMap::new();
        if let Some(declared) = keywords.get("dependencies") {
            let declared = declared
                .as_object()
                .ok_or_else(|| CompileError::invalid_keyword("dependencies", "must be an object"))?;
            for (name, dependency) in declared {
                let dependency = match dependency {
                    Value::Array(_) => Dependency::Properties(string_list("dependencies", dependency)?),
                    schema => Dependency::Schema(Box::new(session.node(schema, document)?)),
                };
                dependencies.insert(name.clone(), dependency);
            }
        }

        let min_properties = usize_keyword(keywords, "minProperties")?;
        let max_properties = usize_keyword(keywords, "maxProperties")?;

        let is_empty = properties.is_empty()
            && pattern_properties.is_empty()
            && required.is_empty()
            && matches!(additional_properties, AdditionalProperties::Allow)
            && dependencies.is_empty()
            && min_properties.is_none()
            && max_properties.is_none();
        if is_empty {
            return Ok(None);
        }

        Ok(Some(Self {
            properties,
            pattern_properties,
            required,
            additional_properties,
            dependencies,
            min_properties,
            max_properties,
        }))
    }

    fn validate_dependencies(
        &self,
        obj: &Map<String, Value>,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
        errors: &mut Vec<SchemaError>,
    ) {
        for (name, dependency) in &self.dependencies {
            if !obj.contains_key(name) {
                continue;
            }
            match dependency {
                Dependency::Properties(needed) => {
                    for missing in needed.iter().filter(|needed| !obj.contains_key(*needed)) {
                        errors.push(
                            SchemaError::new(
                                path.clone(),
                                "dependencies",
                                format!(
                                    "should have property {} when property {} is present",
                                    missing, name
                                ),
                            )
                            .with_param("property", json!(name))
                            .with_param("missingProperty", json!(missing))
                            .with_param("deps", json!(needed.join(", "))),
                        );
                    }
                }
                Dependency::Schema(schema) => absorb(errors, schema.validate(value, path, context)),
            }
        }
    }
}

fn string_list(keyword: &str, value: &Value) -> Result<Vec<String>, CompileError> {
    let names = value
        .as_array()
        .ok_or_else(|| CompileError::invalid_keyword(keyword, "must be an array"))?;
    names
        .iter()
        .map(|name| {
            name.as_str()
                .map(str::to_string)
                .ok_or_else(|| CompileError::invalid_keyword(keyword, "entries must be strings"))
        })
        .collect()
}

impl SchemaLike for ObjectSchema {
    fn validate(
        &self,
        value: &Value,
        path: &JsonPath,
        context: &ValidationContext<'_>,
    ) -> ValidationResult<()> {
        let Some(obj) = value.as_object() else {
            return Validation::Success(());
        };

        let mut errors = Vec::new();

        for name in &self.required {
            if !obj.contains_key(name) {
                errors.push(
                    SchemaError::new(
                        path.clone(),
                        "required",
                        format!("should have required property '{}'", name),
                    )
                    .with_param("missingProperty", json!(name)),
                );
            }
        }

        if let Some(min) = self.min_properties.filter(|min| obj.len() < *min) {
            errors.push(
                SchemaError::new(
                    path.clone(),
                    "minProperties",
                    format!("should NOT have fewer than {} properties", min),
                )
                .with_param("limit", json!(min)),
            );
        }
        if let Some(max) = self.max_properties.filter(|max| obj.len() > *max) {
            errors.push(
                SchemaError::new(
                    path.clone(),
                    "maxProperties",
                    format!("should NOT have more than {} properties", max),
                )
                .with_param("limit", json!(max)),
            );
        }

        self.validate_dependencies(obj, value, path, context, &mut errors);

        for (name, schema) in &self.properties {
            if let Some(field_value) = obj.get(name) {
                absorb(&mut errors, schema.validate(field_value, &path.push_field(name), context));
            }
        }

        for (name, field_value) in obj {
            let mut matched = self.properties.contains_key(name);
            for pattern in self.pattern_properties.iter().filter(|p| p.regex.is_match(name)) {
                matched = true;
                absorb(
                    &mut errors,
                    pattern.schema.validate(field_value, &path.push_field(name), context),
                );
            }
            if matched {
                continue;
            }

            match &self.additional_properties {
                AdditionalProperties::Allow => {}
                AdditionalProperties::Deny => errors.push(
                    SchemaError::new(
                        path.clone(),
                        "additionalProperties",
                        "should NOT have additional properties",
                    )
                    .with_param("additionalProperty", json!(name)),
                ),
                AdditionalProperties::Validate(schema) => absorb(
                    &mut errors,
                    schema.validate(field_value, &path.push_field(name), context),
                ),
            }
        }

        finish(errors)
    }
}
