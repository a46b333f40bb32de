//! Integration tests for allOf, anyOf, oneOf and not.

use openapi_request_validator::{CompiledSchema, FormatRegistry, SchemaCompiler, SchemaRegistry};
use serde_json::{json, Value};
use stillwater::Validation;

fn compile(schema: Value) -> CompiledSchema {
    let registry = SchemaRegistry::new();
    let formats = FormatRegistry::new();
    SchemaCompiler::new(&registry, &formats).compile(&schema).unwrap()
}

fn keywords(schema: &CompiledSchema, value: Value) -> Vec<String> {
    match schema.validate(&value) {
        Validation::Success(()) => Vec::new(),
        Validation::Failure(errors) => errors.iter().map(|e| e.keyword.clone()).collect(),
    }
}

#[test]
fn test_all_of_accumulates_branch_errors() {
    let schema = compile(json!({
        "allOf": [
            {"required": ["name"]},
            {"properties": {"age": {"type": "integer"}}}
        ]
    }));

    assert!(schema.is_valid(&json!({"name": "Rex", "age": 3})));
    assert_eq!(keywords(&schema, json!({"age": "old"})), vec!["required", "type"]);
}

#[test]
fn test_any_of_reports_summary() {
    let schema = compile(json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}));

    assert!(schema.is_valid(&json!("x")));
    assert!(schema.is_valid(&json!(1)));

    let Validation::Failure(errors) = schema.validate(&json!(true)) else {
        panic!("expected failure");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().message, "should match some schema in anyOf");
}

#[test]
fn test_one_of_requires_exactly_one() {
    let schema = compile(json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}));

    assert!(schema.is_valid(&json!(-1)));
    assert!(schema.is_valid(&json!(0.5)));

    let Validation::Failure(errors) = schema.validate(&json!(2)) else {
        panic!("expected failure");
    };
    assert_eq!(errors.first().keyword, "oneOf");
    assert_eq!(errors.first().params["passingSchemas"], json!([0, 1]));

    let Validation::Failure(errors) = schema.validate(&json!(-0.5)) else {
        panic!("expected failure");
    };
    assert_eq!(errors.first().params["passingSchemas"], json!(null));
}

#[test]
fn test_not() {
    let schema = compile(json!({"not": {"type": "null"}}));
    assert!(schema.is_valid(&json!(0)));
    assert_eq!(keywords(&schema, json!(null)), vec!["not"]);
}

#[test]
fn test_nullable_enum_shape_validates() {
    let schema = compile(json!({
        "oneOf": [{"type": "null"}, {"type": "string", "enum": ["cat", "dog"]}]
    }));

    assert!(schema.is_valid(&json!(null)));
    assert!(schema.is_valid(&json!("cat")));
    assert!(!schema.is_valid(&json!("cow")));
}

#[test]
fn test_empty_branch_list_fails_compilation() {
    let registry = SchemaRegistry::new();
    let formats = FormatRegistry::new();
    assert!(SchemaCompiler::new(&registry, &formats)
        .compile(&json!({"anyOf": []}))
        .is_err());
}
