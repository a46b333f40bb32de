//! Integration tests for numeric keywords.

use openapi_request_validator::{CompiledSchema, FormatRegistry, SchemaCompiler, SchemaRegistry};
use serde_json::{json, Value};
use stillwater::Validation;

fn compile(schema: Value) -> CompiledSchema {
    let registry = SchemaRegistry::new();
    let formats = FormatRegistry::new();
    SchemaCompiler::new(&registry, &formats).compile(&schema).unwrap()
}

fn messages(schema: &CompiledSchema, value: Value) -> Vec<String> {
    match schema.validate(&value) {
        Validation::Success(()) => Vec::new(),
        Validation::Failure(errors) => errors.iter().map(|e| e.message.clone()).collect(),
    }
}

#[test]
fn test_integer_type() {
    let schema = compile(json!({"type": "integer"}));

    assert!(schema.is_valid(&json!(42)));
    assert!(schema.is_valid(&json!(-7)));
    assert!(schema.is_valid(&json!(3.0)));
    assert_eq!(messages(&schema, json!(3.5)), vec!["should be integer"]);
    assert_eq!(messages(&schema, json!("3")), vec!["should be integer"]);
}

#[test]
fn test_number_accepts_integers_and_floats() {
    let schema = compile(json!({"type": "number"}));
    assert!(schema.is_valid(&json!(1)));
    assert!(schema.is_valid(&json!(1.5)));
    assert!(!schema.is_valid(&json!(true)));
}

#[test]
fn test_inclusive_bounds() {
    let schema = compile(json!({"minimum": 1, "maximum": 10}));

    assert!(schema.is_valid(&json!(1)));
    assert!(schema.is_valid(&json!(10)));
    assert_eq!(messages(&schema, json!(0)), vec!["should be >= 1"]);
    assert_eq!(messages(&schema, json!(11)), vec!["should be <= 10"]);
}

#[test]
fn test_boolean_exclusive_bounds() {
    let schema = compile(json!({
        "minimum": 0,
        "exclusiveMinimum": true,
        "maximum": 1,
        "exclusiveMaximum": true
    }));

    assert!(schema.is_valid(&json!(0.5)));
    assert_eq!(messages(&schema, json!(0)), vec!["should be > 0"]);
    assert_eq!(messages(&schema, json!(1)), vec!["should be < 1"]);
}

#[test]
fn test_numeric_exclusive_and_inclusive_bounds_both_apply() {
    let schema = compile(json!({"type": "number", "minimum": 5, "exclusiveMinimum": 3}));

    assert!(schema.is_valid(&json!(5)));
    assert_eq!(messages(&schema, json!(4)), vec!["should be >= 5"]);

    let schema = compile(json!({"maximum": 10, "exclusiveMaximum": 8}));
    assert!(schema.is_valid(&json!(7)));
    assert_eq!(messages(&schema, json!(9)), vec!["should be < 8"]);
}

#[test]
fn test_bound_params() {
    let schema = compile(json!({"maximum": 5}));
    let Validation::Failure(errors) = schema.validate(&json!(6)) else {
        panic!("expected failure");
    };
    let error = errors.first();
    assert_eq!(error.keyword, "maximum");
    assert_eq!(error.params["comparison"], json!("<="));
    assert_eq!(error.params["limit"], json!(5));
    assert_eq!(error.params["exclusive"], json!(false));
}

#[test]
fn test_multiple_of() {
    let schema = compile(json!({"multipleOf": 0.5}));
    assert!(schema.is_valid(&json!(2.5)));
    assert_eq!(messages(&schema, json!(2.3)), vec!["should be multiple of 0.5"]);
}

#[test]
fn test_non_positive_multiple_of_fails_compilation() {
    let registry = SchemaRegistry::new();
    let formats = FormatRegistry::new();
    assert!(SchemaCompiler::new(&registry, &formats)
        .compile(&json!({"multipleOf": 0}))
        .is_err());
}

#[test]
fn test_numeric_keywords_ignore_strings() {
    let schema = compile(json!({"minimum": 10}));
    assert!(schema.is_valid(&json!("5")));
}
