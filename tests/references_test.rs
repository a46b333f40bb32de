//! Integration tests for `$ref` resolution at compile time.

use openapi_request_validator::{CompileError, FormatRegistry, SchemaCompiler, SchemaRegistry};
use serde_json::json;
use stillwater::Validation;

#[test]
fn test_ref_to_registered_component() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "#/components/schemas/Owner",
            json!({"properties": {"name": {"type": "string"}}, "required": ["name"]}),
        )
        .unwrap();
    let formats = FormatRegistry::new();

    let schema = SchemaCompiler::new(&registry, &formats)
        .compile(&json!({"properties": {"owner": {"$ref": "#/components/schemas/Owner"}}}))
        .unwrap();

    assert!(schema.is_valid(&json!({"owner": {"name": "Ada"}})));

    let Validation::Failure(errors) = schema.validate(&json!({"owner": {}})) else {
        panic!("expected failure");
    };
    assert_eq!(errors.first().path.to_string(), ".owner");
    assert_eq!(errors.first().param_str("missingProperty"), Some("name"));
}

#[test]
fn test_ref_into_local_definitions() {
    let registry = SchemaRegistry::new();
    let formats = FormatRegistry::new();

    let schema = SchemaCompiler::new(&registry, &formats)
        .compile(&json!({
            "definitions": {"Id": {"type": "integer", "minimum": 1}},
            "properties": {"id": {"$ref": "#/definitions/Id"}}
        }))
        .unwrap();

    assert!(schema.is_valid(&json!({"id": 3})));
    assert!(!schema.is_valid(&json!({"id": 0})));
}

#[test]
fn test_ref_into_external_document() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "common.json",
            json!({"definitions": {"Tag": {"type": "string", "maxLength": 4}}}),
        )
        .unwrap();
    let formats = FormatRegistry::new();

    let schema = SchemaCompiler::new(&registry, &formats)
        .compile(&json!({"items": {"$ref": "common.json#/definitions/Tag"}}))
        .unwrap();

    assert!(schema.is_valid(&json!(["a", "bb"])));
    assert!(!schema.is_valid(&json!(["toolong"])));
}

#[test]
fn test_local_ref_inside_registered_document_stays_in_that_document() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "#/components/schemas/Pet",
            json!({
                "definitions": {"Name": {"type": "string", "minLength": 1}},
                "properties": {"name": {"$ref": "#/definitions/Name"}}
            }),
        )
        .unwrap();
    let formats = FormatRegistry::new();

    let schema = SchemaCompiler::new(&registry, &formats)
        .compile(&json!({
            "definitions": {"Name": {"type": "integer"}},
            "properties": {"pet": {"$ref": "#/components/schemas/Pet"}}
        }))
        .unwrap();

    assert!(schema.is_valid(&json!({"pet": {"name": "Rex"}})));
    assert!(!schema.is_valid(&json!({"pet": {"name": ""}})));
}

#[test]
fn test_missing_ref_fails_compilation() {
    let registry = SchemaRegistry::new();
    let formats = FormatRegistry::new();

    let result = SchemaCompiler::new(&registry, &formats)
        .compile(&json!({"properties": {"pet": {"$ref": "#/components/schemas/Pet"}}}));

    match result {
        Err(CompileError::UnresolvedReference(reference)) => {
            assert_eq!(reference, "#/components/schemas/Pet")
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected compilation to fail"),
    }
}

#[test]
fn test_sibling_keywords_of_ref_are_ignored() {
    let registry = SchemaRegistry::new();
    registry.register("Name", json!({"type": "string"})).unwrap();
    let formats = FormatRegistry::new();

    let schema = SchemaCompiler::new(&registry, &formats)
        .compile(&json!({"$ref": "Name", "minLength": 10}))
        .unwrap();

    assert!(schema.is_valid(&json!("short")));
}
