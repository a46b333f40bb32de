//! End-to-end tests for request validation.

use http::StatusCode;
use openapi_request_validator::{
    ConfigError, Location, Request, RequestBodySpec, RequestValidator, SchemaSet, TracingLogger,
    ValidationError, ValidatorOptions,
};
use std::sync::Arc;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

const BODY_MISSING: &str = "request.body was not present in the request.  Is a body-parser being used?";

fn components(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect()
}

fn json_body_validator(required: bool, schema: Value) -> RequestValidator {
    RequestValidator::new(
        ValidatorOptions::new()
            .with_request_body(RequestBodySpec::new(required).with_media_type("application/json", schema)),
    )
    .unwrap()
}

fn json_request(body: Value) -> Request {
    Request::new()
        .with_header("Content-Type", "application/json")
        .with_body(body)
}

#[test]
fn test_valid_request_passes() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_parameters(vec![
                json!({"name": "petId", "in": "path", "required": true, "schema": {"type": "integer"}}),
                json!({"name": "X-Request-Id", "in": "header", "required": true, "schema": {"type": "string"}}),
                json!({"name": "fields", "in": "query", "schema": {"type": "string"}}),
            ])
            .with_request_body(RequestBodySpec::new(true).with_media_type(
                "application/json",
                json!({"properties": {"name": {"type": "string"}}, "required": ["name"]}),
            )),
    )
    .unwrap();

    let request = json_request(json!({"name": "Rex"}))
        .with_param("petId", json!(12))
        .with_header("X-Request-Id", "abc")
        .with_query("fields", json!("name"));

    assert_eq!(validator.validate_request(&request).unwrap(), None);
}

#[test]
fn test_errors_from_every_location_are_reported_in_order() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_parameters(vec![
                json!({"name": "petId", "in": "path", "required": true, "type": "integer"}),
                json!({"name": "X-Api-Key", "in": "header", "required": true, "type": "string"}),
                json!({"name": "limit", "in": "query", "type": "integer", "maximum": 50}),
            ])
            .with_request_body(RequestBodySpec::new(true).with_media_type(
                "application/json",
                json!({"properties": {"age": {"type": "integer"}}}),
            )),
    )
    .unwrap();

    let request = json_request(json!({"age": "old"}))
        .with_param("petId", json!("abc"))
        .with_query("limit", json!(100));

    let rejection = validator.validate_request(&request).unwrap().unwrap();
    assert_eq!(rejection.status, StatusCode::BAD_REQUEST);

    let summary: Vec<(Location, Option<&str>, Option<&str>)> = rejection
        .errors
        .iter()
        .map(|e| (e.location, e.path.as_deref(), e.error_code.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Location::Body, Some("age"), Some("type.openapi.requestValidation")),
            (Location::Path, Some("petId"), Some("type.openapi.requestValidation")),
            (Location::Headers, Some("x-api-key"), Some("required.openapi.requestValidation")),
            (Location::Query, Some("limit"), Some("maximum.openapi.requestValidation")),
        ]
    );
}

#[test]
fn test_headers_match_case_insensitively() {
    let validator = RequestValidator::new(ValidatorOptions::new().with_parameters(vec![json!({
        "name": "X-Api-Key",
        "in": "header",
        "required": true,
        "schema": {"type": "string", "minLength": 4}
    })]))
    .unwrap();

    let request = Request::new().with_header("x-api-key", "secret");
    assert_eq!(validator.validate_request(&request).unwrap(), None);

    let request = Request::new().with_header("X-API-KEY", "abc");
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    assert_eq!(rejection.errors[0].path.as_deref(), Some("x-api-key"));
    assert_eq!(rejection.errors[0].location, Location::Headers);
}

#[test]
fn test_missing_body_with_parameter_body_schema() {
    let body_schema = json!({"type": "object", "required": ["name"]});
    let validator = RequestValidator::new(ValidatorOptions::new().with_parameters(vec![json!({
        "name": "pet", "in": "body", "required": true, "schema": body_schema.clone()
    })]))
    .unwrap();
    assert!(validator.is_body_required());

    for request in [Request::new(), Request::new().with_body(Value::Null)] {
        let rejection = validator.validate_request(&request).unwrap().unwrap();
        assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            rejection.errors,
            vec![ValidationError::new(Location::Body, BODY_MISSING).with_schema(body_schema.clone())]
        );
        assert_eq!(rejection.errors[0].error_code, None);
    }
}

#[test]
fn test_parameter_body_errors_are_mapped() {
    let validator = RequestValidator::new(ValidatorOptions::new().with_parameters(vec![json!({
        "name": "pet", "in": "body", "schema": {"properties": {"tags": {"items": {"type": "string"}}}}
    })]))
    .unwrap();
    assert!(!validator.is_body_required());
    assert_eq!(validator.validate_request(&Request::new()).unwrap(), None);

    let rejection = validator
        .validate_request(&Request::new().with_body(json!({"tags": ["a", 1]})))
        .unwrap()
        .unwrap();
    assert_eq!(rejection.errors[0].path.as_deref(), Some("tags[1]"));
}

#[test]
fn test_missing_body_with_media_type_schema() {
    let schema = json!({"type": "object"});
    let validator = json_body_validator(true, schema.clone());

    let request = Request::new().with_header("Content-Type", "application/json");
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        rejection.errors,
        vec![ValidationError::new(Location::Body, BODY_MISSING).with_schema(schema)]
    );
}

#[test]
fn test_optional_body_may_be_absent() {
    let validator = json_body_validator(false, json!({"type": "object"}));
    assert_eq!(validator.validate_request(&Request::new()).unwrap(), None);
    assert_eq!(
        validator
            .validate_request(&Request::new().with_header("Content-Type", "application/json"))
            .unwrap(),
        None
    );
}

#[test]
fn test_media_type_not_specified() {
    let validator = json_body_validator(true, json!({"type": "object"}));

    let rejection = validator
        .validate_request(&Request::new().with_body(json!({})))
        .unwrap()
        .unwrap();
    assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        rejection.errors,
        vec![ValidationError::new(Location::Body, "media type is not specified")
            .with_error_code("required.openapi.requestValidation")]
    );
}

#[test]
fn test_unsupported_content_type() {
    let validator = json_body_validator(true, json!({"type": "object"}));

    let request = Request::new()
        .with_header("Content-Type", "application/xml")
        .with_body(json!("<pet/>"));
    let rejection = validator.validate_request(&request).unwrap().unwrap();

    assert_eq!(rejection.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        rejection.to_json(),
        json!({
            "status": 415,
            "errors": [{"message": "Unsupported Content-Type application/xml", "location": "body"}]
        })
    );
}

#[test]
fn test_schema_failures_take_precedence_over_unsupported_content_type() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_parameters(vec![json!({"name": "id", "in": "path", "required": true, "type": "integer"})])
            .with_request_body(RequestBodySpec::new(true).with_media_type("application/json", json!({}))),
    )
    .unwrap();

    let request = Request::new()
        .with_header("Content-Type", "text/plain")
        .with_body(json!("hi"));
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejection.errors.len(), 1);
    assert_eq!(rejection.errors[0].location, Location::Path);
}

#[test]
fn test_wildcard_media_types_select_schema() {
    let validator = RequestValidator::new(
        ValidatorOptions::new().with_request_body(
            RequestBodySpec::new(true)
                .with_media_type("*/*", json!({"type": "string"}))
                .with_media_type("text/*", json!({"type": "string", "maxLength": 3})),
        ),
    )
    .unwrap();

    let text = Request::new()
        .with_header("Content-Type", "text/html")
        .with_body(json!("<html>"));
    let rejection = validator.validate_request(&text).unwrap().unwrap();
    assert_eq!(rejection.errors[0].error_code.as_deref(), Some("maxLength.openapi.requestValidation"));

    let image = Request::new()
        .with_header("Content-Type", "image/png")
        .with_body(json!("<bytes>"));
    assert_eq!(validator.validate_request(&image).unwrap(), None);
}

#[test]
fn test_structured_suffix_selects_generic_schema() {
    let validator = json_body_validator(true, json!({"required": ["name"]}));

    let request = Request::new()
        .with_header("Content-Type", "application/vnd.thing+json")
        .with_body(json!({}));
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejection.errors[0].path.as_deref(), Some("name"));
}

#[test]
fn test_malformed_content_type_parameters_propagate() {
    let validator = json_body_validator(true, json!({}));
    let request = Request::new()
        .with_header("Content-Type", "application/json; =")
        .with_body(json!({}));
    assert!(validator.validate_request(&request).is_err());
}

#[test]
fn test_unparseable_media_type_is_unsupported() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_logger(Arc::new(TracingLogger))
            .with_logging_key("createPet")
            .with_request_body(RequestBodySpec::new(true).with_media_type("*/*", json!({}))),
    )
    .unwrap();

    let request = Request::new()
        .with_header("Content-Type", "not a media type")
        .with_body(json!({}));
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    assert_eq!(rejection.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(rejection.errors[0].message, "Unsupported Content-Type not a media type");
}

#[test]
fn test_read_only_properties() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_component_schemas(components(&[(
                "Pet",
                json!({
                    "properties": {
                        "id": {"type": "integer", "readOnly": true},
                        "name": {"type": "string"}
                    },
                    "required": ["id", "name"]
                }),
            )]))
            .with_request_body(
                RequestBodySpec::new(true)
                    .with_media_type("application/json", json!({"$ref": "#/components/schemas/Pet"})),
            ),
    )
    .unwrap();

    assert_eq!(validator.validate_request(&json_request(json!({"name": "Rex"}))).unwrap(), None);

    let rejection = validator
        .validate_request(&json_request(json!({"id": 5, "name": "Rex"})))
        .unwrap()
        .unwrap();
    assert_eq!(
        rejection.errors,
        vec![ValidationError::new(Location::Body, "is read-only")
            .with_path("id")
            .with_error_code("readOnly.openapi.requestValidation")]
    );
}

#[test]
fn test_nullable_properties() {
    let validator = json_body_validator(
        true,
        json!({
            "properties": {
                "nickname": {"type": "string", "nullable": true},
                "kind": {"type": "string", "enum": ["cat", "dog"], "nullable": true}
            }
        }),
    );

    let request = json_request(json!({"nickname": null, "kind": null}));
    assert_eq!(validator.validate_request(&request).unwrap(), None);

    let request = json_request(json!({"nickname": 3, "kind": "cow"}));
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    let codes: Vec<_> = rejection.errors.iter().filter_map(|e| e.error_code.clone()).collect();
    assert_eq!(
        codes,
        vec!["type.openapi.requestValidation", "oneOf.openapi.requestValidation"]
    );
}

#[test]
fn test_schemas_map_is_available_to_body_refs() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_schemas(SchemaSet::Map(components(&[(
                "Tag",
                json!({"type": "string", "maxLength": 5}),
            )])))
            .with_parameters(vec![json!({
                "name": "tag", "in": "body", "schema": {"$ref": "#/definitions/Tag"}
            })])
            .with_request_body(RequestBodySpec::new(false).with_media_type(
                "application/json",
                json!({"items": {"$ref": "#/components/schemas/Tag"}}),
            )),
    )
    .unwrap();

    let request = json_request(json!(["short", "much too long"]));
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    let paths: Vec<_> = rejection.errors.iter().map(|e| e.path.clone()).collect();
    assert_eq!(paths, vec![None, Some("[1]".to_string())]);
}

#[test]
fn test_file_upload_parameters_compile() {
    let validator = RequestValidator::new(ValidatorOptions::new().with_parameters(vec![
        json!({"name": "upload", "in": "formData", "required": true, "type": "file"}),
        json!({"name": "caption", "in": "formData", "type": "string", "maxLength": 20}),
    ]))
    .unwrap();
    assert!(validator.is_body_required());

    let request = Request::new().with_body(json!({"upload": "<binary>", "caption": "cat"}));
    assert_eq!(validator.validate_request(&request).unwrap(), None);

    let rejection = validator
        .validate_request(&Request::new().with_body(json!({"caption": "cat"})))
        .unwrap()
        .unwrap();
    assert_eq!(
        rejection.errors,
        vec![ValidationError::new(Location::FormData, "should have required property 'upload'")
            .with_path("upload")
            .with_error_code("required.openapi.requestValidation")]
    );
}

#[test]
fn test_form_data_is_validated_against_raw_body() {
    let validator = RequestValidator::new(ValidatorOptions::new().with_parameters(vec![
        json!({"name": "name", "in": "formData", "required": true, "type": "string"}),
        json!({"name": "age", "in": "formData", "type": "integer"}),
    ]))
    .unwrap();
    assert!(validator.is_body_required());

    let request = Request::new().with_body(json!({"name": "Rex", "age": 3}));
    assert_eq!(validator.validate_request(&request).unwrap(), None);

    let request = Request::new().with_body(json!({"age": "three"}));
    let rejection = validator.validate_request(&request).unwrap().unwrap();
    let summary: Vec<_> = rejection
        .errors
        .iter()
        .map(|e| (e.location, e.path.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Location::FormData, Some("name".to_string())),
            (Location::FormData, Some("age".to_string())),
        ]
    );
}

#[test]
fn test_error_transformer_is_applied() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_parameters(vec![json!({"name": "id", "in": "path", "required": true, "type": "integer"})])
            .with_error_transformer(|mapped, raw| ValidationError {
                message: format!("{} [{}]", mapped.message, raw.keyword),
                ..mapped
            }),
    )
    .unwrap();

    let rejection = validator
        .validate_request(&Request::new().with_param("id", json!("x")))
        .unwrap()
        .unwrap();
    assert_eq!(rejection.errors[0].message, "should be integer [type]");
}

#[test]
fn test_duplicate_schema_ids_are_fatal() {
    let result = RequestValidator::new(
        ValidatorOptions::new()
            .with_schemas(SchemaSet::List(vec![json!({"id": "Pet"})]))
            .with_external_schemas(components(&[("Pet", json!({}))])),
    );
    assert!(matches!(result, Err(ConfigError::Registry(_))));
}

#[test]
fn test_unresolvable_reference_is_fatal() {
    let result = RequestValidator::new(ValidatorOptions::new().with_request_body(
        RequestBodySpec::new(true).with_media_type("application/json", json!({"$ref": "#/components/schemas/Nope"})),
    ));
    assert!(matches!(result, Err(ConfigError::Compile(_))));
}

#[test]
fn test_recursive_body_schema_is_accepted() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_component_schemas(components(&[(
                "Category",
                json!({
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "parent": {"nullable": true, "allOf": [{"$ref": "#/components/schemas/Category"}]}
                    }
                }),
            )]))
            .with_request_body(RequestBodySpec::new(true).with_media_type(
                "application/json",
                json!({"$ref": "#/components/schemas/Category"}),
            )),
    )
    .unwrap();

    let valid = json_request(json!({"name": "toys", "parent": {"name": "all"}}));
    assert_eq!(validator.validate_request(&valid).unwrap(), None);

    let invalid = json_request(json!({"name": "toys", "parent": {"name": 3}}));
    assert!(validator.validate_request(&invalid).unwrap().is_some());
}

#[test]
fn test_setup_errors_carry_logging_key() {
    let result = RequestValidator::new(
        ValidatorOptions::new()
            .with_logging_key("createPet")
            .with_request_body(RequestBodySpec::new(true).with_media_type(
                "application/json",
                json!({"$ref": "#/components/schemas/Nope"}),
            )),
    );

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("createPet: "));
    assert!(matches!(err.kind(), ConfigError::Compile(_)));
}

#[test]
fn test_custom_formats_are_used() {
    let validator = RequestValidator::new(
        ValidatorOptions::new()
            .with_custom_format("pet-slug", |s: &str| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
            .with_parameters(vec![json!({"name": "slug", "in": "path", "required": true, "type": "string", "format": "pet-slug"})]),
    )
    .unwrap();

    assert_eq!(
        validator
            .validate_request(&Request::new().with_param("slug", json!("good-dog")))
            .unwrap(),
        None
    );
    assert!(validator
        .validate_request(&Request::new().with_param("slug", json!("Bad Dog")))
        .unwrap()
        .is_some());
}

#[test]
fn test_options_from_json() {
    let options = ValidatorOptions::from_json(&json!({
        "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}],
        "loggingKey": "getPet"
    }))
    .unwrap();
    let validator = RequestValidator::new(options).unwrap();

    assert_eq!(
        validator
            .validate_request(&Request::new().with_param("id", json!(1)))
            .unwrap(),
        None
    );
    assert!(matches!(
        ValidatorOptions::from_json(&Value::Null),
        Err(ConfigError::MissingArgs)
    ));
}
