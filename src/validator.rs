//! The request validator.
//!
//! [`RequestValidator::new`] prepares and compiles every schema an operation
//! needs once; [`RequestValidator::validate_request`] then checks requests
//! against them in a fixed order and reports every failure found.

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;
use serde_json::{json, Map, Value};
use stillwater::Validation;

use crate::error::{ConfigError, Location, RequestRejection, SchemaError, ValidationError};
use crate::logger::Logger;
use crate::mapper::ErrorMapper;
use crate::media_type::{match_media_type, MediaTypeError};
use crate::openapi::{normalize_openapi_v3, resolve_request_body};
use crate::options::{RequestBodySpec, SchemaSet, ValidatorOptions};
use crate::parameters::{convert_parameters, is_body_required, lowercase_header_names};
use crate::path::JsonPath;
use crate::registry::SchemaRegistry;
use crate::request::Request;
use crate::schema::{CompiledSchema, SchemaCompiler};
use crate::ValidationResult;

/// Schema ids of the form `#/<group>/<name>`.
static LOCAL_DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#/([^/]+)/([^/]+)$").expect("local definition pattern is valid"));

const BODY_MISSING_MESSAGE: &str = "request.body was not present in the request.  Is a body-parser being used?";

/// A body schema taken from an `in: body` parameter.
struct ParameterBody {
    schema: Value,
    validator: CompiledSchema,
}

/// A compiled validator for one declared request body media type.
struct MediaTypeBody {
    schema: Value,
    validator: CompiledSchema,
}

/// Validates requests for one API operation.
///
/// A `RequestValidator` is immutable once built and is `Send + Sync`; share
/// it behind an `Arc` to validate requests from many threads.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::{Request, RequestBodySpec, RequestValidator, ValidatorOptions};
/// use serde_json::json;
///
/// let validator = RequestValidator::new(
///     ValidatorOptions::new()
///         .with_parameters(vec![json!({
///             "name": "X-Api-Key", "in": "header", "required": true, "schema": {"type": "string"}
///         })])
///         .with_request_body(RequestBodySpec::new(true).with_media_type(
///             "application/json",
///             json!({"properties": {"name": {"type": "string"}}, "required": ["name"]}),
///         )),
/// )
/// .unwrap();
///
/// let request = Request::new()
///     .with_header("Content-Type", "application/json")
///     .with_header("x-api-key", "secret")
///     .with_body(json!({"name": "Rex"}));
/// assert!(validator.validate_request(&request).unwrap().is_none());
///
/// let rejection = validator
///     .validate_request(&request.clone().with_body(json!({})))
///     .unwrap()
///     .unwrap();
/// assert_eq!(rejection.status.as_u16(), 400);
/// assert_eq!(rejection.errors[0].path.as_deref(), Some("name"));
/// ```
pub struct RequestValidator {
    parameter_body: Option<ParameterBody>,
    request_body: Option<IndexMap<String, MediaTypeBody>>,
    form_data: Option<CompiledSchema>,
    headers: Option<CompiledSchema>,
    path: Option<CompiledSchema>,
    query: Option<CompiledSchema>,
    is_body_required: bool,
    mapper: ErrorMapper,
    logger: Arc<dyn Logger>,
    logging_key: String,
}

impl RequestValidator {
    /// Builds a validator from `options`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Registry` when two schemas share an id
    /// - `ConfigError::Compile` for an unresolvable `$ref` or an invalid
    ///   keyword
    ///
    /// With a non-empty logging key the error is a `ConfigError::Keyed`
    /// wrapping one of the above; use [`ConfigError::kind`] to inspect it.
    pub fn new(options: ValidatorOptions) -> Result<Self, ConfigError> {
        let logging_key = options.logging_key.clone();
        Self::build(options).map_err(|err| err.keyed(&logging_key))
    }

    fn build(options: ValidatorOptions) -> Result<Self, ConfigError> {
        let ValidatorOptions {
            parameters,
            request_body,
            schemas,
            component_schemas,
            external_schemas,
            formats,
            error_transformer,
            logger,
            logging_key,
            max_reference_depth,
        } = options;
        let logging_key = if logging_key.is_empty() {
            logging_key
        } else {
            format!("{}: ", logging_key)
        };

        let registry = SchemaRegistry::new();
        let mut local_definitions: Vec<(String, String, Value)> = Vec::new();
        let mut shared_schemas: Option<Map<String, Value>> = None;

        if let Some(component_schemas) = component_schemas {
            for (name, schema) in component_schemas {
                registry.register(format!("#/components/schemas/{}", name), schema)?;
            }
        } else {
            match schemas {
                Some(SchemaSet::List(list)) => {
                    for schema in list {
                        let Some(id) = schema.get("id").and_then(Value::as_str).map(str::to_string) else {
                            logger.warn(&logging_key, "ignoring schema without id property");
                            continue;
                        };
                        if let Some(captures) = LOCAL_DEFINITION_RE.captures(&id) {
                            local_definitions.push((
                                captures[1].to_string(),
                                captures[2].to_string(),
                                schema.clone(),
                            ));
                        }
                        registry.register(id, schema)?;
                    }
                }
                Some(SchemaSet::Map(map)) => shared_schemas = Some(map),
                None => {}
            }
        }

        if let Some(external_schemas) = external_schemas {
            for (id, schema) in external_schemas {
                registry.register(id, schema)?;
            }
        }

        let compiler = SchemaCompiler::new(&registry, &formats).with_max_depth(max_reference_depth);
        let prepare_root = |schema: Value| -> Value {
            let mut root = schema;
            if let Value::Object(keywords) = &mut root {
                for (group, name, definition) in &local_definitions {
                    let entry = keywords
                        .entry(group.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(group) = entry {
                        group.insert(name.clone(), definition.clone());
                    }
                }
            }
            attach_shared_schemas(root, shared_schemas.as_ref())
        };
        let compile_root = |location: &str, schema: Value| -> Result<CompiledSchema, ConfigError> {
            let validator = compiler.compile(&normalize_openapi_v3(&prepare_root(schema)))?;
            tracing::debug!(logging_key = %logging_key, location, "compiled parameter validator");
            Ok(validator)
        };

        let mut is_body_required_flag = false;
        let mut parameter_body = None;
        let mut form_data = None;
        let mut headers = None;
        let mut path = None;
        let mut query = None;

        if let Some(parameters) = &parameters {
            let converted = convert_parameters(parameters);
            is_body_required_flag = is_body_required(parameters);

            if let Some(schema) = converted.body {
                let validator = compile_root("body", json!({"properties": {"body": schema.clone()}}))?;
                parameter_body = Some(ParameterBody { schema, validator });
            }
            form_data = converted
                .form_data
                .map(|schema| compile_root("formData", schema))
                .transpose()?;
            headers = converted
                .headers
                .map(|schema| compile_root("headers", lowercase_header_names(schema)))
                .transpose()?;
            path = converted.path.map(|schema| compile_root("path", schema)).transpose()?;
            query = converted.query.map(|schema| compile_root("query", schema)).transpose()?;
        }

        let request_body = match request_body {
            Some(spec) => {
                is_body_required_flag = spec.required;
                Some(compile_request_body(
                    &spec,
                    &registry,
                    &compiler,
                    shared_schemas.as_ref(),
                    &logging_key,
                )?)
            }
            None => None,
        };

        tracing::debug!(
            logging_key = %logging_key,
            is_body_required = is_body_required_flag,
            "request validator ready"
        );

        Ok(Self {
            parameter_body,
            request_body,
            form_data,
            headers,
            path,
            query,
            is_body_required: is_body_required_flag,
            mapper: ErrorMapper::new(error_transformer),
            logger,
            logging_key,
        })
    }

    /// Returns true when requests must carry a body.
    pub fn is_body_required(&self) -> bool {
        self.is_body_required
    }

    /// Validates a request.
    ///
    /// Returns `Ok(None)` when the request passes, or the rejection to
    /// answer it with: `400` with every schema failure (or the single
    /// missing-body error), `415` when no declared media type matches the
    /// Content-Type.
    ///
    /// # Errors
    ///
    /// Returns `MediaTypeError::InvalidParameterFormat` when the
    /// Content-Type header has malformed parameters.
    pub fn validate_request(&self, request: &Request) -> Result<Option<RequestRejection>, MediaTypeError> {
        let mut failures: Vec<(Location, SchemaError)> = Vec::new();
        let mut body_missing: Option<ValidationError> = None;
        let mut unsupported_media_type: Option<ValidationError> = None;
        let body = request.body.as_ref().filter(|body| !body.is_null());

        if let Some(parameter_body) = &self.parameter_body {
            match body {
                Some(body) => collect(
                    &mut failures,
                    Location::Body,
                    parameter_body.validator.validate(&json!({ "body": body })),
                ),
                None if self.is_body_required => {
                    body_missing = Some(missing_body_error(&parameter_body.schema));
                }
                None => {}
            }
        }

        if let Some(media_types) = &self.request_body {
            let content_type = request.header("content-type").filter(|value| !value.is_empty());
            match match_media_type(content_type, media_types, self.logger.as_ref(), &self.logging_key)? {
                None => {
                    if let Some(content_type) = content_type {
                        unsupported_media_type = Some(ValidationError::new(
                            Location::Body,
                            format!("Unsupported Content-Type {}", content_type),
                        ));
                    } else if self.is_body_required {
                        failures.push((
                            Location::Body,
                            SchemaError::new(JsonPath::from_field("body"), "required", "media type is not specified"),
                        ));
                    }
                }
                Some(media_type) => {
                    if let Some(media_type_body) = media_types.get(media_type) {
                        match body {
                            Some(body) => collect(
                                &mut failures,
                                Location::Body,
                                media_type_body.validator.validate(&json!({ "body": body })),
                            ),
                            None if self.is_body_required => {
                                body_missing = Some(missing_body_error(&media_type_body.schema));
                            }
                            None => {}
                        }
                    }
                }
            }
        }

        if let Some(form_data) = &self.form_data {
            if body_missing.is_none() {
                let raw = request.body.clone().unwrap_or(Value::Null);
                collect(&mut failures, Location::FormData, form_data.validate(&raw));
            }
        }
        if let Some(path) = &self.path {
            collect(&mut failures, Location::Path, path.validate(&Value::Object(request.params.clone())));
        }
        if let Some(headers) = &self.headers {
            collect(&mut failures, Location::Headers, headers.validate(&request.lowercased_headers()));
        }
        if let Some(query) = &self.query {
            collect(&mut failures, Location::Query, query.validate(&Value::Object(request.query.clone())));
        }

        let rejection = if !failures.is_empty() {
            Some(RequestRejection::bad_request(
                failures
                    .iter()
                    .map(|(location, failure)| self.mapper.map(failure, *location))
                    .collect(),
            ))
        } else if let Some(error) = body_missing {
            Some(RequestRejection::bad_request(vec![error]))
        } else {
            unsupported_media_type.map(RequestRejection::unsupported_media_type)
        };

        match &rejection {
            Some(rejection) => tracing::debug!(
                logging_key = %self.logging_key,
                status = rejection.status.as_u16(),
                errors = rejection.errors.len(),
                "request rejected"
            ),
            None => tracing::debug!(logging_key = %self.logging_key, "request accepted"),
        }
        Ok(rejection)
    }

    /// Validates a request and discards the outcome.
    #[deprecated(note = "use validate_request instead")]
    pub fn validate(&self, request: &Request) {
        self.logger
            .warn(&self.logging_key, "validate is deprecated, use validateRequest instead.");
        let _ = self.validate_request(request);
    }
}

fn compile_request_body(
    spec: &RequestBodySpec,
    registry: &SchemaRegistry,
    compiler: &SchemaCompiler<'_>,
    shared_schemas: Option<&Map<String, Value>>,
    logging_key: &str,
) -> Result<IndexMap<String, MediaTypeBody>, ConfigError> {
    let declared: Vec<(&String, &Value)> = spec.content.iter().collect();

    let compiled = declared
        .par_iter()
        .map(|(media_type, schema)| -> Result<(String, MediaTypeBody), ConfigError> {
            let resolved = resolve_request_body(schema, registry);
            let root = attach_shared_schemas(json!({"properties": {"body": resolved}}), shared_schemas);
            let validator = compiler.compile(&normalize_openapi_v3(&root))?;
            tracing::debug!(logging_key, media_type = %media_type, "compiled request body validator");
            Ok((
                media_type.to_string(),
                MediaTypeBody {
                    schema: (*schema).clone(),
                    validator,
                },
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(compiled.into_iter().collect())
}

/// Adds a schemas map as both `definitions` and `components.schemas`.
fn attach_shared_schemas(mut root: Value, shared_schemas: Option<&Map<String, Value>>) -> Value {
    if let (Some(shared), Value::Object(keywords)) = (shared_schemas, &mut root) {
        keywords.insert("definitions".to_string(), Value::Object(shared.clone()));
        keywords.insert("components".to_string(), json!({ "schemas": shared }));
    }
    root
}

fn missing_body_error(schema: &Value) -> ValidationError {
    ValidationError::new(Location::Body, BODY_MISSING_MESSAGE).with_schema(schema.clone())
}

fn collect(failures: &mut Vec<(Location, SchemaError)>, location: Location, result: ValidationResult<()>) {
    if let Validation::Failure(errors) = result {
        failures.extend(errors.into_iter().map(|error| (location, error)));
    }
}

impl fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let media_types: Vec<&String> = self.request_body.iter().flat_map(|content| content.keys()).collect();
        f.debug_struct("RequestValidator")
            .field("body", &self.parameter_body.is_some())
            .field("media_types", &media_types)
            .field("form_data", &self.form_data.is_some())
            .field("headers", &self.headers.is_some())
            .field("path", &self.path.is_some())
            .field("query", &self.query.is_some())
            .field("is_body_required", &self.is_body_required)
            .field("logging_key", &self.logging_key)
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<RequestValidator>();
    assert_sync::<RequestValidator>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLogger;

    #[test]
    fn test_schema_without_id_is_skipped_with_warning() {
        let logger = Arc::new(RecordingLogger::default());
        let validator = RequestValidator::new(
            ValidatorOptions::new()
                .with_schemas(SchemaSet::List(vec![json!({"type": "string"})]))
                .with_logger(logger.clone())
                .with_logging_key("pets"),
        )
        .unwrap();

        assert!(!validator.is_body_required());
        let warnings = logger.warnings.lock();
        assert_eq!(
            *warnings,
            vec![("pets: ".to_string(), "ignoring schema without id property".to_string())]
        );
    }

    #[test]
    fn test_deprecated_validate_warns() {
        let logger = Arc::new(RecordingLogger::default());
        let validator = RequestValidator::new(ValidatorOptions::new().with_logger(logger.clone())).unwrap();

        #[allow(deprecated)]
        validator.validate(&Request::new());

        let warnings = logger.warnings.lock();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].1.contains("deprecated"));
    }

    #[test]
    fn test_local_definitions_are_inlined_into_parameter_roots() {
        let validator = RequestValidator::new(
            ValidatorOptions::new()
                .with_parameters(vec![json!({
                    "name": "id", "in": "query", "schema": {"$ref": "#/definitions/Id"}
                })])
                .with_schemas(SchemaSet::List(vec![json!({"id": "#/definitions/Id", "type": "integer"})])),
        )
        .unwrap();

        let request = Request::new().with_query("id", json!("abc"));
        let rejection = validator.validate_request(&request).unwrap().unwrap();
        assert_eq!(rejection.errors[0].path.as_deref(), Some("id"));
        assert_eq!(rejection.errors[0].location, Location::Query);
    }
}
