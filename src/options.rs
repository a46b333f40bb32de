//! Construction options for [`RequestValidator`](crate::RequestValidator).
//!
//! Options are assembled with chained `with_*` setters, or read from a JSON
//! document with [`ValidatorOptions::from_json`]. Predicates (custom
//! formats, the error transformer, the logger) can only be set in code.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ConfigError, SchemaError, ValidationError};
use crate::logger::{Logger, NoopLogger};
use crate::mapper::ErrorTransformer;
use crate::schema::{FormatRegistry, DEFAULT_MAX_DEPTH};

/// Shared schemas made available to `$ref`s.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSet {
    /// Schemas registered under their own `id` property.
    List(Vec<Value>),
    /// Schemas attached as `definitions` and `components.schemas` of every
    /// root schema, keyed by name.
    Map(Map<String, Value>),
}

/// An OpenAPI 3 `requestBody`.
///
/// `content` maps media type patterns to body schemas in declaration order;
/// that order decides which of several matching patterns wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBodySpec {
    pub required: bool,
    pub content: IndexMap<String, Value>,
}

impl RequestBodySpec {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            content: IndexMap::new(),
        }
    }

    /// Declares a media type and its body schema.
    pub fn with_media_type(mut self, media_type: impl Into<String>, schema: Value) -> Self {
        self.content.insert(media_type.into(), schema);
        self
    }

    /// Reads `{"required": bool, "content": {<media type>: {"schema": ...}}}`.
    ///
    /// A media type object without `schema` accepts any body.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::invalid_option("requestBody", "must be an object"))?;

        let required = match object.get("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(required)) => *required,
            Some(_) => return Err(ConfigError::invalid_option("requestBody.required", "must be a boolean")),
        };

        let mut spec = Self::new(required);
        match object.get("content") {
            None | Some(Value::Null) => {}
            Some(Value::Object(content)) => {
                for (media_type, media_type_object) in content {
                    let schema = media_type_object
                        .get("schema")
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Map::new()));
                    spec.content.insert(media_type.clone(), schema);
                }
            }
            Some(_) => return Err(ConfigError::invalid_option("requestBody.content", "must be an object")),
        }
        Ok(spec)
    }
}

/// Everything needed to build a [`RequestValidator`](crate::RequestValidator).
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::{RequestBodySpec, ValidatorOptions};
/// use serde_json::json;
///
/// let options = ValidatorOptions::new()
///     .with_parameters(vec![json!({"name": "id", "in": "path", "required": true, "type": "string"})])
///     .with_request_body(
///         RequestBodySpec::new(true).with_media_type("application/json", json!({"type": "object"})),
///     )
///     .with_custom_format("slug", |s: &str| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
///     .with_logging_key("createPet");
/// ```
#[derive(Clone)]
pub struct ValidatorOptions {
    pub(crate) parameters: Option<Vec<Value>>,
    pub(crate) request_body: Option<RequestBodySpec>,
    pub(crate) schemas: Option<SchemaSet>,
    pub(crate) component_schemas: Option<Map<String, Value>>,
    pub(crate) external_schemas: Option<Map<String, Value>>,
    pub(crate) formats: FormatRegistry,
    pub(crate) error_transformer: Option<ErrorTransformer>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) logging_key: String,
    pub(crate) max_reference_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            parameters: None,
            request_body: None,
            schemas: None,
            component_schemas: None,
            external_schemas: None,
            formats: FormatRegistry::new(),
            error_transformer: None,
            logger: Arc::new(NoopLogger),
            logging_key: String::new(),
            max_reference_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation's parameter list (OpenAPI 2 or 3 parameter objects).
    pub fn with_parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_request_body(mut self, request_body: RequestBodySpec) -> Self {
        self.request_body = Some(request_body);
        self
    }

    pub fn with_schemas(mut self, schemas: SchemaSet) -> Self {
        self.schemas = Some(schemas);
        self
    }

    /// Sets OpenAPI 3 component schemas, registered as
    /// `#/components/schemas/<name>`. When set, `schemas` is ignored.
    pub fn with_component_schemas(mut self, schemas: Map<String, Value>) -> Self {
        self.component_schemas = Some(schemas);
        self
    }

    /// Sets schemas registered under their map key, for `$ref`s to other
    /// documents.
    pub fn with_external_schemas(mut self, schemas: Map<String, Value>) -> Self {
        self.external_schemas = Some(schemas);
        self
    }

    pub fn with_custom_format<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats = self.formats.with_format(name, predicate);
        self
    }

    /// Sets a function applied to every mapped error.
    pub fn with_error_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(ValidationError, &SchemaError) -> ValidationError + Send + Sync + 'static,
    {
        self.error_transformer = Some(Arc::new(transformer));
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Sets the key prefixed to every warning of this validator.
    pub fn with_logging_key(mut self, key: impl Into<String>) -> Self {
        self.logging_key = key.into();
        self
    }

    /// Sets the maximum number of nested `$ref` hops followed while
    /// validating recursive schemas.
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    /// Reads options from a JSON document.
    ///
    /// Recognized keys are `parameters`, `requestBody`, `schemas`,
    /// `componentSchemas`, `externalSchemas`, `customFormats`, `loggingKey`
    /// and `maxReferenceDepth`. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// - `MissingArgs` when `value` is `null`
    /// - `ParametersNotArray` when `parameters` is not an array
    /// - `CustomFormatNotFunction` for any `customFormats` entry, since JSON
    ///   cannot carry a predicate
    /// - `InvalidOption` for any other wrongly shaped option
    ///
    /// When `loggingKey` is set, any of these is wrapped in
    /// `ConfigError::Keyed`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use openapi_request_validator::{ConfigError, ValidatorOptions};
    /// use serde_json::json;
    ///
    /// let err = ValidatorOptions::from_json(&json!({"parameters": {}})).unwrap_err();
    /// assert!(matches!(err, ConfigError::ParametersNotArray));
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let object = match value {
            Value::Null => return Err(ConfigError::MissingArgs),
            Value::Object(object) => object,
            _ => return Err(ConfigError::invalid_option("args", "must be an object")),
        };
        let logging_key = match object.get("loggingKey") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(key)) => key.clone(),
            Some(_) => return Err(ConfigError::invalid_option("loggingKey", "must be a string")),
        };

        Self::read_json(object, logging_key.clone()).map_err(|err| err.keyed(&logging_key))
    }

    fn read_json(object: &Map<String, Value>, logging_key: String) -> Result<Self, ConfigError> {
        let present = |key: &str| object.get(key).filter(|value| !value.is_null());

        let mut options = Self::new();
        options.logging_key = logging_key;

        if let Some(parameters) = present("parameters") {
            let parameters = parameters.as_array().ok_or(ConfigError::ParametersNotArray)?;
            options.parameters = Some(parameters.clone());
        }

        if let Some(request_body) = present("requestBody") {
            options.request_body = Some(RequestBodySpec::from_json(request_body)?);
        }

        if let Some(schemas) = present("schemas") {
            options.schemas = Some(match schemas {
                Value::Array(list) => SchemaSet::List(list.clone()),
                Value::Object(map) => SchemaSet::Map(map.clone()),
                _ => return Err(ConfigError::invalid_option("schemas", "must be an array or an object")),
            });
        }

        options.component_schemas = present("componentSchemas")
            .map(|schemas| object_option("componentSchemas", schemas))
            .transpose()?;
        options.external_schemas = present("externalSchemas")
            .map(|schemas| object_option("externalSchemas", schemas))
            .transpose()?;

        if let Some(formats) = present("customFormats") {
            let formats = object_option("customFormats", formats)?;
            if let Some(name) = formats.keys().next() {
                return Err(ConfigError::CustomFormatNotFunction(name.clone()));
            }
        }

        if let Some(depth) = present("maxReferenceDepth") {
            let depth = depth
                .as_u64()
                .and_then(|depth| usize::try_from(depth).ok())
                .ok_or_else(|| ConfigError::invalid_option("maxReferenceDepth", "must be a non-negative integer"))?;
            options.max_reference_depth = depth;
        }

        Ok(options)
    }
}

fn object_option(option: &str, value: &Value) -> Result<Map<String, Value>, ConfigError> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| ConfigError::invalid_option(option, "must be an object"))
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field("parameters", &self.parameters)
            .field("request_body", &self.request_body)
            .field("schemas", &self.schemas)
            .field("component_schemas", &self.component_schemas)
            .field("external_schemas", &self.external_schemas)
            .field("formats", &self.formats)
            .field("error_transformer", &self.error_transformer.is_some())
            .field("logging_key", &self.logging_key)
            .field("max_reference_depth", &self.max_reference_depth)
            .finish()
    }
}
