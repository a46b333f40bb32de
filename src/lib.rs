//! # OpenAPI request validator
//!
//! Validates incoming HTTP requests against the parameters and request
//! body of an OpenAPI 2 or 3 operation, accumulating ALL failures rather
//! than stopping at the first one.
//!
//! ## Overview
//!
//! A [`RequestValidator`] is built once per operation from
//! [`ValidatorOptions`]. Building it prepares every schema:
//!
//! - parameter lists are converted to one schema per location
//!   ([`convert_parameters`]);
//! - request body schemas are dereferenced, stripped of read-only `required`
//!   entries and normalized from OpenAPI 3 `nullable` to draft-04 unions
//!   ([`openapi`]);
//! - everything is compiled by the built-in draft-04 engine ([`schema`]).
//!
//! Each request is then checked with
//! [`RequestValidator::validate_request`], which returns `None` on success
//! or a [`RequestRejection`] carrying the status (`400` or `415`) and
//! every [`ValidationError`].
//!
//! ## Core Types
//!
//! - [`RequestValidator`]: the compiled, immutable validator for one operation
//! - [`Request`]: the parts of a request that get validated
//! - [`ValidationError`]: one failure in its public shape
//! - [`CompiledSchema`]: a reusable JSON Schema validator
//! - [`SchemaError`] / [`SchemaErrors`]: raw engine failures
//!
//! ## Example
//!
//! ```rust
//! use openapi_request_validator::{Location, Request, RequestValidator, ValidatorOptions};
//! use serde_json::json;
//!
//! let validator = RequestValidator::new(ValidatorOptions::new().with_parameters(vec![
//!     json!({"name": "petId", "in": "path", "required": true, "type": "integer"}),
//!     json!({"name": "verbose", "in": "query", "type": "boolean"}),
//! ]))
//! .unwrap();
//!
//! let ok = Request::new().with_param("petId", json!(7));
//! assert!(validator.validate_request(&ok).unwrap().is_none());
//!
//! let bad = Request::new()
//!     .with_param("petId", json!("seven"))
//!     .with_query("verbose", json!("yes"));
//! let rejection = validator.validate_request(&bad).unwrap().unwrap();
//!
//! assert_eq!(rejection.status.as_u16(), 400);
//! assert_eq!(rejection.errors.len(), 2);
//! assert_eq!(rejection.errors[0].location, Location::Path);
//! assert_eq!(rejection.errors[0].path.as_deref(), Some("petId"));
//! assert_eq!(
//!     rejection.errors[0].error_code.as_deref(),
//!     Some("type.openapi.requestValidation")
//! );
//! ```

pub mod error;
pub mod logger;
pub mod mapper;
pub mod media_type;
pub mod openapi;
pub mod options;
pub mod parameters;
pub mod path;
pub mod registry;
pub mod request;
pub mod schema;
pub mod validation;
pub mod validator;

pub use error::{ConfigError, Location, RequestRejection, SchemaError, SchemaErrors, ValidationError};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use mapper::{ErrorMapper, ErrorTransformer};
pub use media_type::{match_media_type, ContentType, MediaTypeError};
pub use options::{RequestBodySpec, SchemaSet, ValidatorOptions};
pub use parameters::{convert_parameters, ParameterSchemas};
pub use path::{JsonPath, PathSegment};
pub use registry::{RegistryError, SchemaRegistry};
pub use request::Request;
pub use schema::{CompileError, CompiledSchema, FormatRegistry, SchemaCompiler, SchemaLike};
pub use validator::RequestValidator;

/// Type alias for validation results using SchemaErrors
pub type ValidationResult<T> = stillwater::Validation<T, SchemaErrors>;
