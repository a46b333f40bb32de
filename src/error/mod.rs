//! Error types.
//!
//! Raw engine failures ([`SchemaError`], [`SchemaErrors`]), the public
//! per-request error shape ([`ValidationError`], [`RequestRejection`]), and
//! fatal construction errors ([`ConfigError`]).

mod config_error;
mod schema_error;
mod validation_error;

pub use config_error::ConfigError;
pub use schema_error::{SchemaError, SchemaErrors};
pub use validation_error::{Location, RequestRejection, ValidationError};
