//! Fatal construction errors.

use crate::registry::RegistryError;
use crate::schema::CompileError;

/// Errors raised while building a [`RequestValidator`](crate::RequestValidator).
///
/// These are configuration mistakes; none of them is recoverable at request time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The options document was absent or `null`.
    #[error("missing args argument")]
    MissingArgs,

    /// `parameters` was supplied but is not an array.
    #[error("args.parameters must be an Array")]
    ParametersNotArray,

    /// A custom format entry is not a predicate.
    #[error("args.customFormats properties must be functions (got '{0}')")]
    CustomFormatNotFunction(String),

    /// An option has the wrong shape.
    #[error("invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Another construction error, raised by a validator with a logging key.
    #[error("{logging_key}: {source}")]
    Keyed {
        logging_key: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    pub(crate) fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the error with `logging_key`; an empty key leaves it as is.
    pub(crate) fn keyed(self, logging_key: &str) -> Self {
        if logging_key.is_empty() {
            return self;
        }
        ConfigError::Keyed {
            logging_key: logging_key.to_string(),
            source: Box::new(self),
        }
    }

    /// The underlying error, without any logging key.
    pub fn kind(&self) -> &ConfigError {
        match self {
            ConfigError::Keyed { source, .. } => source.kind(),
            other => other,
        }
    }
}
