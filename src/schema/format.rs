//! String formats for the `format` keyword.
//!
//! Built-in formats cover the common OpenAPI string formats. Custom formats
//! are plain predicates and take precedence over built-ins with the same
//! name. Unknown formats are ignored.

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, LazyLock};

use regex::Regex;

/// A custom format predicate.
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d\d\d\d-[0-1]\d-[0-3]\d$").expect("date pattern is valid"));

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d\d\d\d-[0-1]\d-[0-3]\d[t\s](?:[0-2]\d:[0-5]\d:[0-5]\d|23:59:60)(?:\.\d+)?(?:z|[+-]\d\d(?::?\d\d)?)$")
        .expect("date-time pattern is valid")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[0-2]\d:[0-5]\d:[0-5]\d|23:59:60)(?:\.\d+)?(?:z|[+-]\d\d(?::?\d\d)?)?$")
        .expect("time pattern is valid")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$")
        .expect("email pattern is valid")
});

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[-0-9a-z]{0,61}[0-9a-z])?)*$")
        .expect("hostname pattern is valid")
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:urn:uuid:)?[0-9a-f]{8}-(?:[0-9a-f]{4}-){3}[0-9a-f]{12}$").expect("uuid pattern is valid")
});

static URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+\-.]*:(?://)?\S*$").expect("uri pattern is valid"));

/// A compiled format check.
#[derive(Clone)]
pub(crate) enum Format {
    Pattern(&'static Regex),
    Ipv4,
    Ipv6,
    Custom(FormatFn),
}

impl Format {
    pub(crate) fn check(&self, value: &str) -> bool {
        match self {
            Format::Pattern(regex) => regex.is_match(value),
            Format::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => value.parse::<Ipv6Addr>().is_ok(),
            Format::Custom(predicate) => predicate(value),
        }
    }
}

/// Registered custom formats.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::FormatRegistry;
///
/// let formats = FormatRegistry::new()
///     .with_format("even-length", |s: &str| s.len() % 2 == 0);
///
/// assert!(formats.contains("even-length"));
/// ```
#[derive(Clone, Default)]
pub struct FormatRegistry {
    custom: HashMap<String, FormatFn>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom format and returns self for chaining.
    pub fn with_format<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.register(name, Arc::new(predicate));
        self
    }

    /// Adds a custom format, replacing any earlier one with the same name.
    pub fn register(&mut self, name: impl Into<String>, predicate: FormatFn) {
        self.custom.insert(name.into(), predicate);
    }

    /// Returns true when a custom format with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Looks up the check for `name`; `None` for unknown formats.
    pub(crate) fn lookup(&self, name: &str) -> Option<Format> {
        if let Some(predicate) = self.custom.get(name) {
            return Some(Format::Custom(Arc::clone(predicate)));
        }

        let pattern: &'static LazyLock<Regex> = match name {
            "date" => &DATE,
            "date-time" => &DATE_TIME,
            "time" => &TIME,
            "email" => &EMAIL,
            "hostname" => &HOSTNAME,
            "uuid" => &UUID,
            "uri" => &URI,
            "ipv4" => return Some(Format::Ipv4),
            "ipv6" => return Some(Format::Ipv6),
            _ => return None,
        };
        Some(Format::Pattern(LazyLock::force(pattern)))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}
