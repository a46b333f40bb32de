//! Content-Type parsing and request body media type selection.
//!
//! [`ContentType::parse`] follows the RFC 7231 `media-type` grammar:
//! `type "/" subtype *( OWS ";" OWS parameter )`, where parameter values are
//! tokens or quoted strings. [`match_media_type`] picks which declared
//! request body media type a request's Content-Type selects.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::logger::Logger;

const TOKEN: &str = r"[!#$%&'*+.^_`|~0-9A-Za-z-]+";

static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{TOKEN}/{TOKEN}$")).expect("media type pattern is valid"));

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    let quoted = r#""(?:[\x0b\x20\x21\x23-\x5b\x5d-\x7e\x80-\xff]|\\[\x0b\x20-\xff])*""#;
    Regex::new(&format!("^; *({TOKEN}) *= *({quoted}|{TOKEN}) *"))
        .expect("media type parameter pattern is valid")
});

static QUOTED_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([\x0b\x20-\xff])").expect("quoted escape pattern is valid"));

/// Errors raised by [`ContentType::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaTypeError {
    /// The `type/subtype` part is malformed.
    #[error("invalid media type")]
    InvalidMediaType,

    /// A `; name=value` parameter is malformed.
    #[error("invalid parameter format")]
    InvalidParameterFormat,
}

/// A parsed Content-Type header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    media_type: String,
    parameters: IndexMap<String, String>,
}

impl ContentType {
    /// Parses a Content-Type header value.
    ///
    /// The media type and parameter names are lower-cased; parameter values
    /// keep their case, with quotes and escapes removed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use openapi_request_validator::ContentType;
    ///
    /// let parsed = ContentType::parse("Application/JSON; charset=\"utf-8\"").unwrap();
    /// assert_eq!(parsed.media_type(), "application/json");
    /// assert_eq!(parsed.parameter("charset"), Some("utf-8"));
    /// ```
    pub fn parse(header: &str) -> Result<Self, MediaTypeError> {
        let split = header.find(';');
        let media_type = match split {
            Some(index) => header[..index].trim(),
            None => header.trim(),
        };
        if !TYPE_RE.is_match(media_type) {
            return Err(MediaTypeError::InvalidMediaType);
        }

        let mut parameters = IndexMap::new();
        if let Some(mut index) = split {
            while index < header.len() {
                let captures = PARAM_RE
                    .captures(&header[index..])
                    .ok_or(MediaTypeError::InvalidParameterFormat)?;
                let (Some(whole), Some(name), Some(value)) =
                    (captures.get(0), captures.get(1), captures.get(2))
                else {
                    return Err(MediaTypeError::InvalidParameterFormat);
                };
                index += whole.end();

                let value = value.as_str();
                let value = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                    Some(quoted) => QUOTED_ESCAPE_RE.replace_all(quoted, "$1").into_owned(),
                    None => value.to_string(),
                };
                parameters.insert(name.as_str().to_ascii_lowercase(), value);
            }
        }

        Ok(Self {
            media_type: media_type.to_ascii_lowercase(),
            parameters,
        })
    }

    /// Returns the lower-cased `type/subtype`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the primary type, e.g. `application`.
    pub fn primary_type(&self) -> &str {
        self.media_type.split('/').next().unwrap_or_default()
    }

    /// Returns a parameter value by lower-cased name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns the generic form of a structured syntax suffix type, e.g.
    /// `application/json` for `application/vnd.api+json`.
    pub fn suffix_base(&self) -> Option<String> {
        let (primary, subtype) = self.media_type.split_once('/')?;
        let (_, suffix) = subtype.rsplit_once('+')?;
        if suffix.is_empty() {
            return None;
        }
        Some(format!("{primary}/{suffix}"))
    }
}

const FULL_WILDCARD_POINTS: u8 = 1;
const SUBTYPE_WILDCARD_POINTS: u8 = 2;

/// Selects the declared media type a Content-Type header matches.
///
/// Declared keys are visited in order. A key containing the parsed media
/// type, or equal to its structured syntax suffix base, is returned at once.
/// Otherwise the best wildcard wins: `type/*` with the same primary type
/// beats `*/*`, and among equals the first declared is kept.
///
/// A header without a valid `type/subtype` is logged and treated as absent.
///
/// # Errors
///
/// Returns `MediaTypeError::InvalidParameterFormat` for a header whose
/// parameters cannot be parsed.
pub fn match_media_type<'c, V>(
    header: Option<&str>,
    content: &'c IndexMap<String, V>,
    logger: &dyn Logger,
    logging_key: &str,
) -> Result<Option<&'c str>, MediaTypeError> {
    let Some(header) = header else {
        return Ok(None);
    };

    let content_type = match ContentType::parse(header) {
        Ok(content_type) => content_type,
        Err(err) => {
            logger.warn(
                logging_key,
                &format!("failed to parse content-type {}: {}", header, err),
            );
            return match err {
                MediaTypeError::InvalidMediaType => Ok(None),
                other => Err(other),
            };
        }
    };

    let media_type = content_type.media_type();
    let suffix_base = content_type.suffix_base();
    let primary_type = content_type.primary_type();

    let mut best: Option<(&'c str, u8)> = None;
    for key in content.keys() {
        if key.contains(media_type) || suffix_base.as_deref() == Some(key.as_str()) {
            return Ok(Some(key.as_str()));
        }

        let points = match key.split_once('/') {
            _ if key == "*/*" => FULL_WILDCARD_POINTS,
            Some((primary, "*")) if primary == primary_type => SUBTYPE_WILDCARD_POINTS,
            _ => continue,
        };
        if best.map_or(true, |(_, current)| points > current) {
            best = Some((key.as_str(), points));
        }
    }

    Ok(best.map(|(key, _)| key))
}
