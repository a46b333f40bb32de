//! Keyword readers and JSON value helpers shared by the compilers.

use serde_json::{Map, Value};

use super::CompileError;

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "string" => Some(JsonType::String),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    /// Returns true when `value` is an instance of this type.
    ///
    /// Integers are numbers without a fractional part, so `1.0` is an integer.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (JsonType::Null, Value::Null) => true,
            (JsonType::Boolean, Value::Bool(_)) => true,
            (JsonType::Number, Value::Number(_)) => true,
            (JsonType::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            (JsonType::String, Value::String(_)) => true,
            (JsonType::Array, Value::Array(_)) => true,
            (JsonType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Reads the `type` keyword, which may be a name or a list of names.
    pub(crate) fn compile(keywords: &Map<String, Value>) -> Result<Option<Vec<Self>>, CompileError> {
        let names: Vec<&Value> = match keywords.get("type") {
            None => return Ok(None),
            Some(Value::Array(names)) => names.iter().collect(),
            Some(name) => vec![name],
        };

        names
            .into_iter()
            .map(|name| {
                name.as_str()
                    .and_then(JsonType::parse)
                    .ok_or_else(|| CompileError::invalid_keyword("type", format!("unknown type {}", name)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Deep equality where numbers compare by value, so `1` equals `1.0`.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

/// Reads a non-negative integer keyword such as `minLength`.
pub(crate) fn usize_keyword(
    keywords: &Map<String, Value>,
    name: &str,
) -> Result<Option<usize>, CompileError> {
    match keywords.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| CompileError::invalid_keyword(name, "must be a non-negative integer")),
    }
}

/// Reads a numeric keyword such as `minimum`, keeping the original value for messages.
pub(crate) fn number_keyword(
    keywords: &Map<String, Value>,
    name: &str,
) -> Result<Option<(f64, Value)>, CompileError> {
    match keywords.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(|n| Some((n, value.clone())))
            .ok_or_else(|| CompileError::invalid_keyword(name, "must be a number")),
    }
}

/// Reads a boolean keyword, treating absence as `false`.
pub(crate) fn flag_keyword(keywords: &Map<String, Value>, name: &str) -> bool {
    keywords.get(name).and_then(Value::as_bool).unwrap_or(false)
}
