//! Data paths for locating values inside a validated request.
//!
//! This module provides [`JsonPath`] and [`PathSegment`]. A path renders in
//! the familiar "data path" notation used by JSON Schema validators:
//! `.body.users[0].email`, with non-identifier keys quoted as `['x-api-key']`.

use std::fmt::{self, Display};

/// A segment of a data path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A property access (e.g. `user`, `x-api-key`)
    Field(String),
    /// An array index access (e.g. `[0]`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// A path to a value in a nested JSON structure.
///
/// Paths are immutable; `push_*` returns a new path.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::JsonPath;
///
/// let path = JsonPath::root()
///     .push_field("body")
///     .push_field("users")
///     .push_index(0)
///     .push_field("x-id");
///
/// assert_eq!(path.to_string(), ".body.users[0]['x-id']");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the validated value itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns the name of the last field segment, if the path ends in one.
    pub fn last_field(&self) -> Option<&str> {
        match self.segments.last() {
            Some(PathSegment::Field(name)) => Some(name),
            _ => None,
        }
    }
}

/// Returns true when `name` can be written as `.name` rather than `['name']`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) if is_identifier(name) => write!(f, ".{}", name)?,
                PathSegment::Field(name) => {
                    write!(f, "['{}']", name.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = JsonPath::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_fields_render_with_leading_dot() {
        let path = JsonPath::root().push_field("body").push_field("name");
        assert_eq!(path.to_string(), ".body.name");
    }

    #[test]
    fn test_index_renders_in_brackets() {
        let path = JsonPath::from_field("tags").push_index(3);
        assert_eq!(path.to_string(), ".tags[3]");
    }

    #[test]
    fn test_non_identifier_keys_are_quoted() {
        let path = JsonPath::root().push_field("x-api-key");
        assert_eq!(path.to_string(), "['x-api-key']");

        let path = JsonPath::root().push_field("1st");
        assert_eq!(path.to_string(), "['1st']");

        let path = JsonPath::root().push_field("it's");
        assert_eq!(path.to_string(), "['it\\'s']");
    }

    #[test]
    fn test_path_immutability() {
        let base = JsonPath::root().push_field("users");
        let path_a = base.push_index(0);
        let path_b = base.push_index(1);

        assert_eq!(base.to_string(), ".users");
        assert_eq!(path_a.to_string(), ".users[0]");
        assert_eq!(path_b.to_string(), ".users[1]");
    }

    #[test]
    fn test_last_field() {
        let path = JsonPath::root().push_field("pet").push_field("id");
        assert_eq!(path.last_field(), Some("id"));

        let path = path.push_index(2);
        assert_eq!(path.last_field(), None);
        assert_eq!(path.last(), Some(&PathSegment::Index(2)));
        assert_eq!(JsonPath::root().last_field(), None);
    }

    #[test]
    fn test_segments_iterator() {
        let path = JsonPath::root()
            .push_field("a")
            .push_index(1)
            .push_field("b");

        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], &PathSegment::field("a"));
        assert_eq!(segments[1], &PathSegment::index(1));
        assert_eq!(segments[2], &PathSegment::field("b"));
    }
}
