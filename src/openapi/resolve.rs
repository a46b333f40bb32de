//! Request body reference resolution.
//!
//! [`resolve_request_body`] rebuilds a request body schema with its
//! reachable `$ref`s replaced by sanitized copies of their targets. The
//! input is never modified. References the registry does not know are left
//! in place for the schema compiler to report, and so are references that
//! would expand into themselves; the compiler bounds their recursion.

use serde_json::Value;

use crate::registry::SchemaRegistry;

use super::sanitize::sanitize_read_only;

/// Resolves and sanitizes a request body schema.
///
/// Keywords are tried in the order `properties`, `$ref`, `items`, `allOf`,
/// `oneOf`, `anyOf`; only the first one present is expanded.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::{openapi::resolve_request_body, SchemaRegistry};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register(
///         "#/components/schemas/Pet",
///         json!({
///             "properties": {"id": {"readOnly": true}, "name": {"type": "string"}},
///             "required": ["id", "name"]
///         }),
///     )
///     .unwrap();
///
/// let resolved = resolve_request_body(&json!({"$ref": "#/components/schemas/Pet"}), &registry);
/// assert_eq!(resolved["required"], json!(["name"]));
/// ```
pub fn resolve_request_body(schema: &Value, registry: &SchemaRegistry) -> Value {
    let mut resolver = Resolver {
        registry,
        chain: Vec::new(),
    };
    resolver.resolve(sanitize_read_only(schema.clone()))
}

struct Resolver<'a> {
    registry: &'a SchemaRegistry,
    /// References currently being expanded, outermost first.
    chain: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, mut node: Value) -> Value {
        let Some(keywords) = node.as_object_mut() else {
            return node;
        };

        if let Some(Value::Object(properties)) = keywords.get_mut("properties") {
            for property in properties.values_mut() {
                let sanitized = sanitize_read_only(property.take());
                *property = if sanitized.get("$ref").is_some() || sanitized.get("items").is_some() {
                    sanitized
                } else {
                    self.resolve(sanitized)
                };
            }
            return node;
        }
        if keywords.contains_key("properties") {
            return node;
        }

        if let Some(reference) = keywords.get("$ref").and_then(Value::as_str) {
            let reference = reference.to_string();
            return self.expand(&reference).unwrap_or(node);
        }

        if let Some(items) = keywords.get_mut("items") {
            let reference = items.get("$ref").and_then(Value::as_str).map(str::to_string);
            if let Some(resolved) = reference.and_then(|reference| self.expand(&reference)) {
                *items = resolved;
            }
            return node;
        }

        for combinator in ["allOf", "oneOf", "anyOf"] {
            if let Some(members) = keywords.get_mut(combinator) {
                if let Value::Array(members) = members {
                    for member in members.iter_mut() {
                        *member = self.resolve(sanitize_read_only(member.take()));
                    }
                }
                return node;
            }
        }

        node
    }

    /// Replaces a reference by a resolved copy of its target, or `None` when
    /// the reference must stay in place.
    fn expand(&mut self, reference: &str) -> Option<Value> {
        let Some(target) = self.registry.lookup(reference) else {
            tracing::trace!(reference, "leaving unknown reference for the compiler");
            return None;
        };

        if self.chain.iter().any(|open| open == reference) {
            tracing::trace!(reference, chain = ?self.chain, "leaving recursive reference for the compiler");
            return None;
        }

        self.chain.push(reference.to_string());
        let resolved = self.resolve(sanitize_read_only(target));
        self.chain.pop();
        Some(resolved)
    }
}
