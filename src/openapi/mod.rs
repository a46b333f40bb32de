//! Schema preparation for OpenAPI request bodies.
//!
//! A request body schema goes through three pure transformations before it
//! is compiled:
//!
//! 1. [`resolve_request_body`] dereferences it against the registry,
//!    applying [`sanitize_read_only`] to every node it expands;
//! 2. it is wrapped as `{"properties": {"body": <resolved>}}`;
//! 3. [`normalize_openapi_v3`] rewrites `nullable` into draft-04 unions.
//!
//! None of these functions modifies its input.

mod normalize;
mod resolve;
mod sanitize;

pub use normalize::normalize_openapi_v3;
pub use resolve::resolve_request_body;
pub use sanitize::sanitize_read_only;
