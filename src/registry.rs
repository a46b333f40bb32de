//! Schema registry for named schema documents and reference lookup.
//!
//! This module provides the [`SchemaRegistry`] type that stores raw JSON
//! Schema documents under an id and resolves `$ref` strings against them.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Type alias for the document storage map.
type DocumentMap = Arc<RwLock<HashMap<String, Arc<Value>>>>;

/// A thread-safe registry of JSON Schema documents keyed by id.
///
/// Ids are free-form strings; OpenAPI component schemas are conventionally
/// registered as `#/components/schemas/<Name>`.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>`:
/// - Many threads can look up documents concurrently (read access)
/// - Registration operations are serialized (write access)
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::SchemaRegistry;
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register("#/components/schemas/Pet", json!({"type": "object"}))
///     .unwrap();
///
/// assert!(registry.lookup("#/components/schemas/Pet").is_some());
/// assert!(registry.lookup("#/components/schemas/Owner").is_none());
/// ```
pub struct SchemaRegistry {
    documents: DocumentMap,
}

impl SchemaRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a schema document under the given id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateId` if the id is already registered.
    pub fn register(&self, id: impl Into<String>, schema: Value) -> Result<(), RegistryError> {
        let id = id.into();
        let mut documents = self.documents.write();

        if documents.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }

        documents.insert(id, Arc::new(schema));
        Ok(())
    }

    /// Retrieves a document by its exact id.
    pub fn get(&self, id: &str) -> Option<Arc<Value>> {
        self.documents.read().get(id).cloned()
    }

    /// Returns true when a document with this exact id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.documents.read().contains_key(id)
    }

    /// Returns the number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Looks up a reference without any document context.
    ///
    /// Tries the exact id first, then `<id>#<json pointer>` into a registered
    /// document.
    pub fn lookup(&self, reference: &str) -> Option<Value> {
        if let Some(document) = self.get(reference) {
            return Some((*document).clone());
        }

        let (base, fragment) = split_reference(reference)?;
        let document = self.get(base)?;
        document.pointer(fragment).cloned()
    }

    /// Resolves a reference relative to the document it appears in.
    ///
    /// Resolution order:
    /// 1. a document registered under the exact reference string
    /// 2. `#/pointer` into the current document
    /// 3. `<id>#/pointer` into a registered document
    ///
    /// Returns the canonical key of the target, the document that becomes
    /// current for nested references, and the target schema itself.
    pub(crate) fn resolve(&self, reference: &str, current: &Document) -> Option<ResolvedRef> {
        if let Some(root) = self.get(reference) {
            let target = (*root).clone();
            return Some(ResolvedRef {
                key: reference.to_string(),
                document: Document::registered(reference, root),
                target,
            });
        }

        if let Some(pointer) = reference.strip_prefix('#') {
            let target = current.root.pointer(pointer)?.clone();
            let key = format!("{}{}", current.id.as_deref().unwrap_or_default(), reference);
            return Some(ResolvedRef {
                key,
                document: current.clone(),
                target,
            });
        }

        let (base, fragment) = split_reference(reference)?;
        let root = self.get(base)?;
        let target = root.pointer(fragment)?.clone();
        Some(ResolvedRef {
            key: reference.to_string(),
            document: Document::registered(base, root),
            target,
        })
    }
}

/// Splits `base#fragment` into its parts; `None` without a non-empty base.
fn split_reference(reference: &str) -> Option<(&str, &str)> {
    let (base, fragment) = reference.split_once('#')?;
    if base.is_empty() {
        None
    } else {
        Some((base, fragment))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

/// A schema document that `#/...` pointers resolve against.
#[derive(Debug, Clone)]
pub(crate) struct Document {
    pub(crate) id: Option<String>,
    pub(crate) root: Arc<Value>,
}

impl Document {
    pub(crate) fn anonymous(root: Value) -> Self {
        Self {
            id: None,
            root: Arc::new(root),
        }
    }

    fn registered(id: &str, root: Arc<Value>) -> Self {
        Self {
            id: Some(id.to_string()),
            root,
        }
    }
}

/// A successfully resolved reference.
pub(crate) struct ResolvedRef {
    pub(crate) key: String,
    pub(crate) document: Document,
    pub(crate) target: Value,
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema under an id that already exists.
    #[error("schema with key or id \"{0}\" already exists")]
    DuplicateId(String),
}
