//! Compilation of JSON Schema documents into [`CompiledSchema`]s.

use std::collections::{HashSet, VecDeque};

use serde_json::Value;

use crate::registry::{Document, ResolvedRef, SchemaRegistry};
use crate::validation::RefTable;

use super::array::ArraySchema;
use super::combinators::CombinatorSchema;
use super::format::FormatRegistry;
use super::keywords::JsonType;
use super::numeric::NumericSchema;
use super::object::ObjectSchema;
use super::ref_schema::RefSchema;
use super::string::StringSchema;
use super::{CompileError, CompiledSchema, SchemaNode};

/// Default bound on nested `$ref` hops during validation.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Compiles JSON Schema (draft-04 dialect) documents.
///
/// References are resolved against the registry while compiling, so a
/// missing reference fails here rather than at request time.
///
/// # Example
///
/// ```rust
/// use openapi_request_validator::{FormatRegistry, SchemaCompiler, SchemaRegistry};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register("#/components/schemas/Name", json!({"type": "string", "minLength": 1}))
///     .unwrap();
/// let formats = FormatRegistry::new();
///
/// let compiled = SchemaCompiler::new(&registry, &formats)
///     .compile(&json!({
///         "properties": {"name": {"$ref": "#/components/schemas/Name"}},
///         "required": ["name"]
///     }))
///     .unwrap();
///
/// assert!(compiled.is_valid(&json!({"name": "Rex"})));
/// assert!(!compiled.is_valid(&json!({"name": ""})));
/// assert!(!compiled.is_valid(&json!({})));
/// ```
pub struct SchemaCompiler<'a> {
    registry: &'a SchemaRegistry,
    formats: &'a FormatRegistry,
    max_depth: usize,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(registry: &'a SchemaRegistry, formats: &'a FormatRegistry) -> Self {
        Self {
            registry,
            formats,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum reference depth for recursive schemas.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Compiles `schema`, and every schema it references, into a validator.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnresolvedReference` for a `$ref` that the
    /// registry and the document cannot satisfy, and `InvalidPattern` or
    /// `InvalidKeyword` for malformed keywords.
    pub fn compile(&self, schema: &Value) -> Result<CompiledSchema, CompileError> {
        let mut session = CompileSession {
            registry: self.registry,
            formats: self.formats,
            refs: RefTable::new(),
            pending: VecDeque::new(),
            seen: HashSet::new(),
        };

        let document = Document::anonymous(schema.clone());
        let root = session.node(schema, &document)?;

        while let Some(ResolvedRef {
            key,
            document,
            target,
        }) = session.pending.pop_front()
        {
            let node = session.node(&target, &document)?;
            session.refs.insert(key, node);
        }

        Ok(CompiledSchema {
            root,
            refs: session.refs,
            max_depth: self.max_depth,
        })
    }
}

/// State of one `compile` call.
///
/// Reference targets are queued instead of compiled in place, which keeps
/// recursive schemas from recursing in the compiler.
pub(crate) struct CompileSession<'a> {
    registry: &'a SchemaRegistry,
    formats: &'a FormatRegistry,
    refs: RefTable,
    pending: VecDeque<ResolvedRef>,
    seen: HashSet<String>,
}

impl CompileSession<'_> {
    /// Compiles one schema node found in `document`.
    pub(crate) fn node(&mut self, schema: &Value, document: &Document) -> Result<SchemaNode, CompileError> {
        let Some(keywords) = schema.as_object() else {
            return Ok(SchemaNode::default());
        };

        // Sibling keywords of $ref are ignored
        if let Some(reference) = keywords.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| CompileError::invalid_keyword("$ref", "must be a string"))?;
            return Ok(SchemaNode::from_reference(self.reference(reference, document)?));
        }

        let formats = self.formats;
        Ok(SchemaNode {
            reference: None,
            types: JsonType::compile(keywords)?,
            enum_values: match keywords.get("enum") {
                None => None,
                Some(Value::Array(values)) => Some(values.clone()),
                Some(_) => return Err(CompileError::invalid_keyword("enum", "must be an array")),
            },
            read_only: keywords.get("readOnly") == Some(&Value::Bool(true)),
            string: StringSchema::compile(keywords, formats)?,
            numeric: NumericSchema::compile(keywords)?,
            object: ObjectSchema::compile(keywords, self, document)?,
            array: ArraySchema::compile(keywords, self, document)?,
            combinators: CombinatorSchema::compile(keywords, self, document)?,
        })
    }

    fn reference(&mut self, reference: &str, document: &Document) -> Result<RefSchema, CompileError> {
        let resolved = self
            .registry
            .resolve(reference, document)
            .ok_or_else(|| CompileError::UnresolvedReference(reference.to_string()))?;

        let schema = RefSchema::new(resolved.key.clone(), reference);
        if self.seen.insert(resolved.key.clone()) {
            self.pending.push_back(resolved);
        }
        Ok(schema)
    }
}
