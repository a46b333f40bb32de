//! Validation context for reference resolution.
//!
//! This module provides the [`ValidationContext`] type that carries the
//! compiled reference table and depth tracking during validation, so that
//! recursive schemas terminate instead of overflowing the stack.

use std::collections::HashMap;

use crate::schema::SchemaNode;

/// Compiled reference targets keyed by canonical reference.
pub(crate) type RefTable = HashMap<String, SchemaNode>;

/// Validation context carries the reference table and depth tracking.
///
/// The context is created per validation call and only borrows the compiled
/// schema's data, so concurrent calls never share mutable state.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    refs: &'a RefTable,
    depth: usize,
    max_depth: usize,
}

impl<'a> ValidationContext<'a> {
    pub(crate) fn new(refs: &'a RefTable, max_depth: usize) -> Self {
        Self {
            refs,
            depth: 0,
            max_depth,
        }
    }

    /// Creates a new context with incremented depth.
    ///
    /// Called when following a schema reference.
    pub fn increment_depth(&self) -> Self {
        Self {
            refs: self.refs,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        }
    }

    /// Returns the current depth of reference traversal.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the maximum allowed depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Looks up a compiled reference target.
    pub(crate) fn reference(&self, key: &str) -> Option<&'a SchemaNode> {
        self.refs.get(key)
    }
}
