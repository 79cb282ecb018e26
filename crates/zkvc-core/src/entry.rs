//! # Flattened Document Entries
//!
//! An [`RdfEntry`] is one leaf of a flattened JSON-LD document: a
//! fully-qualified [`Path`] bound to a [`TypedValue`]. Entries within one
//! flattened document are unique on path.

use crate::path::Path;
use crate::value::TypedValue;

/// One (path, value) leaf produced by the graph flattener.
#[derive(Debug, Clone, PartialEq)]
pub struct RdfEntry {
    path: Path,
    value: TypedValue,
}

impl RdfEntry {
    /// Bind a value to a path.
    pub fn new(path: Path, value: TypedValue) -> Self {
        Self { path, value }
    }

    /// The fully-qualified path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The typed leaf value.
    pub fn value(&self) -> &TypedValue {
        &self.value
    }

    /// Split into the owned pair.
    pub fn into_parts(self) -> (Path, TypedValue) {
        (self.path, self.value)
    }
}
