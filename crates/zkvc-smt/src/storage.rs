//! # Pluggable Node Storage
//!
//! Tree nodes are persisted through the [`NodeStorage`] capability trait,
//! keyed by their own hash. The in-memory implementation is the default;
//! persistent backends implement the same two operations and surface their
//! failures unchanged.

use std::collections::HashMap;

use zkvc_core::FieldElement;

use crate::error::StorageError;
use crate::node::Node;

/// Content-addressed node storage for the sparse Merkle tree.
pub trait NodeStorage: Send + Sync {
    /// Fetch a node by its hash. `Ok(None)` means the node is unknown.
    fn get(&self, hash: &FieldElement) -> Result<Option<Node>, StorageError>;

    /// Store a node under its hash. Re-storing the same binding is a
    /// no-op; storage is content-addressed, so a hash never maps to two
    /// different nodes.
    fn put(&mut self, hash: FieldElement, node: Node) -> Result<(), StorageError>;
}

/// In-memory node storage, the default backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: HashMap<FieldElement, Node>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeStorage for MemoryStorage {
    fn get(&self, hash: &FieldElement) -> Result<Option<Node>, StorageError> {
        Ok(self.nodes.get(hash).cloned())
    }

    fn put(&mut self, hash: FieldElement, node: Node) -> Result<(), StorageError> {
        self.nodes.insert(hash, node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let mut store = MemoryStorage::new();
        let hash = FieldElement::from_u64(7);
        let node = Node::Leaf {
            key: FieldElement::from_u64(1),
            value: FieldElement::from_u64(2),
        };
        store.put(hash.clone(), node.clone()).unwrap();
        assert_eq!(store.get(&hash).unwrap(), Some(node));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_storage_misses_return_none() {
        let store = MemoryStorage::new();
        assert!(store.get(&FieldElement::from_u64(99)).unwrap().is_none());
    }
}
