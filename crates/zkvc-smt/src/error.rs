//! # Tree Error Types
//!
//! Structured errors for sparse Merkle tree operations, built with
//! `thiserror`. Storage failures pass through unchanged.

use thiserror::Error;
use zkvc_crypto::HashError;

/// An error surfaced by a pluggable [`NodeStorage`](crate::NodeStorage)
/// backend.
#[derive(Error, Debug)]
#[error("storage failure: {0}")]
pub struct StorageError(pub String);

/// Errors from sparse Merkle tree operations.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Every level of the tree down to the configured depth is occupied
    /// along the key's bit path.
    #[error("tree depth {0} exhausted")]
    TreeFull(u64),

    /// A leaf bound to the same key already exists.
    #[error("an entry with this key already exists")]
    KeyExists,

    /// A node hash referenced by its parent is missing from storage.
    #[error("node {0} missing from storage")]
    NodeMissing(String),

    /// The underlying hasher failed.
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// The pluggable storage backend failed; surfaced unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
