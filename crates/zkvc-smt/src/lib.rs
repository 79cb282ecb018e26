#![deny(missing_docs)]

//! # zkvc-smt — Sparse Merkle Tree for Merklized Credentials
//!
//! A binary Merkle tree of fixed depth addressed by key bits, storing
//! (key → value) bindings of field elements. The tree supports insertion,
//! root computation, and membership / non-membership proofs that
//! zero-knowledge circuits built on the same Poseidon parameter set can
//! verify.
//!
//! ## Structure
//!
//! - A leaf binding `(key, value)` hashes as `H(key, value, 1)`; the
//!   trailing `1` separates leaves from internal nodes.
//! - An internal node hashes as `H(left, right)`.
//! - The empty subtree hashes to the canonical zero element, and the empty
//!   tree's root is zero.
//! - The key is already a Poseidon digest (of an encoded document path);
//!   its little-endian bits, up to the tree depth, address the leaf slot.
//!
//! ## Storage
//!
//! Nodes live in a [`NodeStorage`] implementation injected at construction
//! time, keyed by their own hash. [`MemoryStorage`] is the default;
//! persistent backends surface their failures unchanged through
//! [`TreeError::Storage`].

pub mod error;
pub mod node;
pub mod proof;
pub mod storage;
pub mod tree;

// Re-export primary types.
pub use error::{StorageError, TreeError};
pub use node::Node;
pub use proof::{verify_proof, Proof};
pub use storage::{MemoryStorage, NodeStorage};
pub use tree::{SparseMerkleTree, DEFAULT_DEPTH};
