#![deny(missing_docs)]

//! # zkvc-merklize — The Merklization Core
//!
//! Maps every leaf triple of a JSON-LD credential document into a sparse
//! Merkle tree whose root is a single BN254 field element, and produces
//! membership / non-membership proofs for any path inside the document.
//!
//! ## Pipeline
//!
//! 1. The injected [`Normalizer`](zkvc_rdf::Normalizer) yields a canonical
//!    quad set (URDNA2015 labels and ordering).
//! 2. The [graph flattener](flatten) qualifies every terminal object with
//!    the chain of parent subjects back to a named root, producing a
//!    sorted, duplicate-free list of [`RdfEntry`](zkvc_core::RdfEntry)
//!    values.
//! 3. The [encoders](encode) map each path and typed value injectively
//!    into the field.
//! 4. Every (key, value) pair lands in a
//!    [`SparseMerkleTree`](zkvc_smt::SparseMerkleTree); the root is the
//!    credential's commitment.
//!
//! All capabilities — hasher, document loader, normalizer, tree depth —
//! are injected through [`MerklizeOptions`]; nothing global, nothing on
//! the network.

pub mod encode;
pub mod error;
pub mod flatten;
pub mod merklizer;
pub mod relationship;

// Re-export primary types.
pub use error::MerklizeError;
pub use merklizer::{Merklizer, MerklizeOptions};
pub use zkvc_smt::{verify_proof, Proof};
