//! # Merklization Error Types
//!
//! The façade-level error hierarchy. Lower layers keep their own enums;
//! everything aggregates here with `#[from]` conversions so callers match
//! on one type.

use thiserror::Error;

use zkvc_core::CoreError;
use zkvc_crypto::HashError;
use zkvc_rdf::{JsonLdError, NormalizationError};
use zkvc_smt::TreeError;

/// Errors from the merklization pipeline.
#[derive(Error, Debug)]
pub enum MerklizeError {
    /// The input is not parseable JSON.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// JSON-LD processing failed.
    #[error("JSON-LD error: {0}")]
    JsonLd(#[from] JsonLdError),

    /// The normalization layer refused the input.
    #[error("normalization failed: {0}")]
    Normalization(#[from] NormalizationError),

    /// A node is referenced from two distinct (subject, predicate) pairs;
    /// its path cannot be qualified unambiguously.
    #[error("node {node} has more than one parent")]
    AmbiguousParent {
        /// The node with conflicting parent references.
        node: String,
    },

    /// Two identical paths carry different values.
    #[error("conflicting entries at path {path}")]
    ConflictingEntries {
        /// The colliding path.
        path: String,
    },

    /// An `xsd:*` datatype the value system does not model.
    #[error("unsupported datatype {datatype}")]
    UnsupportedDatatype {
        /// The unmodeled datatype IRI.
        datatype: String,
    },

    /// A literal's lexical form does not parse under its datatype.
    #[error("literal {value:?} is not valid {datatype}")]
    InvalidLiteral {
        /// The lexical form.
        value: String,
        /// The datatype it failed to parse under.
        datatype: String,
    },

    /// A dotted document path segment could not be resolved to an IRI.
    #[error("cannot resolve path segment {segment:?}")]
    PathSegment {
        /// The unresolvable segment.
        segment: String,
    },

    /// A foundational type operation failed (range, tag or path errors).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The hasher failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The sparse Merkle tree failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
