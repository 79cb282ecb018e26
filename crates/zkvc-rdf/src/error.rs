//! # RDF Layer Error Types
//!
//! Structured errors for JSON-LD processing and canonicalization, built
//! with `thiserror`.

use thiserror::Error;

/// Errors from JSON-LD parsing, context processing, expansion and RDF
/// conversion.
#[derive(Error, Debug)]
pub enum JsonLdError {
    /// The document is not processable JSON-LD.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A context (inline or remote) could not be processed.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// A remote context could not be resolved through the loader.
    #[error("context resolution failed for {url}: {reason}")]
    ContextResolution {
        /// The context URL that failed.
        url: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The injected document loader refused the fetch.
    #[error("document loader refused {0}")]
    LoaderDenied(String),

    /// A protected term was redefined with a different mapping.
    #[error("protected term {term} redefined")]
    ProtectedTerm {
        /// The term whose protected definition was overridden.
        term: String,
    },

    /// A cycle was detected while resolving remote or term definitions.
    #[error("cyclic definition involving {0}")]
    CyclicDefinition(String),
}

/// Errors from URDNA2015 canonicalization.
#[derive(Error, Debug)]
pub enum NormalizationError {
    /// The canonicalization algorithm could not label the dataset.
    #[error("canonicalization failed: {0}")]
    Failed(String),

    /// The upstream JSON-LD layer refused the input.
    #[error(transparent)]
    JsonLd(#[from] JsonLdError),
}
