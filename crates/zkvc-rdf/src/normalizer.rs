//! # The Normalization Boundary
//!
//! The merklization core consumes canonical quads through the
//! [`Normalizer`] trait, never through this crate's internals, so the
//! whole JSON-LD layer can be swapped for another implementation that
//! passes the W3C canonicalization test suite.

use serde_json::Value;

use crate::error::NormalizationError;
use crate::expand::expand;
use crate::loader::DocumentLoader;
use crate::model::Quad;
use crate::normalize::canonicalize;
use crate::to_rdf::to_rdf;

/// Turns a JSON-LD document into a canonical quad set with stable blank
/// node labels and a total quad order.
pub trait Normalizer: Send + Sync {
    /// Normalize `doc`, resolving remote contexts through `loader`.
    fn normalize(
        &self,
        doc: &Value,
        loader: &dyn DocumentLoader,
    ) -> Result<Vec<Quad>, NormalizationError>;
}

/// The in-workspace default: expansion → RDF conversion → URDNA2015.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrdnaNormalizer;

impl Normalizer for UrdnaNormalizer {
    fn normalize(
        &self,
        doc: &Value,
        loader: &dyn DocumentLoader,
    ) -> Result<Vec<Quad>, NormalizationError> {
        let expanded = expand(doc, loader)?;
        let quads = to_rdf(&expanded)?;
        canonicalize(&quads)
    }
}
