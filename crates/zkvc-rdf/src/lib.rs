#![deny(missing_docs)]

//! # zkvc-rdf — JSON-LD to Canonical RDF for Merklization
//!
//! The default implementation of the RDF normalization boundary: a JSON-LD
//! document goes in, a URDNA2015-canonical quad set comes out. Consumers
//! depend only on this crate's own quad model and on the
//! [`Normalizer`]/[`DocumentLoader`] traits, so the whole layer is
//! swappable without touching the merklization core.
//!
//! ## Pipeline
//!
//! 1. **Context processing** ([`context`]) — term definitions, prefixes,
//!    `@vocab`, keyword aliases, protected terms, scoped contexts; remote
//!    contexts resolve through the injected [`DocumentLoader`] only.
//! 2. **Expansion** ([`expand`]) — compacted documents become expanded
//!    node objects with absolute IRIs and explicit value objects.
//! 3. **RDF conversion** ([`to_rdf`]) — expanded nodes become quads;
//!    `@list` arrays become `rdf:first`/`rdf:rest` chains; native JSON
//!    numbers take their canonical XSD lexical forms.
//! 4. **Canonicalization** ([`normalize`]) — URDNA2015 over SHA-256:
//!    stable blank-node labels (`c14n0`…) and a total quad order.
//!
//! The library never touches the network: every remote reference goes
//! through the loader the caller injects, and the default loader denies
//! all fetches.

pub mod context;
pub mod error;
pub mod expand;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod normalizer;
pub mod nquads;
pub mod to_rdf;
pub mod vocab;

// Re-export primary types.
pub use error::{JsonLdError, NormalizationError};
pub use loader::{DenyLoader, DocumentLoader, StaticLoader};
pub use model::{GraphName, Literal, Quad, Subject, Term};
pub use normalizer::{Normalizer, UrdnaNormalizer};
