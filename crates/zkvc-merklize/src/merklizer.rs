//! # The Merklizer Façade
//!
//! Ties the pipeline together: normalize → flatten → encode → insert, and
//! serves roots, proofs and document-path resolution from the built
//! handle.
//!
//! Every capability is injected through [`MerklizeOptions`]; the defaults
//! are the Poseidon hasher, the in-workspace URDNA2015 normalizer, and a
//! loader that refuses the network.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use zkvc_core::{FieldElement, Path, PathPart, RdfEntry, TypedValue};
use zkvc_crypto::{Hasher, PoseidonHasher};
use zkvc_rdf::context::Context;
use zkvc_rdf::{DenyLoader, DocumentLoader, Normalizer, UrdnaNormalizer};
use zkvc_smt::{MemoryStorage, Proof, SparseMerkleTree, DEFAULT_DEPTH};

use crate::encode::{path_mt_entry, value_mt_entry};
use crate::error::MerklizeError;
use crate::flatten::entries_from_quads;

/// Construction-time configuration for a [`Merklizer`].
pub struct MerklizeOptions {
    hasher: Arc<dyn Hasher>,
    loader: Arc<dyn DocumentLoader>,
    normalizer: Arc<dyn Normalizer>,
    depth: u64,
}

impl Default for MerklizeOptions {
    fn default() -> Self {
        Self {
            hasher: Arc::new(PoseidonHasher::new()),
            loader: Arc::new(DenyLoader),
            normalizer: Arc::new(UrdnaNormalizer),
            depth: DEFAULT_DEPTH,
        }
    }
}

impl MerklizeOptions {
    /// Replace the hasher.
    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Replace the document loader remote contexts resolve through.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the normalizer.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Set the tree depth.
    pub fn with_depth(mut self, depth: u64) -> Self {
        self.depth = depth;
        self
    }

    /// Merklize a JSON-LD document with this configuration.
    pub fn merklize(self, document: &str) -> Result<Merklizer, MerklizeError> {
        Merklizer::build(document, self)
    }
}

/// A merklized credential document: its source, its entry index, and the
/// sparse Merkle tree committing to every leaf.
///
/// A built handle is read-only; concurrent proof generation is safe.
pub struct Merklizer {
    source: JsonValue,
    hasher: Arc<dyn Hasher>,
    loader: Arc<dyn DocumentLoader>,
    entries: HashMap<FieldElement, RdfEntry>,
    tree: SparseMerkleTree<MemoryStorage>,
}

impl std::fmt::Debug for Merklizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Merklizer")
            .field("source", &self.source)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl Merklizer {
    /// Start configuring a merklization.
    pub fn options() -> MerklizeOptions {
        MerklizeOptions::default()
    }

    /// Merklize with the default configuration. Documents with remote
    /// contexts need [`MerklizeOptions::with_loader`].
    pub fn merklize(document: &str) -> Result<Self, MerklizeError> {
        Self::options().merklize(document)
    }

    fn build(document: &str, options: MerklizeOptions) -> Result<Self, MerklizeError> {
        let source: JsonValue = serde_json::from_str(document)
            .map_err(|e| MerklizeError::InvalidDocument(e.to_string()))?;

        let quads = options
            .normalizer
            .normalize(&source, options.loader.as_ref())?;
        let entries = entries_from_quads(&quads)?;

        let mut tree = SparseMerkleTree::with_depth(
            MemoryStorage::new(),
            options.hasher.clone(),
            options.depth,
        );
        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = path_mt_entry(entry.path(), options.hasher.as_ref())?;
            let value = value_mt_entry(entry.value(), options.hasher.as_ref())?;
            tree.add(key.clone(), value)?;
            index.insert(key, entry);
        }
        debug!(
            entries = index.len(),
            root = %tree.root(),
            "merklized document"
        );

        Ok(Self {
            source,
            hasher: options.hasher,
            loader: options.loader,
            entries: index,
            tree,
        })
    }

    /// The tree root committing to the document.
    pub fn root(&self) -> &FieldElement {
        self.tree.root()
    }

    /// The hasher this merklizer encodes with.
    pub fn hasher(&self) -> &dyn Hasher {
        self.hasher.as_ref()
    }

    /// Prove (non-)membership of a path.
    ///
    /// An absent path is not an error: the proof comes back with
    /// `existence == false` and no value, and still verifies against the
    /// root as a non-membership witness.
    pub fn proof(&self, path: &Path) -> Result<(Proof, Option<TypedValue>), MerklizeError> {
        let key = path_mt_entry(path, self.hasher.as_ref())?;
        let proof = self.tree.generate_proof(&key)?;
        let value = if proof.existence {
            self.entries.get(&key).map(|e| e.value().clone())
        } else {
            None
        };
        Ok((proof, value))
    }

    /// The typed value stored at a path, if any.
    pub fn entry_value(&self, path: &Path) -> Result<Option<TypedValue>, MerklizeError> {
        let key = path_mt_entry(path, self.hasher.as_ref())?;
        Ok(self.entries.get(&key).map(|e| e.value().clone()))
    }

    /// Resolve a dotted document shortcut such as
    /// `credentialSubject.1.birthDate` into a fully-qualified [`Path`],
    /// consulting the document's contexts (including inline and
    /// type-scoped ones) at every step. Numeric segments become array
    /// indices.
    pub fn resolve_doc_path(&self, shortcut: &str) -> Result<Path, MerklizeError> {
        resolve_doc_path(&self.source, shortcut, self.loader.as_ref())
    }
}

/// Resolve a dotted shortcut against a document (see
/// [`Merklizer::resolve_doc_path`]).
pub fn resolve_doc_path(
    document: &JsonValue,
    shortcut: &str,
    loader: &dyn DocumentLoader,
) -> Result<Path, MerklizeError> {
    if shortcut.is_empty() {
        return Err(MerklizeError::PathSegment {
            segment: String::new(),
        });
    }

    let mut parts: Vec<PathPart> = Vec::new();
    let mut ctx = Context::new();
    let mut cursor: Option<&JsonValue> = Some(document);

    for segment in shortcut.split('.') {
        if let Ok(index) = segment.parse::<usize>() {
            parts.push(PathPart::Index(index));
            cursor = cursor
                .and_then(|v| v.as_array())
                .and_then(|arr| arr.get(index));
            continue;
        }

        // The node we are standing on contributes its inline context and
        // the scoped contexts of its types.
        if let Some(node) = cursor {
            ctx = apply_node_contexts(&ctx, node, loader)?;
        }

        let iri = ctx
            .expand_iri(segment, true)
            .filter(|iri| iri.contains(':'))
            .ok_or_else(|| MerklizeError::PathSegment {
                segment: segment.to_string(),
            })?;
        parts.push(PathPart::Iri(iri));

        // The term's own scoped context applies to whatever lies below.
        if let Some(scoped) = ctx.term(segment).and_then(|d| d.scoped_context.clone()) {
            ctx = ctx.parse(&scoped, loader, true)?;
        }
        cursor = cursor.and_then(|v| v.get(segment));
    }

    Ok(Path::new(parts)?)
}

/// Resolve a dotted shortcut against a standalone context document (its
/// raw JSON text), walking scoped contexts segment by segment.
pub fn path_from_context(
    context_json: &str,
    shortcut: &str,
    loader: &dyn DocumentLoader,
) -> Result<Path, MerklizeError> {
    let doc: JsonValue = serde_json::from_str(context_json)
        .map_err(|e| MerklizeError::InvalidDocument(e.to_string()))?;
    let ctx_value = doc.get("@context").cloned().ok_or_else(|| {
        MerklizeError::InvalidDocument("context document has no @context".to_string())
    })?;

    let mut ctx = Context::new().parse(&ctx_value, loader, false)?;
    let mut parts: Vec<PathPart> = Vec::new();

    for segment in shortcut.split('.') {
        if let Ok(index) = segment.parse::<usize>() {
            parts.push(PathPart::Index(index));
            continue;
        }
        let iri = ctx
            .expand_iri(segment, true)
            .filter(|iri| iri.contains(':'))
            .ok_or_else(|| MerklizeError::PathSegment {
                segment: segment.to_string(),
            })?;
        parts.push(PathPart::Iri(iri));
        if let Some(scoped) = ctx.term(segment).and_then(|d| d.scoped_context.clone()) {
            ctx = ctx.parse(&scoped, loader, true)?;
        }
    }

    Ok(Path::new(parts)?)
}

/// Merge a node's inline `@context` and the scoped contexts of its types
/// into the active context.
fn apply_node_contexts(
    ctx: &Context,
    node: &JsonValue,
    loader: &dyn DocumentLoader,
) -> Result<Context, MerklizeError> {
    let Some(map) = node.as_object() else {
        return Ok(ctx.clone());
    };

    let mut active = match map.get("@context") {
        Some(inline) => ctx.parse(inline, loader, false)?,
        None => ctx.clone(),
    };

    let mut type_terms: Vec<String> = Vec::new();
    for (key, value) in map {
        let expanded = active.expand_iri(key, true);
        if expanded.as_deref() != Some("@type") {
            continue;
        }
        match value {
            JsonValue::String(t) => type_terms.push(t.clone()),
            JsonValue::Array(items) => {
                type_terms.extend(items.iter().filter_map(|v| v.as_str().map(String::from)))
            }
            _ => {}
        }
    }
    type_terms.sort();
    for term in &type_terms {
        if let Some(scoped) = active.term(term).and_then(|d| d.scoped_context.clone()) {
            active = active.parse(&scoped, loader, true)?;
        }
    }
    Ok(active)
}
