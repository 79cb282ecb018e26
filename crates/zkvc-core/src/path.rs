//! # Document Paths
//!
//! A [`Path`] addresses one leaf of a JSON-LD document after flattening:
//! an ordered sequence of absolute IRIs and integer array-indices, fully
//! qualified from a named root down to the leaf predicate.
//!
//! Paths produced by the flattener never begin with an index; indices only
//! appear after the predicate that owns the array.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One step of a [`Path`]: an absolute IRI or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathPart {
    /// An absolute IRI (a predicate, or a fully-qualified term).
    Iri(String),
    /// A zero-based index into an RDF list or repeated predicate.
    Index(usize),
}

impl PathPart {
    fn variant_rank(&self) -> u8 {
        // Strings sort before integers when variants differ.
        match self {
            PathPart::Iri(_) => 0,
            PathPart::Index(_) => 1,
        }
    }
}

impl PartialOrd for PathPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PathPart::Iri(a), PathPart::Iri(b)) => a.as_bytes().cmp(b.as_bytes()),
            (PathPart::Index(a), PathPart::Index(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl From<&str> for PathPart {
    fn from(s: &str) -> Self {
        PathPart::Iri(s.to_string())
    }
}

impl From<String> for PathPart {
    fn from(s: String) -> Self {
        PathPart::Iri(s)
    }
}

impl From<usize> for PathPart {
    fn from(i: usize) -> Self {
        PathPart::Index(i)
    }
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Iri(s) => write!(f, "{s}"),
            PathPart::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A fully-qualified address of one leaf inside a flattened document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    parts: Vec<PathPart>,
}

impl Path {
    /// Build a path from parts. Fails on an empty sequence — a leaf path
    /// always has at least its predicate.
    pub fn new<I, P>(parts: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathPart>,
    {
        let parts: Vec<PathPart> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(CoreError::InvalidPath("a path must be non-empty".to_string()));
        }
        Ok(Self { parts })
    }

    /// Build a path from already-typed parts without the emptiness check.
    /// Used by the flattener while a path is still being assembled.
    pub fn from_parts(parts: Vec<PathPart>) -> Self {
        Self { parts }
    }

    /// The parts, root-first.
    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the path has no parts yet.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Append a part at the leaf end.
    pub fn push(&mut self, part: impl Into<PathPart>) {
        self.parts.push(part.into());
    }

    /// Insert parts at the root end, preserving their order.
    pub fn prepend(&mut self, parts: Vec<PathPart>) {
        let mut combined = parts;
        combined.append(&mut self.parts);
        self.parts = combined;
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", rendered.join(" :: "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty() {
        let parts: Vec<PathPart> = vec![];
        assert!(Path::new(parts).is_err());
    }

    #[test]
    fn new_accepts_mixed_parts() {
        let p = Path::new(vec![
            PathPart::from("https://example.com/ns#subject"),
            PathPart::from(1usize),
            PathPart::from("https://example.com/ns#name"),
        ])
        .unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.parts()[1], PathPart::Index(1));
    }

    #[test]
    fn iri_parts_order_as_utf8_bytes() {
        let a = PathPart::from("http://schema.org/birthDate");
        let b = PathPart::from("http://schema.org/familyName");
        assert!(a < b);
    }

    #[test]
    fn index_parts_order_numerically() {
        assert!(PathPart::from(2usize) < PathPart::from(10usize));
    }

    #[test]
    fn iri_sorts_before_index() {
        let iri = PathPart::from("zzz");
        let idx = PathPart::from(0usize);
        assert!(iri < idx);
    }

    #[test]
    fn prefix_sorts_before_extension() {
        let short = Path::new(vec![PathPart::from("a")]).unwrap();
        let long = Path::new(vec![PathPart::from("a"), PathPart::from(0usize)]).unwrap();
        assert!(short < long);
    }

    #[test]
    fn prepend_keeps_order() {
        let mut p = Path::new(vec![PathPart::from("leaf")]).unwrap();
        p.prepend(vec![PathPart::from("root"), PathPart::from(3usize)]);
        assert_eq!(
            p.parts(),
            &[
                PathPart::from("root"),
                PathPart::from(3usize),
                PathPart::from("leaf"),
            ]
        );
    }

    #[test]
    fn display_joins_with_separator() {
        let p = Path::new(vec![PathPart::from("a"), PathPart::from(7usize)]).unwrap();
        assert_eq!(p.to_string(), "a :: 7");
    }
}
