//! # The Relationship Map
//!
//! Flattening a quad set into fully-qualified paths needs two structures
//! derived from the canonical quads:
//!
//! - RDF lists, reassembled from their `rdf:first`/`rdf:rest` cells, so
//!   list members address by integer index instead of by cell label;
//! - a parent map: for every node that appears as both an object and a
//!   subject, the unique (subject, predicate) pair that references it,
//!   with the array index already resolved.
//!
//! A node referenced from two distinct (subject, predicate) pairs has no
//! canonical path; that document is rejected as ambiguous rather than
//! disambiguated silently.

use std::collections::{HashMap, HashSet};

use zkvc_core::PathPart;
use zkvc_rdf::{vocab, Quad, Subject, Term};

use crate::error::MerklizeError;

/// A node identifier: a named IRI or a canonical blank label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// A named node.
    Iri(String),
    /// A blank node label.
    Blank(String),
}

impl NodeId {
    /// The identifier text, for diagnostics.
    pub fn value(&self) -> &str {
        match self {
            NodeId::Iri(s) | NodeId::Blank(s) => s,
        }
    }

    /// The node id of a quad's subject.
    pub fn from_subject(subject: &Subject) -> Self {
        match subject {
            Subject::Iri(s) => NodeId::Iri(s.clone()),
            Subject::Blank(s) => NodeId::Blank(s.clone()),
        }
    }

    /// The node id of an object term, when it is a node.
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Iri(s) => Some(NodeId::Iri(s.clone())),
            Term::Blank(s) => Some(NodeId::Blank(s.clone())),
            Term::Literal(_) => None,
        }
    }
}

/// The unique parent reference of a node: which (subject, predicate)
/// points at it, and at which index when the reference is one of several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// The referencing subject.
    pub subject: NodeId,
    /// The referencing predicate.
    pub predicate: String,
    /// The position among the reference's siblings: always present for
    /// list members, present for repeated predicates, absent for an only
    /// child.
    pub index: Option<usize>,
}

/// Reassembled RDF lists.
#[derive(Debug, Default)]
pub struct Lists {
    /// List head node → member terms in list order.
    heads: HashMap<NodeId, Vec<Term>>,
    /// Every cell node of every list (their structural quads are skipped
    /// during flattening).
    cells: HashSet<NodeId>,
}

impl Lists {
    /// Reassemble lists from `rdf:first`/`rdf:rest` chains.
    pub fn build(quads: &[Quad]) -> Result<Self, MerklizeError> {
        let mut firsts: HashMap<NodeId, Term> = HashMap::new();
        let mut rests: HashMap<NodeId, Term> = HashMap::new();
        let mut rest_targets: HashSet<NodeId> = HashSet::new();

        for quad in quads {
            let subject = NodeId::from_subject(&quad.subject);
            match quad.predicate.as_str() {
                vocab::RDF_FIRST => {
                    firsts.insert(subject, quad.object.clone());
                }
                vocab::RDF_REST => {
                    if let Some(target) = NodeId::from_term(&quad.object) {
                        if !matches!(&quad.object, Term::Iri(iri) if iri == vocab::RDF_NIL) {
                            rest_targets.insert(target);
                        }
                    }
                    rests.insert(subject, quad.object.clone());
                }
                _ => {}
            }
        }

        let mut lists = Lists::default();
        for cell in firsts.keys() {
            lists.cells.insert(cell.clone());
        }

        for head in firsts.keys().filter(|c| !rest_targets.contains(c)) {
            let mut members = Vec::new();
            let mut cursor = head.clone();
            let mut visited: HashSet<NodeId> = HashSet::new();
            loop {
                if !visited.insert(cursor.clone()) {
                    return Err(MerklizeError::AmbiguousParent {
                        node: cursor.value().to_string(),
                    });
                }
                let Some(first) = firsts.get(&cursor) else {
                    break;
                };
                members.push(first.clone());
                match rests.get(&cursor) {
                    Some(Term::Iri(iri)) if iri == vocab::RDF_NIL => break,
                    Some(rest) => match NodeId::from_term(rest) {
                        Some(next) => cursor = next,
                        None => break,
                    },
                    None => break,
                }
            }
            lists.heads.insert(head.clone(), members);
        }
        Ok(lists)
    }

    /// The member terms of a list, when `node` is a list head.
    pub fn members(&self, node: &NodeId) -> Option<&[Term]> {
        self.heads.get(node).map(Vec::as_slice)
    }

    /// Whether `node` is a cell of some list.
    pub fn is_cell(&self, node: &NodeId) -> bool {
        self.cells.contains(node)
    }
}

/// Parent links and (subject, predicate) reference counts for the quad
/// set.
#[derive(Debug)]
pub struct Relationship {
    parents: HashMap<NodeId, ParentLink>,
    counts: HashMap<(NodeId, String), usize>,
}

impl Relationship {
    /// Build the relationship map. Quad order is the canonical dataset
    /// order; indices follow it.
    pub fn build(quads: &[Quad], lists: &Lists) -> Result<Self, MerklizeError> {
        // Nodes that occur as subjects of non-structural quads can carry
        // children and need parent links.
        let mut subject_set: HashSet<NodeId> = HashSet::new();
        for quad in quads {
            let subject = NodeId::from_subject(&quad.subject);
            if !lists.is_cell(&subject) {
                subject_set.insert(subject);
            }
        }

        let mut counts: HashMap<(NodeId, String), usize> = HashMap::new();
        for quad in quads {
            let subject = NodeId::from_subject(&quad.subject);
            if lists.is_cell(&subject) {
                continue;
            }
            *counts
                .entry((subject, quad.predicate.clone()))
                .or_insert(0) += 1;
        }

        let mut rel = Relationship {
            parents: HashMap::new(),
            counts,
        };

        let mut positions: HashMap<(NodeId, String), usize> = HashMap::new();
        for quad in quads {
            let subject = NodeId::from_subject(&quad.subject);
            if lists.is_cell(&subject) {
                continue;
            }
            let key = (subject.clone(), quad.predicate.clone());
            let position = {
                let slot = positions.entry(key.clone()).or_insert(0);
                let current = *slot;
                *slot += 1;
                current
            };
            let multiple = rel.counts[&key] > 1;

            let Some(object) = NodeId::from_term(&quad.object) else {
                continue;
            };

            if let Some(members) = lists.members(&object) {
                // Members of a list always carry their index.
                for (i, member) in members.iter().enumerate() {
                    let Some(member_id) = NodeId::from_term(member) else {
                        continue;
                    };
                    if !subject_set.contains(&member_id) {
                        continue;
                    }
                    rel.link(
                        member_id,
                        ParentLink {
                            subject: subject.clone(),
                            predicate: quad.predicate.clone(),
                            index: Some(i),
                        },
                    )?;
                }
                continue;
            }

            if !subject_set.contains(&object) {
                continue;
            }
            rel.link(
                object,
                ParentLink {
                    subject: subject.clone(),
                    predicate: quad.predicate.clone(),
                    index: if multiple { Some(position) } else { None },
                },
            )?;
        }

        Ok(rel)
    }

    fn link(&mut self, node: NodeId, parent: ParentLink) -> Result<(), MerklizeError> {
        if let Some(existing) = self.parents.get(&node) {
            if existing.subject != parent.subject || existing.predicate != parent.predicate {
                return Err(MerklizeError::AmbiguousParent {
                    node: node.value().to_string(),
                });
            }
            // The same (subject, predicate) referencing a node twice keeps
            // the first position.
            return Ok(());
        }
        self.parents.insert(node, parent);
        Ok(())
    }

    /// The parent link of a node, if it has one.
    pub fn parent(&self, node: &NodeId) -> Option<&ParentLink> {
        self.parents.get(node)
    }

    /// How many quads share a (subject, predicate) pair.
    pub fn count(&self, subject: &NodeId, predicate: &str) -> usize {
        self.counts
            .get(&(subject.clone(), predicate.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// The fully-qualified path prefix of a subject: the chain of parent
    /// predicates (with indices) from a parentless root down to `node`.
    pub fn path_to_root(&self, node: &NodeId) -> Result<Vec<PathPart>, MerklizeError> {
        let mut parts: Vec<PathPart> = Vec::new();
        let mut cursor = node.clone();
        let mut visited: HashSet<NodeId> = HashSet::new();
        while let Some(link) = self.parents.get(&cursor) {
            if !visited.insert(cursor.clone()) {
                return Err(MerklizeError::AmbiguousParent {
                    node: cursor.value().to_string(),
                });
            }
            if let Some(i) = link.index {
                parts.push(PathPart::Index(i));
            }
            parts.push(PathPart::Iri(link.predicate.clone()));
            cursor = link.subject.clone();
        }
        parts.reverse();
        Ok(parts)
    }
}
