//! # URDNA2015 Canonicalization
//!
//! Deterministic blank-node labeling and total quad ordering, per the
//! W3C RDF dataset canonicalization algorithm (the URDNA2015 variant over
//! SHA-256): hash first-degree quads, issue canonical identifiers for
//! uniquely-hashed blank nodes, then disambiguate the rest with the
//! N-degree hashing procedure and its permutation search.
//!
//! The output is the input dataset with every blank node relabeled
//! `c14n0`, `c14n1`, … and the quads sorted by their canonical N-Quads
//! serialization. Consumers downstream rely on that order being total
//! and stable across runs and platforms.

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::NormalizationError;
use crate::model::{GraphName, Quad, Subject, Term};
use crate::nquads::{quad_to_nquad, quad_to_nquad_with};

/// Permutation groups beyond this size indicate a pathological dataset
/// (the search is factorial); refuse rather than spin.
const MAX_PERMUTATION_GROUP: usize = 6;

/// Canonicalize a dataset: relabel blank nodes per URDNA2015 and return
/// the quads sorted by their N-Quads serialization.
pub fn canonicalize(quads: &[Quad]) -> Result<Vec<Quad>, NormalizationError> {
    let mut state = Canonicalizer::new(quads);
    state.run()
}

/// Issues labels with a fixed prefix, remembering issue order.
#[derive(Debug, Clone)]
struct IdentifierIssuer {
    prefix: String,
    counter: usize,
    issued: HashMap<String, String>,
    order: Vec<String>,
}

impl IdentifierIssuer {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: 0,
            issued: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn issue(&mut self, id: &str) -> String {
        if let Some(existing) = self.issued.get(id) {
            return existing.clone();
        }
        let label = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        self.issued.insert(id.to_string(), label.clone());
        self.order.push(id.to_string());
        label
    }

    fn get(&self, id: &str) -> Option<&String> {
        self.issued.get(id)
    }

    fn has(&self, id: &str) -> bool {
        self.issued.contains_key(id)
    }
}

struct Canonicalizer<'a> {
    quads: &'a [Quad],
    /// Blank label → indices of quads mentioning it.
    blank_quads: HashMap<String, Vec<usize>>,
    canonical: IdentifierIssuer,
    first_degree_cache: HashMap<String, String>,
}

impl<'a> Canonicalizer<'a> {
    fn new(quads: &'a [Quad]) -> Self {
        let mut blank_quads: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, quad) in quads.iter().enumerate() {
            for label in blank_labels(quad) {
                blank_quads.entry(label.to_string()).or_default().push(i);
            }
        }
        Self {
            quads,
            blank_quads,
            canonical: IdentifierIssuer::new("c14n"),
            first_degree_cache: HashMap::new(),
        }
    }

    fn run(&mut self) -> Result<Vec<Quad>, NormalizationError> {
        // First-degree hashes, grouped.
        let labels: Vec<String> = self.blank_quads.keys().cloned().collect();
        let mut hash_groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for label in labels {
            let hash = self.hash_first_degree(&label);
            hash_groups.entry(hash).or_default().push(label);
        }
        for group in hash_groups.values_mut() {
            group.sort();
        }

        // Uniquely-hashed blank nodes take canonical labels in hash order.
        for group in hash_groups.values().filter(|g| g.len() == 1) {
            self.canonical.issue(&group[0]);
        }

        // The rest disambiguate through N-degree hashing.
        let shared: Vec<Vec<String>> = hash_groups
            .into_values()
            .filter(|g| g.len() > 1)
            .collect();
        for group in shared {
            debug!(size = group.len(), "resolving shared first-degree hash group");
            let mut results: Vec<(String, IdentifierIssuer)> = Vec::new();
            for label in &group {
                if self.canonical.has(label) {
                    continue;
                }
                let mut temp = IdentifierIssuer::new("b");
                temp.issue(label);
                results.push(self.hash_n_degree(label, temp)?);
            }
            results.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, issuer) in results {
                for label in &issuer.order {
                    self.canonical.issue(label);
                }
            }
        }

        // Relabel, sort, and collapse duplicates — a dataset is a set.
        let mut out: Vec<Quad> = self
            .quads
            .iter()
            .map(|q| self.relabel_quad(q))
            .collect();
        out.sort_by_key(quad_to_nquad);
        out.dedup();
        Ok(out)
    }

    fn relabel_quad(&self, quad: &Quad) -> Quad {
        let relabel = |label: &str| -> String {
            self.canonical
                .get(label)
                .cloned()
                .unwrap_or_else(|| label.to_string())
        };
        let mut out = quad.clone();
        if let Subject::Blank(label) = &quad.subject {
            out.subject = Subject::Blank(relabel(label));
        }
        if let Term::Blank(label) = &quad.object {
            out.object = Term::Blank(relabel(label));
        }
        if let Some(GraphName::Blank(label)) = &quad.graph {
            out.graph = Some(GraphName::Blank(relabel(label)));
        }
        out
    }

    /// Hash the quads mentioning `label`, with `label` as `_:a` and every
    /// other blank node as `_:z`.
    fn hash_first_degree(&mut self, label: &str) -> String {
        if let Some(cached) = self.first_degree_cache.get(label) {
            return cached.clone();
        }
        let mut lines: Vec<String> = self
            .blank_quads
            .get(label)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| {
                        quad_to_nquad_with(&self.quads[i], |l| {
                            if l == label { "a" } else { "z" }.to_string()
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        lines.sort();
        let hash = sha256_hex(lines.concat().as_bytes());
        self.first_degree_cache.insert(label.to_string(), hash.clone());
        hash
    }

    /// Hash one related blank node from the viewpoint of a quad position.
    fn hash_related(
        &mut self,
        related: &str,
        quad: &Quad,
        issuer: &IdentifierIssuer,
        position: char,
    ) -> String {
        let id = if let Some(c) = self.canonical.get(related) {
            format!("_:{c}")
        } else if let Some(t) = issuer.get(related) {
            format!("_:{t}")
        } else {
            self.hash_first_degree(related)
        };
        let mut input = position.to_string();
        if position != 'g' {
            input.push('<');
            input.push_str(&quad.predicate);
            input.push('>');
        }
        input.push_str(&id);
        sha256_hex(input.as_bytes())
    }

    /// The N-degree hashing procedure with its permutation search.
    fn hash_n_degree(
        &mut self,
        label: &str,
        issuer: IdentifierIssuer,
    ) -> Result<(String, IdentifierIssuer), NormalizationError> {
        // Group related blank nodes by their related-hash. The quads
        // slice outlives `self`'s borrows, so copy the reference out
        // before taking `&mut self` again below.
        let quads = self.quads;
        let indices = self.blank_quads.get(label).cloned().unwrap_or_default();
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for i in indices {
            let quad = &quads[i];
            for (related, position) in related_blank_positions(quad, label) {
                let hash = self.hash_related(&related, quad, &issuer, position);
                groups.entry(hash).or_default().push(related);
            }
        }

        let mut data_to_hash = String::new();
        let mut issuer = issuer;

        for (related_hash, group) in groups {
            data_to_hash.push_str(&related_hash);
            if group.len() > MAX_PERMUTATION_GROUP {
                return Err(NormalizationError::Failed(format!(
                    "blank node {label}: {} interconnected nodes share a hash",
                    group.len()
                )));
            }

            let mut chosen_path = String::new();
            let mut chosen_issuer: Option<IdentifierIssuer> = None;

            'permutation: for permutation in permutations(&group) {
                let mut issuer_copy = issuer.clone();
                let mut path = String::new();
                let mut recursion_list: Vec<String> = Vec::new();

                for related in &permutation {
                    if let Some(c) = self.canonical.get(related) {
                        path.push_str("_:");
                        path.push_str(c);
                    } else {
                        if !issuer_copy.has(related) {
                            recursion_list.push(related.clone());
                        }
                        let label = issuer_copy.issue(related);
                        path.push_str("_:");
                        path.push_str(&label);
                    }
                    if !chosen_path.is_empty()
                        && path.len() >= chosen_path.len()
                        && path > chosen_path
                    {
                        continue 'permutation;
                    }
                }

                for related in &recursion_list {
                    let (result_hash, result_issuer) =
                        self.hash_n_degree(related, issuer_copy.clone())?;
                    let label = issuer_copy.issue(related);
                    path.push_str("_:");
                    path.push_str(&label);
                    path.push('<');
                    path.push_str(&result_hash);
                    path.push('>');
                    issuer_copy = result_issuer;
                    if !chosen_path.is_empty()
                        && path.len() >= chosen_path.len()
                        && path > chosen_path
                    {
                        continue 'permutation;
                    }
                }

                if chosen_path.is_empty() || path < chosen_path {
                    chosen_path = path;
                    chosen_issuer = Some(issuer_copy);
                }
            }

            data_to_hash.push_str(&chosen_path);
            if let Some(chosen) = chosen_issuer {
                issuer = chosen;
            }
        }

        Ok((sha256_hex(data_to_hash.as_bytes()), issuer))
    }
}

/// The blank node labels a quad mentions.
fn blank_labels(quad: &Quad) -> Vec<&str> {
    let mut out = Vec::new();
    if let Subject::Blank(label) = &quad.subject {
        out.push(label.as_str());
    }
    if let Term::Blank(label) = &quad.object {
        out.push(label.as_str());
    }
    if let Some(GraphName::Blank(label)) = &quad.graph {
        out.push(label.as_str());
    }
    out
}

/// Related blank nodes of `quad` (those other than `label`), with their
/// position codes.
fn related_blank_positions(quad: &Quad, label: &str) -> Vec<(String, char)> {
    let mut out = Vec::new();
    if let Subject::Blank(l) = &quad.subject {
        if l != label {
            out.push((l.clone(), 's'));
        }
    }
    if let Term::Blank(l) = &quad.object {
        if l != label {
            out.push((l.clone(), 'o'));
        }
    }
    if let Some(GraphName::Blank(l)) = &quad.graph {
        if l != label {
            out.push((l.clone(), 'g'));
        }
    }
    out
}

fn permutations(items: &[String]) -> Vec<Vec<String>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let picked = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, picked.clone());
            out.push(tail);
        }
    }
    out
}

fn sha256_hex(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    fn iri(s: &str) -> Subject {
        Subject::Iri(s.to_string())
    }

    #[test]
    fn ground_quads_only_get_sorted() {
        let a = Quad::new(
            iri("https://example.com/b"),
            "https://example.com/p",
            Term::Literal(Literal::string("2")),
        );
        let b = Quad::new(
            iri("https://example.com/a"),
            "https://example.com/p",
            Term::Literal(Literal::string("1")),
        );
        let out = canonicalize(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(out, vec![b, a]);
    }

    #[test]
    fn single_blank_node_gets_c14n0() {
        let q = Quad::new(
            Subject::Blank("b99".to_string()),
            "https://example.com/p",
            Term::Literal(Literal::string("x")),
        );
        let out = canonicalize(&[q]).unwrap();
        assert_eq!(out[0].subject, Subject::Blank("c14n0".to_string()));
    }

    #[test]
    fn labels_are_independent_of_input_names() {
        // The same graph under different blank labels canonicalizes
        // identically.
        let mk = |x: &str, y: &str| {
            vec![
                Quad::new(
                    Subject::Blank(x.to_string()),
                    "https://example.com/knows",
                    Term::Blank(y.to_string()),
                ),
                Quad::new(
                    Subject::Blank(x.to_string()),
                    "https://example.com/name",
                    Term::Literal(Literal::string("alice")),
                ),
                Quad::new(
                    Subject::Blank(y.to_string()),
                    "https://example.com/name",
                    Term::Literal(Literal::string("bob")),
                ),
            ]
        };
        let out1 = canonicalize(&mk("b0", "b1")).unwrap();
        let out2 = canonicalize(&mk("foo", "bar")).unwrap();
        assert_eq!(out1, out2);
    }

    #[test]
    fn symmetric_blank_nodes_resolve_through_n_degree() {
        // Two blank nodes with identical first-degree shapes, linked to
        // each other, forcing the permutation search.
        let quads = vec![
            Quad::new(
                Subject::Blank("x".to_string()),
                "https://example.com/knows",
                Term::Blank("y".to_string()),
            ),
            Quad::new(
                Subject::Blank("y".to_string()),
                "https://example.com/knows",
                Term::Blank("x".to_string()),
            ),
            Quad::new(
                Subject::Blank("x".to_string()),
                "https://example.com/name",
                Term::Literal(Literal::string("alice")),
            ),
            Quad::new(
                Subject::Blank("y".to_string()),
                "https://example.com/name",
                Term::Literal(Literal::string("bob")),
            ),
        ];
        let forward = canonicalize(&quads).unwrap();
        let reversed: Vec<Quad> = quads.iter().rev().cloned().collect();
        let backward = canonicalize(&reversed).unwrap();
        assert_eq!(forward, backward);
        // Both labels were issued.
        let labels: Vec<String> = forward
            .iter()
            .filter_map(|q| match &q.subject {
                Subject::Blank(l) => Some(l.clone()),
                _ => None,
            })
            .collect();
        assert!(labels.contains(&"c14n0".to_string()));
        assert!(labels.contains(&"c14n1".to_string()));
    }

    #[test]
    fn output_is_totally_ordered() {
        let quads = vec![
            Quad::new(
                iri("https://example.com/z"),
                "https://example.com/p",
                Term::Literal(Literal::string("1")),
            ),
            Quad::new(
                Subject::Blank("n".to_string()),
                "https://example.com/p",
                Term::Literal(Literal::string("2")),
            ),
        ];
        let out = canonicalize(&quads).unwrap();
        let lines: Vec<String> = out.iter().map(quad_to_nquad).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }
}
