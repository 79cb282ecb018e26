//! # Expanded JSON-LD to RDF Quads
//!
//! Deserializes expanded node objects into the internal quad model.
//! Nested nodes emit their own quads plus a reference from the parent;
//! `@list` arrays become `rdf:first`/`rdf:rest` chains ending in
//! `rdf:nil`; native JSON scalars take their canonical XSD lexical forms.
//!
//! Graph contents under `@graph` are flattened into the default graph —
//! the merklization pipeline consumes the default graph only.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::JsonLdError;
use crate::model::{Literal, Quad, Subject, Term};
use crate::vocab;

/// Issues `_:b0`-style labels, relabeling document-provided blank ids
/// consistently.
#[derive(Debug, Default)]
struct BlankNodeGenerator {
    counter: usize,
    relabeled: HashMap<String, String>,
}

impl BlankNodeGenerator {
    fn fresh(&mut self) -> String {
        let label = format!("b{}", self.counter);
        self.counter += 1;
        label
    }

    /// The issued label for a document-provided `_:` identifier.
    fn relabel(&mut self, doc_label: &str) -> String {
        if let Some(existing) = self.relabeled.get(doc_label) {
            return existing.clone();
        }
        let label = self.fresh();
        self.relabeled.insert(doc_label.to_string(), label.clone());
        label
    }
}

/// Convert an expanded document (as produced by
/// [`expand`](crate::expand::expand)) into quads in the default graph.
pub fn to_rdf(expanded: &Value) -> Result<Vec<Quad>, JsonLdError> {
    let nodes = expanded.as_array().ok_or_else(|| {
        JsonLdError::InvalidDocument("expanded form must be an array".to_string())
    })?;
    let mut quads = Vec::new();
    let mut generator = BlankNodeGenerator::default();
    for node in nodes {
        emit_node(node, &mut quads, &mut generator)?;
    }
    Ok(quads)
}

/// Emit one node object's quads; returns the node's subject for parent
/// references.
fn emit_node(
    node: &Value,
    quads: &mut Vec<Quad>,
    generator: &mut BlankNodeGenerator,
) -> Result<Subject, JsonLdError> {
    let map = node.as_object().ok_or_else(|| {
        JsonLdError::InvalidDocument("an expanded node must be an object".to_string())
    })?;

    let subject = match map.get("@id").and_then(Value::as_str) {
        Some(id) if id.starts_with("_:") => Subject::Blank(generator.relabel(&id[2..])),
        Some(id) => Subject::Iri(id.to_string()),
        None => Subject::Blank(generator.fresh()),
    };

    for (key, values) in map {
        match key.as_str() {
            "@id" | "@index" => {}
            "@type" => {
                if let Value::Array(types) = values {
                    for t in types {
                        if let Some(iri) = t.as_str() {
                            quads.push(Quad::new(
                                subject.clone(),
                                vocab::RDF_TYPE,
                                Term::Iri(iri.to_string()),
                            ));
                        }
                    }
                }
            }
            "@graph" => {
                if let Value::Array(children) = values {
                    for child in children {
                        emit_node(child, quads, generator)?;
                    }
                }
            }
            property => {
                let items = values.as_array().ok_or_else(|| {
                    JsonLdError::InvalidDocument(format!(
                        "property {property} must hold an array in expanded form"
                    ))
                })?;
                for item in items {
                    if let Some(object) = object_to_term(item, quads, generator)? {
                        quads.push(Quad::new(subject.clone(), property, object));
                    }
                }
            }
        }
    }

    Ok(subject)
}

/// Convert one expanded property value into an object term, emitting any
/// quads the value itself owns.
fn object_to_term(
    value: &Value,
    quads: &mut Vec<Quad>,
    generator: &mut BlankNodeGenerator,
) -> Result<Option<Term>, JsonLdError> {
    let map = match value.as_object() {
        Some(m) => m,
        None => {
            return Err(JsonLdError::InvalidDocument(
                "expanded property values must be objects".to_string(),
            ))
        }
    };

    if let Some(list) = map.get("@list") {
        let items = list.as_array().ok_or_else(|| {
            JsonLdError::InvalidDocument("@list must hold an array".to_string())
        })?;
        return Ok(Some(list_to_term(items, quads, generator)?));
    }

    if map.contains_key("@value") {
        return Ok(literal_term(map)?.map(Term::Literal));
    }

    // A node object or node reference.
    let subject = emit_node(value, quads, generator)?;
    Ok(Some(match subject {
        Subject::Iri(iri) => Term::Iri(iri),
        Subject::Blank(label) => Term::Blank(label),
    }))
}

/// Emit an RDF list chain for `items` and return its head term.
fn list_to_term(
    items: &[Value],
    quads: &mut Vec<Quad>,
    generator: &mut BlankNodeGenerator,
) -> Result<Term, JsonLdError> {
    if items.is_empty() {
        return Ok(Term::Iri(vocab::RDF_NIL.to_string()));
    }
    let labels: Vec<String> = items.iter().map(|_| generator.fresh()).collect();
    for (i, item) in items.iter().enumerate() {
        let cell = Subject::Blank(labels[i].clone());
        if let Some(first) = object_to_term(item, quads, generator)? {
            quads.push(Quad::new(cell.clone(), vocab::RDF_FIRST, first));
        }
        let rest = if i + 1 < items.len() {
            Term::Blank(labels[i + 1].clone())
        } else {
            Term::Iri(vocab::RDF_NIL.to_string())
        };
        quads.push(Quad::new(cell, vocab::RDF_REST, rest));
    }
    Ok(Term::Blank(labels[0].clone()))
}

/// Build the literal for a `@value` object. `None` when the value is
/// null.
fn literal_term(map: &Map<String, Value>) -> Result<Option<Literal>, JsonLdError> {
    let raw = &map["@value"];
    let explicit_type = map.get("@type").and_then(Value::as_str);
    let language = map.get("@language").and_then(Value::as_str);

    let literal = match raw {
        Value::Null => return Ok(None),
        Value::Bool(b) => Literal::typed(
            if *b { "true" } else { "false" },
            explicit_type.unwrap_or(vocab::XSD_BOOLEAN),
        ),
        Value::Number(n) => {
            let declared_double = explicit_type == Some(vocab::XSD_DOUBLE);
            if let Some(i) = n.as_i64().filter(|_| !declared_double) {
                Literal::typed(i.to_string(), explicit_type.unwrap_or(vocab::XSD_INTEGER))
            } else if let Some(u) = n.as_u64().filter(|_| !declared_double) {
                Literal::typed(u.to_string(), explicit_type.unwrap_or(vocab::XSD_INTEGER))
            } else {
                let f = n.as_f64().ok_or_else(|| {
                    JsonLdError::InvalidDocument("unrepresentable number".to_string())
                })?;
                if f.fract() == 0.0 && f.abs() < 1e21 && !declared_double && f.is_finite() {
                    Literal::typed(
                        format!("{f:.0}"),
                        explicit_type.unwrap_or(vocab::XSD_INTEGER),
                    )
                } else {
                    Literal::typed(
                        canonical_double(f),
                        explicit_type.unwrap_or(vocab::XSD_DOUBLE),
                    )
                }
            }
        }
        Value::String(s) => {
            if let Some(lang) = language {
                Literal::lang_tagged(s.clone(), lang)
            } else {
                Literal::typed(s.clone(), explicit_type.unwrap_or(vocab::XSD_STRING))
            }
        }
        other => {
            return Err(JsonLdError::InvalidDocument(format!(
                "unsupported @value payload: {other}"
            )))
        }
    };
    Ok(Some(literal))
}

/// The canonical XSD lexical form of a double: one nonzero digit before
/// the point, trailing zeros trimmed, explicit exponent.
pub fn canonical_double(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0E0" } else { "0.0E0" }.to_string();
    }
    let formatted = format!("{f:.15E}");
    let (mantissa, exponent) = formatted
        .split_once('E')
        .expect("upper-exp formatting always contains E");
    let mantissa = mantissa.trim_end_matches('0');
    let mantissa = if mantissa.ends_with('.') {
        format!("{mantissa}0")
    } else {
        mantissa.to_string()
    };
    format!("{mantissa}E{exponent}")
}
