//! # Canonical N-Quads Writer
//!
//! Serializes the internal quad model to canonical N-Quads lines. The
//! writer is used for two things the merklization pipeline depends on:
//! the SHA-256 hashing steps inside URDNA2015, and the total order of the
//! canonical dataset (quads sort by their serialized form).

use crate::model::{GraphName, Literal, Quad, Subject, Term};
use crate::vocab;

/// Serialize one quad as an N-Quads line, including the terminating
/// `" .\n"`. Blank labels are written as-is with the `_:` prefix.
pub fn quad_to_nquad(quad: &Quad) -> String {
    quad_to_nquad_with(quad, |label| label.to_string())
}

/// Serialize one quad, mapping every blank node label through `relabel`
/// first. URDNA2015's first-degree hashing uses this to substitute the
/// `a`/`z` placeholders.
pub fn quad_to_nquad_with(quad: &Quad, relabel: impl Fn(&str) -> String) -> String {
    let mut out = String::new();

    match &quad.subject {
        Subject::Iri(iri) => {
            out.push('<');
            out.push_str(iri);
            out.push('>');
        }
        Subject::Blank(label) => {
            out.push_str("_:");
            out.push_str(&relabel(label));
        }
    }

    out.push_str(" <");
    out.push_str(&quad.predicate);
    out.push_str("> ");

    match &quad.object {
        Term::Iri(iri) => {
            out.push('<');
            out.push_str(iri);
            out.push('>');
        }
        Term::Blank(label) => {
            out.push_str("_:");
            out.push_str(&relabel(label));
        }
        Term::Literal(lit) => write_literal(&mut out, lit),
    }

    match &quad.graph {
        None => {}
        Some(GraphName::Iri(iri)) => {
            out.push_str(" <");
            out.push_str(iri);
            out.push('>');
        }
        Some(GraphName::Blank(label)) => {
            out.push_str(" _:");
            out.push_str(&relabel(label));
        }
    }

    out.push_str(" .\n");
    out
}

fn write_literal(out: &mut String, lit: &Literal) {
    out.push('"');
    out.push_str(&escape(&lit.value));
    out.push('"');
    if let Some(lang) = &lit.language {
        out.push('@');
        out.push_str(lang);
    } else if lit.datatype != vocab::XSD_STRING {
        out.push_str("^^<");
        out.push_str(&lit.datatype);
        out.push('>');
    }
}

/// Escape a literal's lexical form for N-Quads.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
