//! # The Quad Model
//!
//! The crate's own RDF value model. Public consumers see only these
//! types — never a third-party RDF library's — so the normalization layer
//! stays swappable behind the [`Normalizer`](crate::Normalizer) boundary.
//!
//! Blank node labels are stored without the `_:` prefix; the N-Quads
//! writer adds it.

use crate::vocab;

/// The subject of a quad: an IRI or a blank node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    /// A named node.
    Iri(String),
    /// A blank node label (no `_:` prefix).
    Blank(String),
}

impl Subject {
    /// The label or IRI text.
    pub fn value(&self) -> &str {
        match self {
            Subject::Iri(s) | Subject::Blank(s) => s,
        }
    }

    /// Whether this is a blank node.
    pub fn is_blank(&self) -> bool {
        matches!(self, Subject::Blank(_))
    }
}

/// A typed (and possibly language-tagged) literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// The lexical form, exactly as produced by RDF conversion.
    pub value: String,
    /// The datatype IRI. Always present: plain strings carry
    /// `xsd:string`, language-tagged strings `rdf:langString`.
    pub datatype: String,
    /// The language tag, for `rdf:langString` literals.
    pub language: Option<String>,
}

impl Literal {
    /// A plain `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: vocab::XSD_STRING.to_string(),
            language: None,
        }
    }

    /// A literal with an explicit datatype.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// A language-tagged literal (`rdf:langString`).
    pub fn lang_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: vocab::RDF_LANG_STRING.to_string(),
            language: Some(language.into()),
        }
    }
}

/// The object of a quad: a named node, a blank node, or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A named node.
    Iri(String),
    /// A blank node label (no `_:` prefix).
    Blank(String),
    /// A literal.
    Literal(Literal),
}

impl Term {
    /// Whether this is a blank node.
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }
}

/// The graph component of a quad. `None` at the quad level means the
/// default graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphName {
    /// A named graph.
    Iri(String),
    /// A blank-node-named graph (no `_:` prefix).
    Blank(String),
}

/// One RDF quad.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    /// The subject node.
    pub subject: Subject,
    /// The predicate IRI.
    pub predicate: String,
    /// The object term.
    pub object: Term,
    /// The containing graph; `None` is the default graph.
    pub graph: Option<GraphName>,
}

impl Quad {
    /// A quad in the default graph.
    pub fn new(subject: Subject, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
            graph: None,
        }
    }
}
