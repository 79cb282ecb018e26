//! # JSON-LD Context Processing
//!
//! Parses `@context` values — inline objects, remote references, arrays —
//! into a [`Context`]: term definitions, prefix mappings, `@vocab`,
//! `@base`, keyword aliases, protected terms and scoped contexts.
//!
//! Term definitions are created lazily so a definition may reference a
//! prefix defined later in the same context object, with a cycle guard,
//! following the JSON-LD context-processing algorithm.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::JsonLdError;
use crate::loader::DocumentLoader;

/// Keywords recognized during IRI expansion.
const KEYWORDS: &[&str] = &[
    "@base", "@container", "@context", "@direction", "@graph", "@id", "@import",
    "@included", "@index", "@json", "@language", "@list", "@nest", "@none",
    "@prefix", "@propagate", "@protected", "@reverse", "@set", "@type", "@value",
    "@version", "@vocab",
];

/// Whether a string is a JSON-LD keyword.
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// The container mapping of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    /// No container mapping.
    #[default]
    None,
    /// `@list` — values form an ordered RDF list.
    List,
    /// `@set` — values form an unordered set (expansion no-op).
    Set,
    /// `@graph` — values form named graphs; treated as `@set` here, which
    /// is sufficient for credential documents that never populate it.
    Graph,
}

/// One term definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TermDefinition {
    /// The expanded IRI mapping. May be a keyword for aliases
    /// (`"id" → "@id"`).
    pub iri: String,
    /// Type coercion: `"@id"`, `"@vocab"`, or a datatype IRI.
    pub type_mapping: Option<String>,
    /// The container mapping.
    pub container: Container,
    /// Default language for plain string values of this term.
    pub language: Option<String>,
    /// A scoped context applied when this term is used as a property or
    /// matched as a node type. Kept raw; parsed at use time.
    pub scoped_context: Option<Value>,
    /// Whether the definition is protected against redefinition.
    pub protected: bool,
}

/// A processed JSON-LD context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    terms: HashMap<String, TermDefinition>,
    vocab: Option<String>,
    base: Option<String>,
    language: Option<String>,
}

impl Context {
    /// The empty initial context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The term definition for `term`, if any.
    pub fn term(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    /// The `@vocab` mapping, if any.
    pub fn vocab(&self) -> Option<&str> {
        self.vocab.as_deref()
    }

    /// The `@base` IRI, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// The default `@language`, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Process a `@context` value against this context, returning the
    /// merged result. `override_protected` is set when applying scoped
    /// contexts, which are the one place allowed to redefine protected
    /// terms.
    pub fn parse(
        &self,
        value: &Value,
        loader: &dyn DocumentLoader,
        override_protected: bool,
    ) -> Result<Context, JsonLdError> {
        let mut remote_stack = Vec::new();
        self.parse_inner(value, loader, override_protected, &mut remote_stack)
    }

    fn parse_inner(
        &self,
        value: &Value,
        loader: &dyn DocumentLoader,
        override_protected: bool,
        remote_stack: &mut Vec<String>,
    ) -> Result<Context, JsonLdError> {
        match value {
            Value::Null => Ok(Context::new()),
            Value::Array(entries) => {
                let mut result = self.clone();
                for entry in entries {
                    result =
                        result.parse_inner(entry, loader, override_protected, remote_stack)?;
                }
                Ok(result)
            }
            Value::String(url) => {
                if remote_stack.iter().any(|u| u == url) {
                    return Err(JsonLdError::CyclicDefinition(url.clone()));
                }
                remote_stack.push(url.clone());
                let document = loader.load(url)?;
                let remote_ctx = document.get("@context").cloned().ok_or_else(|| {
                    JsonLdError::ContextResolution {
                        url: url.clone(),
                        reason: "remote document has no @context".to_string(),
                    }
                })?;
                let result =
                    self.parse_inner(&remote_ctx, loader, override_protected, remote_stack)?;
                remote_stack.pop();
                Ok(result)
            }
            Value::Object(map) => {
                let mut result = self.clone();

                match map.get("@vocab") {
                    Some(Value::String(v)) => result.vocab = Some(v.clone()),
                    Some(Value::Null) => result.vocab = None,
                    Some(other) => {
                        return Err(JsonLdError::InvalidContext(format!(
                            "@vocab must be a string or null, got {other}"
                        )))
                    }
                    None => {}
                }
                match map.get("@base") {
                    Some(Value::String(v)) => result.base = Some(v.clone()),
                    Some(Value::Null) => result.base = None,
                    Some(_) => {
                        return Err(JsonLdError::InvalidContext(
                            "@base must be a string or null".to_string(),
                        ))
                    }
                    None => {}
                }
                match map.get("@language") {
                    Some(Value::String(v)) => result.language = Some(v.clone()),
                    Some(Value::Null) => result.language = None,
                    _ => {}
                }
                let default_protected =
                    matches!(map.get("@protected"), Some(Value::Bool(true)));

                let mut defined: HashMap<String, bool> = HashMap::new();
                for term in map.keys() {
                    if is_keyword(term) {
                        continue;
                    }
                    create_term_definition(
                        &mut result,
                        map,
                        term,
                        &mut defined,
                        default_protected,
                        override_protected,
                    )?;
                }
                Ok(result)
            }
            other => Err(JsonLdError::InvalidContext(format!(
                "a context must be null, a string, an object or an array, got {other}"
            ))),
        }
    }

    /// Expand a term, compact IRI, or relative reference.
    ///
    /// With `vocab` set the expansion targets predicates and types (term
    /// definitions and `@vocab` apply); without it the value is a document
    /// reference resolved against `@base`. Returns `None` when the value
    /// cannot be made absolute — callers drop such entries.
    pub fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        if is_keyword(value) {
            return Some(value.to_string());
        }
        if vocab {
            if let Some(def) = self.terms.get(value) {
                return Some(def.iri.clone());
            }
        }
        if value.contains(':') {
            if let Some((prefix, suffix)) = split_compact_iri(value) {
                if let Some(def) = self.terms.get(prefix) {
                    return Some(format!("{}{}", def.iri, suffix));
                }
            }
            // Scheme-qualified (or an unknown prefix): already absolute.
            return Some(value.to_string());
        }
        if vocab {
            if let Some(v) = &self.vocab {
                return Some(format!("{v}{value}"));
            }
            return None;
        }
        if let Some(base) = &self.base {
            return Some(resolve_against_base(base, value));
        }
        Some(value.to_string())
    }
}

/// Split `prefix:suffix` unless the suffix makes it a scheme-qualified
/// IRI (`//…`) or the candidate is a blank node label.
fn split_compact_iri(value: &str) -> Option<(&str, &str)> {
    let idx = value.find(':')?;
    let (prefix, rest) = value.split_at(idx);
    let suffix = &rest[1..];
    if prefix == "_" || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// Minimal reference resolution against a base IRI. Scheme-qualified
/// references pass through; fragments and query strings append; other
/// relative references replace the last path segment.
fn resolve_against_base(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base.to_string();
    }
    if reference.contains(':') {
        return reference.to_string();
    }
    if reference.starts_with('#') || reference.starts_with('?') {
        return format!("{base}{reference}");
    }
    let authority_end = base.find("//").map(|i| i + 2).unwrap_or(0);
    match base[authority_end..].rfind('/') {
        Some(idx) => format!("{}{}", &base[..authority_end + idx + 1], reference),
        None => format!("{base}/{reference}"),
    }
}

/// Create one term definition, resolving prefix dependencies within the
/// same context object first (with a cycle guard).
fn create_term_definition(
    ctx: &mut Context,
    raw: &Map<String, Value>,
    term: &str,
    defined: &mut HashMap<String, bool>,
    default_protected: bool,
    override_protected: bool,
) -> Result<(), JsonLdError> {
    match defined.get(term) {
        Some(true) => return Ok(()),
        Some(false) => return Err(JsonLdError::CyclicDefinition(term.to_string())),
        None => {}
    }
    defined.insert(term.to_string(), false);

    let previous = ctx.terms.get(term).cloned();
    let value = raw.get(term).cloned().unwrap_or(Value::Null);

    let definition = match &value {
        Value::Null => None,
        Value::String(mapping) => {
            let iri = expand_iri_defining(ctx, raw, defined, mapping, default_protected, override_protected)?
                .ok_or_else(|| {
                    JsonLdError::InvalidContext(format!(
                        "term {term} maps to a value that cannot be made absolute: {mapping}"
                    ))
                })?;
            Some(TermDefinition {
                iri,
                type_mapping: None,
                container: Container::None,
                language: None,
                scoped_context: None,
                protected: default_protected,
            })
        }
        Value::Object(entry) => {
            let iri = match entry.get("@id") {
                Some(Value::String(mapping)) => expand_iri_defining(
                    ctx,
                    raw,
                    defined,
                    mapping,
                    default_protected,
                    override_protected,
                )?
                .ok_or_else(|| {
                    JsonLdError::InvalidContext(format!(
                        "term {term}: @id cannot be made absolute"
                    ))
                })?,
                Some(Value::Null) => {
                    // Explicitly unmapped term.
                    ctx.terms.remove(term);
                    defined.insert(term.to_string(), true);
                    return Ok(());
                }
                None => {
                    implicit_term_iri(ctx, raw, defined, term, default_protected, override_protected)?
                }
                Some(other) => {
                    return Err(JsonLdError::InvalidContext(format!(
                        "term {term}: @id must be a string, got {other}"
                    )))
                }
            };

            let type_mapping = match entry.get("@type") {
                Some(Value::String(t)) => {
                    if t == "@id" || t == "@vocab" || t == "@json" || t == "@none" {
                        Some(t.clone())
                    } else {
                        Some(
                            expand_iri_defining(
                                ctx,
                                raw,
                                defined,
                                t,
                                default_protected,
                                override_protected,
                            )?
                            .ok_or_else(|| {
                                JsonLdError::InvalidContext(format!(
                                    "term {term}: @type cannot be made absolute"
                                ))
                            })?,
                        )
                    }
                }
                Some(other) => {
                    return Err(JsonLdError::InvalidContext(format!(
                        "term {term}: @type must be a string, got {other}"
                    )))
                }
                None => None,
            };

            let container = parse_container(term, entry.get("@container"))?;
            let language = match entry.get("@language") {
                Some(Value::String(l)) => Some(l.clone()),
                _ => None,
            };
            let protected = match entry.get("@protected") {
                Some(Value::Bool(b)) => *b,
                _ => default_protected,
            };

            Some(TermDefinition {
                iri,
                type_mapping,
                container,
                language,
                scoped_context: entry.get("@context").cloned(),
                protected,
            })
        }
        other => {
            return Err(JsonLdError::InvalidContext(format!(
                "term {term}: definition must be null, a string or an object, got {other}"
            )))
        }
    };

    if let Some(prev) = &previous {
        if prev.protected && !override_protected {
            // Identical redefinition is permitted; anything else is not.
            let same = definition
                .as_ref()
                .map(|d| d.iri == prev.iri && d.type_mapping == prev.type_mapping)
                .unwrap_or(false);
            if !same {
                return Err(JsonLdError::ProtectedTerm {
                    term: term.to_string(),
                });
            }
        }
    }

    match definition {
        Some(def) => {
            ctx.terms.insert(term.to_string(), def);
        }
        None => {
            ctx.terms.remove(term);
        }
    }
    defined.insert(term.to_string(), true);
    Ok(())
}

/// The IRI for an expanded term definition without `@id`: a compact-IRI
/// term expands itself; otherwise the active `@vocab` applies.
fn implicit_term_iri(
    ctx: &mut Context,
    raw: &Map<String, Value>,
    defined: &mut HashMap<String, bool>,
    term: &str,
    default_protected: bool,
    override_protected: bool,
) -> Result<String, JsonLdError> {
    if split_compact_iri(term).is_some() {
        return expand_iri_defining(ctx, raw, defined, term, default_protected, override_protected)?
            .ok_or_else(|| {
                JsonLdError::InvalidContext(format!("term {term} cannot expand itself"))
            });
    }
    match ctx.vocab.clone() {
        Some(v) => Ok(format!("{v}{term}")),
        None => Err(JsonLdError::InvalidContext(format!(
            "term {term} has neither @id nor an active @vocab"
        ))),
    }
}

/// IRI expansion during context parsing: like runtime expansion, but a
/// term or prefix defined later in the same context object is created on
/// demand first.
fn expand_iri_defining(
    ctx: &mut Context,
    raw: &Map<String, Value>,
    defined: &mut HashMap<String, bool>,
    value: &str,
    default_protected: bool,
    override_protected: bool,
) -> Result<Option<String>, JsonLdError> {
    if is_keyword(value) {
        return Ok(Some(value.to_string()));
    }
    if raw.contains_key(value) && defined.get(value) != Some(&true) {
        create_term_definition(ctx, raw, value, defined, default_protected, override_protected)?;
    }
    if let Some(def) = ctx.terms.get(value) {
        return Ok(Some(def.iri.clone()));
    }
    if value.contains(':') {
        if let Some((prefix, suffix)) = split_compact_iri(value) {
            if raw.contains_key(prefix) && defined.get(prefix) != Some(&true) {
                create_term_definition(
                    ctx,
                    raw,
                    prefix,
                    defined,
                    default_protected,
                    override_protected,
                )?;
            }
            if let Some(def) = ctx.terms.get(prefix) {
                return Ok(Some(format!("{}{}", def.iri, suffix)));
            }
        }
        return Ok(Some(value.to_string()));
    }
    match &ctx.vocab {
        Some(v) => Ok(Some(format!("{v}{value}"))),
        None => Ok(None),
    }
}

fn parse_container(term: &str, value: Option<&Value>) -> Result<Container, JsonLdError> {
    let Some(value) = value else {
        return Ok(Container::None);
    };
    let names: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
        _ => {
            return Err(JsonLdError::InvalidContext(format!(
                "term {term}: @container must be a string or array"
            )))
        }
    };
    if names.contains(&"@list") {
        Ok(Container::List)
    } else if names.contains(&"@graph") {
        Ok(Container::Graph)
    } else if names.contains(&"@set") {
        Ok(Container::Set)
    } else {
        // Index/language containers do not change this pipeline's output
        // for the documents it handles; treat them as sets.
        Ok(Container::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DenyLoader;
    use serde_json::json;

    fn parse(value: Value) -> Context {
        Context::new().parse(&value, &DenyLoader, false).unwrap()
    }

    #[test]
    fn prefix_and_term_expansion() {
        let ctx = parse(json!({
            "schema": "http://schema.org/",
            "name": "schema:name"
        }));
        assert_eq!(
            ctx.expand_iri("schema:Person", true).unwrap(),
            "http://schema.org/Person"
        );
        assert_eq!(
            ctx.expand_iri("name", true).unwrap(),
            "http://schema.org/name"
        );
    }

    #[test]
    fn forward_reference_between_terms_resolves() {
        // "name" references "schema" before the map yields it.
        let ctx = parse(json!({
            "name": "schema:name",
            "schema": "http://schema.org/"
        }));
        assert_eq!(
            ctx.expand_iri("name", true).unwrap(),
            "http://schema.org/name"
        );
    }

    #[test]
    fn keyword_aliases_map_to_keywords() {
        let ctx = parse(json!({"id": "@id", "type": "@type"}));
        assert_eq!(ctx.expand_iri("id", true).unwrap(), "@id");
        assert_eq!(ctx.expand_iri("type", true).unwrap(), "@type");
    }

    #[test]
    fn vocab_applies_to_bare_terms() {
        let ctx = parse(json!({"@vocab": "https://example.com/ns#"}));
        assert_eq!(
            ctx.expand_iri("custom", true).unwrap(),
            "https://example.com/ns#custom"
        );
        // Without @vocab a bare term stays unmappable.
        assert_eq!(Context::new().expand_iri("custom", true), None);
    }

    #[test]
    fn expanded_definition_carries_type_and_container() {
        let ctx = parse(json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "issued": {"@id": "https://example.com/ns#issued", "@type": "xsd:dateTime"},
            "tags": {"@id": "https://example.com/ns#tags", "@container": "@list"}
        }));
        let issued = ctx.term("issued").unwrap();
        assert_eq!(
            issued.type_mapping.as_deref(),
            Some("http://www.w3.org/2001/XMLSchema#dateTime")
        );
        assert_eq!(ctx.term("tags").unwrap().container, Container::List);
    }

    #[test]
    fn scheme_qualified_values_pass_through() {
        let ctx = Context::new();
        assert_eq!(
            ctx.expand_iri("did:example:489398593", false).unwrap(),
            "did:example:489398593"
        );
        assert_eq!(
            ctx.expand_iri("https://example.com/x", true).unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn vocab_never_swallows_absolute_iris() {
        let ctx = parse(json!({"@vocab": "https://example.com/ns#"}));
        assert_eq!(
            ctx.expand_iri("http://schema.org/name", true).unwrap(),
            "http://schema.org/name"
        );
        assert_eq!(
            ctx.expand_iri("did:example:1", true).unwrap(),
            "did:example:1"
        );
    }

    #[test]
    fn remote_context_resolves_through_loader() {
        use crate::loader::StaticLoader;
        let loader = StaticLoader::new().with_document(
            "https://example.com/ctx",
            json!({"@context": {"name": "http://schema.org/name"}}),
        );
        let ctx = Context::new()
            .parse(&json!("https://example.com/ctx"), &loader, false)
            .unwrap();
        assert_eq!(
            ctx.expand_iri("name", true).unwrap(),
            "http://schema.org/name"
        );
    }

    #[test]
    fn remote_context_cycle_is_detected() {
        use crate::loader::StaticLoader;
        let loader = StaticLoader::new()
            .with_document("https://a/", json!({"@context": "https://b/"}))
            .with_document("https://b/", json!({"@context": "https://a/"}));
        let err = Context::new()
            .parse(&json!("https://a/"), &loader, false)
            .unwrap_err();
        assert!(matches!(err, JsonLdError::CyclicDefinition(_)));
    }

    #[test]
    fn protected_term_resists_redefinition() {
        let base = parse(json!({
            "@protected": true,
            "issuer": "https://example.com/ns#issuer"
        }));
        let err = base
            .parse(
                &json!({"issuer": "https://other.example/ns#issuer"}),
                &DenyLoader,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, JsonLdError::ProtectedTerm { .. }));

        // Identical redefinition is fine.
        assert!(base
            .parse(
                &json!({"issuer": "https://example.com/ns#issuer"}),
                &DenyLoader,
                false,
            )
            .is_ok());

        // Scoped application may override.
        assert!(base
            .parse(
                &json!({"issuer": "https://other.example/ns#issuer"}),
                &DenyLoader,
                true,
            )
            .is_ok());
    }

    #[test]
    fn null_context_resets() {
        let ctx = parse(json!({"name": "http://schema.org/name"}));
        let reset = ctx.parse(&Value::Null, &DenyLoader, false).unwrap();
        assert!(reset.term("name").is_none());
    }

    #[test]
    fn base_resolution_merges_paths() {
        assert_eq!(
            resolve_against_base("https://example.com/dir/doc", "other"),
            "https://example.com/dir/other"
        );
        assert_eq!(
            resolve_against_base("https://example.com/dir/doc", "#frag"),
            "https://example.com/dir/doc#frag"
        );
        assert_eq!(
            resolve_against_base("https://example.com", "x"),
            "https://example.com/x"
        );
    }
}
