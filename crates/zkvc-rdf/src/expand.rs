//! # JSON-LD Expansion
//!
//! Rewrites a compacted JSON-LD document into expanded form: every key an
//! absolute IRI or keyword, every property value an array, scalars wrapped
//! in explicit `@value` objects carrying their coerced `@type`.
//!
//! The subset implemented here is the one credential documents exercise:
//! inline, remote and array contexts; term definitions with `@id`,
//! `@type` (including `@id` coercion), `@container` (`@list`/`@set`),
//! `@language`; keyword aliases; property- and type-scoped contexts.

use serde_json::{json, Map, Value};

use crate::context::{is_keyword, Container, Context, TermDefinition};
use crate::error::JsonLdError;
use crate::loader::DocumentLoader;

/// Expand a JSON-LD document. The result is an array of expanded node
/// objects. Each node object processes its own `@context`, the document
/// root included.
pub fn expand(doc: &Value, loader: &dyn DocumentLoader) -> Result<Value, JsonLdError> {
    let nodes = expand_element(doc, &Context::new(), None, loader)?;
    Ok(Value::Array(nodes))
}

/// Expand one element. `definition` is the term definition of the
/// property whose value this element is, used for coercion.
fn expand_element(
    value: &Value,
    ctx: &Context,
    definition: Option<&TermDefinition>,
    loader: &dyn DocumentLoader,
) -> Result<Vec<Value>, JsonLdError> {
    match value {
        Value::Null => Ok(vec![]),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                if item.is_array() {
                    return Err(JsonLdError::InvalidDocument(
                        "nested arrays are not valid JSON-LD".to_string(),
                    ));
                }
                out.extend(expand_element(item, ctx, definition, loader)?);
            }
            Ok(out)
        }
        Value::Object(map) => expand_object(map, ctx, definition, loader),
        scalar => Ok(vec![expand_scalar(scalar, ctx, definition)]),
    }
}

/// Wrap a scalar in its expanded form, applying the property's coercion.
fn expand_scalar(value: &Value, ctx: &Context, definition: Option<&TermDefinition>) -> Value {
    let type_mapping = definition.and_then(|d| d.type_mapping.as_deref());

    if let Value::String(s) = value {
        match type_mapping {
            Some("@id") => {
                let iri = ctx.expand_iri(s, false).unwrap_or_else(|| s.clone());
                return json!({ "@id": iri });
            }
            Some("@vocab") => {
                let iri = ctx
                    .expand_iri(s, true)
                    .or_else(|| ctx.expand_iri(s, false))
                    .unwrap_or_else(|| s.clone());
                return json!({ "@id": iri });
            }
            _ => {}
        }
    }

    let mut obj = Map::new();
    obj.insert("@value".to_string(), value.clone());
    if let Some(t) = type_mapping {
        if !t.starts_with('@') {
            obj.insert("@type".to_string(), json!(t));
        }
    } else if value.is_string() {
        let language = definition
            .and_then(|d| d.language.as_deref())
            .or_else(|| ctx.language());
        if let Some(lang) = language {
            obj.insert("@language".to_string(), json!(lang));
        }
    }
    Value::Object(obj)
}

/// Expand an object: a value object, a list/set object, or a node object.
fn expand_object(
    map: &Map<String, Value>,
    ctx: &Context,
    definition: Option<&TermDefinition>,
    loader: &dyn DocumentLoader,
) -> Result<Vec<Value>, JsonLdError> {
    // An inline context applies before anything else.
    let mut active = match map.get("@context") {
        Some(ctx_value) => ctx.parse(ctx_value, loader, false)?,
        None => ctx.clone(),
    };

    // Type-scoped contexts come next: the node's types (found through
    // the pre-scoping context, where @type and its aliases live) each
    // extend the active context, in lexicographic order of the types.
    let mut type_terms: Vec<String> = Vec::new();
    for (key, val) in map {
        if active.expand_iri(key, true).as_deref() != Some("@type") {
            continue;
        }
        match val {
            Value::String(t) => type_terms.push(t.clone()),
            Value::Array(items) => {
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

    // Only now can every key be classified: a type-scoped context may be
    // the place a property is defined at all.
    let mut expanded_keys: Vec<(String, &String, &Value)> = Vec::new();
    for (key, val) in map {
        if key == "@context" {
            continue;
        }
        match active.expand_iri(key, true) {
            Some(expanded) if is_keyword(&expanded) || expanded.contains(':') => {
                expanded_keys.push((expanded, key, val));
            }
            // Keys that do not expand to an IRI or keyword are dropped.
            _ => {}
        }
    }

    // Value objects pass through with their @type expanded.
    if let Some((_, _, raw)) = expanded_keys.iter().find(|(k, _, _)| k == "@value") {
        if raw.is_null() {
            return Ok(vec![]);
        }
        let mut obj = Map::new();
        obj.insert("@value".to_string(), (*raw).clone());
        for (expanded, _, val) in &expanded_keys {
            match expanded.as_str() {
                "@type" => {
                    if let Value::String(t) = val {
                        let iri = active.expand_iri(t, true).unwrap_or_else(|| t.clone());
                        obj.insert("@type".to_string(), json!(iri));
                    }
                }
                "@language" => {
                    obj.insert("@language".to_string(), (*val).clone());
                }
                _ => {}
            }
        }
        return Ok(vec![Value::Object(obj)]);
    }

    // Explicit list and set objects.
    if let Some((_, _, raw)) = expanded_keys.iter().find(|(k, _, _)| k == "@list") {
        let items = expand_element(raw, &active, definition, loader)?;
        return Ok(vec![json!({ "@list": items })]);
    }
    if let Some((_, _, raw)) = expanded_keys.iter().find(|(k, _, _)| k == "@set") {
        return expand_element(raw, &active, definition, loader);
    }

    // Node object.
    let mut node: Map<String, Value> = Map::new();
    for (expanded, key, raw) in &expanded_keys {
        match expanded.as_str() {
            "@id" => {
                if let Value::String(s) = raw {
                    let iri = active.expand_iri(s, false).unwrap_or_else(|| s.clone());
                    node.insert("@id".to_string(), json!(iri));
                }
            }
            "@type" => {
                let mut types: Vec<String> = Vec::new();
                let raw_types: Vec<&str> = match raw {
                    Value::String(s) => vec![s.as_str()],
                    Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
                    _ => vec![],
                };
                for t in raw_types {
                    if let Some(iri) = active.expand_iri(t, true) {
                        types.push(iri);
                    }
                }
                append_values(
                    &mut node,
                    "@type",
                    types.into_iter().map(Value::String).collect(),
                );
            }
            "@graph" => {
                let contents = expand_element(raw, &active, None, loader)?;
                append_values(&mut node, "@graph", contents);
            }
            "@index" | "@value" | "@list" | "@set" | "@language" => {
                // Handled above or irrelevant on node objects.
            }
            _ if expanded.starts_with('@') => {
                // Remaining keywords (e.g. @reverse) are outside the
                // subset credential documents use.
                return Err(JsonLdError::InvalidDocument(format!(
                    "unsupported keyword {expanded}"
                )));
            }
            property => {
                let def = active.term(key.as_str()).cloned();
                // A property-scoped context applies to the value.
                let child_ctx = match def.as_ref().and_then(|d| d.scoped_context.clone()) {
                    Some(scoped) => active.parse(&scoped, loader, true)?,
                    None => active.clone(),
                };
                let mut values = expand_element(raw, &child_ctx, def.as_ref(), loader)?;
                if def.as_ref().map(|d| d.container) == Some(Container::List)
                    && !values.iter().any(|v| v.get("@list").is_some())
                {
                    values = vec![json!({ "@list": values })];
                }
                if !values.is_empty() {
                    append_values(&mut node, property, values);
                }
            }
        }
    }

    Ok(vec![Value::Object(node)])
}

/// Append values to an array-valued entry, creating it if needed.
fn append_values(node: &mut Map<String, Value>, key: &str, values: Vec<Value>) {
    match node.get_mut(key) {
        Some(Value::Array(existing)) => existing.extend(values),
        _ => {
            node.insert(key.to_string(), Value::Array(values));
        }
    }
}
