//! # The Graph Flattener
//!
//! Converts a canonical quad set into a sorted list of
//! ([`Path`], [`TypedValue`]) entries, one per terminal object, each path
//! fully qualified by the chain of parent subjects back to a named root.
//!
//! - Repeated predicates and RDF lists address their members by integer
//!   index; an only child needs none.
//! - Literals resolve to typed values through the XSD datatype table.
//! - Duplicate (path, value) entries merge; a path carrying two different
//!   values is a conflict.
//! - The result is sorted by the total path order; the tree root does not
//!   depend on this order, only the presentation does.

use std::collections::BTreeMap;

use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use num_bigint::BigInt;
use tracing::debug;

use zkvc_core::{Path, PathPart, RdfEntry, TypedValue};
use zkvc_rdf::{vocab, Literal, Quad, Term};

use crate::error::MerklizeError;
use crate::relationship::{Lists, NodeId, Relationship};

/// Flatten a canonical quad set into sorted, unique (path, value)
/// entries. Only default-graph quads participate.
pub fn entries_from_quads(quads: &[Quad]) -> Result<Vec<RdfEntry>, MerklizeError> {
    let default_graph: Vec<Quad> = quads
        .iter()
        .filter(|q| q.graph.is_none())
        .cloned()
        .collect();

    let lists = Lists::build(&default_graph)?;
    let rel = Relationship::build(&default_graph, &lists)?;

    let mut entries: BTreeMap<Path, TypedValue> = BTreeMap::new();
    let mut positions: std::collections::HashMap<(NodeId, String), usize> =
        std::collections::HashMap::new();

    for quad in &default_graph {
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
        let multiple = rel.count(&subject, &quad.predicate) > 1;
        let prefix = rel.path_to_root(&subject)?;

        // A list head fans out into indexed entries.
        if let Some(object) = NodeId::from_term(&quad.object) {
            if let Some(members) = lists.members(&object) {
                for (i, member) in members.iter().enumerate() {
                    let Some(value) = term_value(member)? else {
                        // Node members produce their own entries through
                        // their parent links.
                        continue;
                    };
                    let mut parts = prefix.clone();
                    parts.push(PathPart::Iri(quad.predicate.clone()));
                    parts.push(PathPart::Index(i));
                    insert_entry(&mut entries, Path::from_parts(parts), value)?;
                }
                continue;
            }
        }

        let Some(value) = term_value(&quad.object)? else {
            // Blank objects are non-terminal; their quads produce the
            // entries.
            continue;
        };
        let mut parts = prefix;
        parts.push(PathPart::Iri(quad.predicate.clone()));
        if multiple {
            parts.push(PathPart::Index(position));
        }
        insert_entry(&mut entries, Path::from_parts(parts), value)?;
    }

    debug!(entries = entries.len(), "flattened canonical dataset");
    Ok(entries
        .into_iter()
        .map(|(path, value)| RdfEntry::new(path, value))
        .collect())
}

fn insert_entry(
    entries: &mut BTreeMap<Path, TypedValue>,
    path: Path,
    value: TypedValue,
) -> Result<(), MerklizeError> {
    if path.is_empty() {
        return Err(MerklizeError::Core(zkvc_core::CoreError::InvalidPath(
            "flattened entry with empty path".to_string(),
        )));
    }
    if let Some(existing) = entries.get(&path) {
        if existing != &value {
            return Err(MerklizeError::ConflictingEntries {
                path: path.to_string(),
            });
        }
        return Ok(());
    }
    entries.insert(path, value);
    Ok(())
}

/// The typed value of a terminal object term. `None` for blank nodes
/// (non-terminal).
fn term_value(term: &Term) -> Result<Option<TypedValue>, MerklizeError> {
    match term {
        Term::Blank(_) => Ok(None),
        Term::Iri(iri) => Ok(Some(TypedValue::iri(iri.clone()))),
        Term::Literal(lit) => literal_value(lit).map(Some),
    }
}

/// Resolve a literal into a [`TypedValue`] per its XSD datatype.
pub fn literal_value(lit: &Literal) -> Result<TypedValue, MerklizeError> {
    let dt = lit.datatype.as_str();
    let value = match dt {
        vocab::XSD_BOOLEAN => match lit.value.as_str() {
            "true" | "1" => TypedValue::bool(true),
            "false" | "0" => TypedValue::bool(false),
            _ => return Err(invalid(lit)),
        },
        vocab::XSD_INTEGER
        | vocab::XSD_LONG
        | vocab::XSD_INT
        | vocab::XSD_SHORT
        | vocab::XSD_BYTE
        | vocab::XSD_NON_NEGATIVE_INTEGER => match lit.value.parse::<i64>() {
            Ok(i) => TypedValue::int64(i),
            // Out of the 64-bit range, not out of the integer grammar.
            Err(_) => match lit.value.parse::<BigInt>() {
                Ok(b) => TypedValue::bigint(b),
                Err(_) => return Err(invalid(lit)),
            },
        },
        vocab::XSD_DOUBLE | vocab::XSD_FLOAT => {
            let f = match lit.value.as_str() {
                "INF" => f64::INFINITY,
                "-INF" => f64::NEG_INFINITY,
                "NaN" => f64::NAN,
                s => s.parse::<f64>().map_err(|_| invalid(lit))?,
            };
            TypedValue::double(f)
        }
        vocab::XSD_DATETIME => TypedValue::time(parse_date_time(&lit.value).ok_or_else(|| invalid(lit))?),
        vocab::XSD_DATE => TypedValue::time(parse_date_midnight(&lit.value).ok_or_else(|| invalid(lit))?),
        vocab::XSD_STRING | vocab::RDF_LANG_STRING => TypedValue::string(lit.value.clone()),
        vocab::XSD_HEX_BINARY => TypedValue::bytes(decode_hex(&lit.value).ok_or_else(|| invalid(lit))?),
        vocab::XSD_BASE64_BINARY => TypedValue::bytes(
            base64::engine::general_purpose::STANDARD
                .decode(lit.value.as_bytes())
                .map_err(|_| invalid(lit))?,
        ),
        other if other.starts_with("http://www.w3.org/2001/XMLSchema#") => {
            return Err(MerklizeError::UnsupportedDatatype {
                datatype: other.to_string(),
            })
        }
        // Unknown non-XSD datatypes stay strings; the datatype rides
        // alongside for callers that care.
        _ => TypedValue::string(lit.value.clone()),
    };
    Ok(value.with_datatype(dt))
}

/// Parse an `xsd:dateTime` lexical form. Credential contexts type bare
/// dates as `xsd:dateTime`, so the date-only form is accepted as
/// midnight UTC.
fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_date_midnight(s)
}

/// Parse an `xsd:date` lexical form as midnight UTC.
fn parse_date_midnight(s: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    s.as_bytes()
        .chunks(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(text, 16).ok()
        })
        .collect()
}

fn invalid(lit: &Literal) -> MerklizeError {
    MerklizeError::InvalidLiteral {
        value: lit.value.clone(),
        datatype: lit.datatype.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use zkvc_rdf::Subject;

    fn iri(s: &str) -> Subject {
        Subject::Iri(s.to_string())
    }

    const ROOT: &str = "https://example.com/credential/1";
    const NS: &str = "https://example.com/ns#";

    fn p(suffix: &str) -> String {
        format!("{NS}{suffix}")
    }

    #[test]
    fn literal_table_boolean() {
        assert!(literal_value(&Literal::typed("true", vocab::XSD_BOOLEAN))
            .unwrap()
            .as_bool()
            .unwrap());
        assert!(!literal_value(&Literal::typed("false", vocab::XSD_BOOLEAN))
            .unwrap()
            .as_bool()
            .unwrap());
        assert!(literal_value(&Literal::typed("yes", vocab::XSD_BOOLEAN)).is_err());
    }

    #[test]
    fn literal_table_integers() {
        let v = literal_value(&Literal::typed("83627465", vocab::XSD_INTEGER)).unwrap();
        assert_eq!(v.as_int64().unwrap(), 83627465);

        let v = literal_value(&Literal::typed("-7", vocab::XSD_LONG)).unwrap();
        assert_eq!(v.as_int64().unwrap(), -7);

        // Overflowing 64 bits falls back to BigInt.
        let v = literal_value(&Literal::typed(
            "99999999999999999999999999",
            vocab::XSD_INTEGER,
        ))
        .unwrap();
        assert!(v.is_bigint());
    }

    #[test]
    fn literal_table_doubles() {
        let v = literal_value(&Literal::typed("5.5E0", vocab::XSD_DOUBLE)).unwrap();
        assert_eq!(v.as_double().unwrap(), 5.5);
        let v = literal_value(&Literal::typed("INF", vocab::XSD_DOUBLE)).unwrap();
        assert!(v.as_double().unwrap().is_infinite());
    }

    #[test]
    fn literal_table_date_times() {
        let v = literal_value(&Literal::typed(
            "2019-12-03T12:19:52Z",
            vocab::XSD_DATETIME,
        ))
        .unwrap();
        assert_eq!(
            v.as_time().unwrap(),
            Utc.with_ymd_and_hms(2019, 12, 3, 12, 19, 52).unwrap()
        );

        // A bare date typed as dateTime is midnight UTC.
        let v = literal_value(&Literal::typed("1958-07-17", vocab::XSD_DATETIME)).unwrap();
        assert_eq!(
            v.as_time().unwrap(),
            Utc.with_ymd_and_hms(1958, 7, 17, 0, 0, 0).unwrap()
        );

        let v = literal_value(&Literal::typed("2015-01-01", vocab::XSD_DATE)).unwrap();
        assert_eq!(
            v.as_time().unwrap(),
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn literal_table_binary() {
        let v = literal_value(&Literal::typed("deadBEEF", vocab::XSD_HEX_BINARY)).unwrap();
        assert_eq!(v.as_bytes().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        let v = literal_value(&Literal::typed("aGk=", vocab::XSD_BASE64_BINARY)).unwrap();
        assert_eq!(v.as_bytes().unwrap(), b"hi".to_vec());
    }

    #[test]
    fn unknown_xsd_datatype_is_rejected() {
        let err = literal_value(&Literal::typed(
            "PT1S",
            "http://www.w3.org/2001/XMLSchema#duration",
        ))
        .unwrap_err();
        assert!(matches!(err, MerklizeError::UnsupportedDatatype { .. }));
    }

    #[test]
    fn unknown_foreign_datatype_stays_string() {
        let v = literal_value(&Literal::typed("x", "https://example.com/custom")).unwrap();
        assert_eq!(v.as_string().unwrap(), "x");
        assert_eq!(v.datatype(), Some("https://example.com/custom"));
    }

    #[test]
    fn lang_tagged_literals_are_strings() {
        let v = literal_value(&Literal::lang_tagged("chat", "fr")).unwrap();
        assert_eq!(v.as_string().unwrap(), "chat");
        assert_eq!(v.datatype(), Some(vocab::RDF_LANG_STRING));
    }

    // ── Flattening shape ────────────────────────────────────────

    fn credential_quads() -> Vec<Quad> {
        // Root with two children under one predicate, each child with a
        // literal; plus a scalar on the root.
        vec![
            Quad::new(
                iri("https://example.com/a"),
                p("name"),
                Term::Literal(Literal::string("a")),
            ),
            Quad::new(
                iri("https://example.com/b"),
                p("name"),
                Term::Literal(Literal::string("b")),
            ),
            Quad::new(
                iri(ROOT),
                p("holder"),
                Term::Iri("https://example.com/a".to_string()),
            ),
            Quad::new(
                iri(ROOT),
                p("holder"),
                Term::Iri("https://example.com/b".to_string()),
            ),
            Quad::new(
                iri(ROOT),
                p("identifier"),
                Term::Literal(Literal::typed("83627465", vocab::XSD_INTEGER)),
            ),
        ]
    }

    #[test]
    fn entries_qualify_children_with_indices() {
        let entries = entries_from_quads(&credential_quads()).unwrap();
        let paths: Vec<String> = entries.iter().map(|e| e.path().to_string()).collect();
        assert!(paths.contains(&format!("{} :: 0 :: {}", p("holder"), p("name"))));
        assert!(paths.contains(&format!("{} :: 1 :: {}", p("holder"), p("name"))));
        // The references themselves are entries too.
        assert!(paths.contains(&format!("{} :: 0", p("holder"))));
        assert!(paths.contains(&format!("{} :: 1", p("holder"))));
        assert!(paths.contains(&p("identifier")));
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn entries_come_out_sorted_by_path() {
        let entries = entries_from_quads(&credential_quads()).unwrap();
        let mut sorted = entries.clone();
        sorted.sort_by(|a, b| a.path().cmp(b.path()));
        assert_eq!(entries, sorted);
    }

    #[test]
    fn duplicate_identical_entries_merge() {
        // Two single-member lists under the same predicate put the same
        // value on the same (tags, 0) path; they merge into one entry.
        let list = |head: &str, value: &str| {
            vec![
                Quad::new(iri(ROOT), p("tags"), Term::Blank(head.to_string())),
                Quad::new(
                    Subject::Blank(head.to_string()),
                    vocab::RDF_FIRST,
                    Term::Literal(Literal::string(value)),
                ),
                Quad::new(
                    Subject::Blank(head.to_string()),
                    vocab::RDF_REST,
                    Term::Iri(vocab::RDF_NIL.to_string()),
                ),
            ]
        };
        let mut quads = list("b0", "x");
        quads.extend(list("b1", "x"));
        let entries = entries_from_quads(&quads).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value().as_string().unwrap(), "x");
    }

    #[test]
    fn blank_objects_are_non_terminal() {
        let quads = vec![
            Quad::new(
                iri(ROOT),
                p("subject"),
                Term::Blank("c14n0".to_string()),
            ),
            Quad::new(
                Subject::Blank("c14n0".to_string()),
                p("name"),
                Term::Literal(Literal::string("anon")),
            ),
        ];
        let entries = entries_from_quads(&quads).unwrap();
        // No entry for the blank reference itself; one for its child.
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].path().to_string(),
            format!("{} :: {}", p("subject"), p("name"))
        );
    }

    #[test]
    fn list_members_flatten_with_indices() {
        let quads = vec![
            Quad::new(iri(ROOT), p("tags"), Term::Blank("b0".to_string())),
            Quad::new(
                Subject::Blank("b0".to_string()),
                vocab::RDF_FIRST,
                Term::Literal(Literal::string("x")),
            ),
            Quad::new(
                Subject::Blank("b0".to_string()),
                vocab::RDF_REST,
                Term::Blank("b1".to_string()),
            ),
            Quad::new(
                Subject::Blank("b1".to_string()),
                vocab::RDF_FIRST,
                Term::Literal(Literal::string("y")),
            ),
            Quad::new(
                Subject::Blank("b1".to_string()),
                vocab::RDF_REST,
                Term::Iri(vocab::RDF_NIL.to_string()),
            ),
        ];
        let entries = entries_from_quads(&quads).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].path().to_string(),
            format!("{} :: 0", p("tags"))
        );
        assert_eq!(entries[0].value().as_string().unwrap(), "x");
        assert_eq!(
            entries[1].path().to_string(),
            format!("{} :: 1", p("tags"))
        );
        assert_eq!(entries[1].value().as_string().unwrap(), "y");
    }

    #[test]
    fn conflicting_values_on_one_path_fail() {
        // Two distinct lists under one predicate land different values on
        // the same (tags, 0) path.
        let quads = vec![
            Quad::new(iri(ROOT), p("tags"), Term::Blank("b0".to_string())),
            Quad::new(
                Subject::Blank("b0".to_string()),
                vocab::RDF_FIRST,
                Term::Literal(Literal::string("x")),
            ),
            Quad::new(
                Subject::Blank("b0".to_string()),
                vocab::RDF_REST,
                Term::Iri(vocab::RDF_NIL.to_string()),
            ),
            // A second, distinct list under the same predicate whose
            // member lands on the same (tags, 0) path with another value.
            Quad::new(iri(ROOT), p("tags"), Term::Blank("b2".to_string())),
            Quad::new(
                Subject::Blank("b2".to_string()),
                vocab::RDF_FIRST,
                Term::Literal(Literal::string("z")),
            ),
            Quad::new(
                Subject::Blank("b2".to_string()),
                vocab::RDF_REST,
                Term::Iri(vocab::RDF_NIL.to_string()),
            ),
        ];
        let err = entries_from_quads(&quads).unwrap_err();
        assert!(matches!(err, MerklizeError::ConflictingEntries { .. }));
    }

    #[test]
    fn named_graph_quads_are_ignored() {
        let mut quads = credential_quads();
        let mut named = quads[0].clone();
        named.graph = Some(zkvc_rdf::GraphName::Iri("https://example.com/g".to_string()));
        quads.push(named);
        let entries = entries_from_quads(&quads).unwrap();
        assert_eq!(entries.len(), 5);
    }
}
