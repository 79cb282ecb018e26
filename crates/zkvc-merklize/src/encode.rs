//! # Field Encoders
//!
//! Injective encodings of paths and typed values into single field
//! elements — the (key, value) pairs the sparse Merkle tree stores.
//!
//! Every rule here is part of the commitment format: a change to any of
//! them changes every credential root.

use num_bigint::Sign;
use num_traits::Zero;

use zkvc_core::{CoreError, FieldElement, Path, PathPart, TypedValue, Value};
use zkvc_crypto::Hasher;

use crate::error::MerklizeError;

/// Encode a typed value as one field element.
///
/// | Variant | Encoding |
/// |---|---|
/// | Bool | 0 or 1 |
/// | Int64 | the signed residue (negative *n* is *q* + *n*) |
/// | BigInt | the exact residue; |v| ≥ *q* is out of range |
/// | Double | IEEE-754 bits as an unsigned 64-bit integer |
/// | String, Bytes, Iri | the byte-sponge hash |
/// | Time | nanoseconds since the Unix epoch as a signed 64-bit integer |
pub fn value_mt_entry(
    value: &TypedValue,
    hasher: &dyn Hasher,
) -> Result<FieldElement, MerklizeError> {
    let element = match value.value() {
        Value::Bool(b) => FieldElement::from_u64(u64::from(*b)),
        Value::Int64(i) => FieldElement::from_i64(*i),
        Value::BigInt(b) => {
            let magnitude = b.magnitude().clone();
            match b.sign() {
                Sign::Minus => {
                    if &magnitude >= zkvc_core::field::field_prime() {
                        return Err(CoreError::ValueOutOfRange(b.to_string()).into());
                    }
                    FieldElement::from_biguint(zkvc_core::field::field_prime() - magnitude)
                }
                _ => FieldElement::try_from_biguint(magnitude)
                    .map_err(|_| CoreError::ValueOutOfRange(b.to_string()))?,
            }
        }
        Value::Double(f) => FieldElement::from_u64(f.to_bits()),
        Value::String(s) => hasher.hash_bytes(s.as_bytes())?,
        Value::Time(t) => {
            let nanos = t
                .timestamp_nanos_opt()
                .ok_or_else(|| CoreError::ValueOutOfRange(t.to_rfc3339()))?;
            FieldElement::from_i64(nanos)
        }
        Value::Bytes(b) => hasher.hash_bytes(b)?,
        Value::Iri(s) => hasher.hash_bytes(s.as_bytes())?,
    };
    Ok(element)
}

/// Encode a path as one field element: each part maps into the field
/// (IRIs through the byte sponge, indices directly), then the sequence
/// folds through one hash call, root-first.
pub fn path_mt_entry(path: &Path, hasher: &dyn Hasher) -> Result<FieldElement, MerklizeError> {
    if path.is_empty() {
        return Err(CoreError::InvalidPath("cannot encode an empty path".to_string()).into());
    }
    let parts: Vec<FieldElement> = path
        .parts()
        .iter()
        .map(|part| match part {
            PathPart::Iri(s) => hasher.hash_bytes(s.as_bytes()),
            PathPart::Index(i) => Ok(FieldElement::from_u64(*i as u64)),
        })
        .collect::<Result<_, _>>()?;
    Ok(hasher.hash(&parts)?)
}

/// Decode a field element back to the Int64 it encodes, when it does.
/// Residues in `[0, 2^63)` are non-negative; residues in
/// `(q − 2^63, q)` are negative; anything else is not an Int64 encoding.
pub fn decode_int(element: &FieldElement) -> Option<i64> {
    use num_traits::ToPrimitive;

    let value = element.as_biguint();
    let two_63 = num_bigint::BigUint::from(1u8) << 63;
    if value < &two_63 {
        return value.to_u64().map(|v| v as i64);
    }
    let negated = zkvc_core::field::field_prime() - value;
    if negated <= two_63 && !negated.is_zero() {
        // The magnitude fits a u64 (2^63 at most); wrapping negation
        // maps 2^63 itself onto i64::MIN.
        let magnitude = negated.to_u64()?;
        return Some((magnitude as i64).wrapping_neg());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use num_bigint::BigInt;
    use zkvc_crypto::PoseidonHasher;

    fn hasher() -> PoseidonHasher {
        PoseidonHasher::new()
    }

    // ── Signed integer encoding vectors ─────────────────────────

    #[test]
    fn int64_minus_one_renders_as_prime_minus_one() {
        let v = value_mt_entry(&TypedValue::int64(-1), &hasher()).unwrap();
        assert_eq!(
            v.to_decimal_string(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495616"
        );
    }

    #[test]
    fn int64_minus_two_renders_one_below() {
        let v = value_mt_entry(&TypedValue::int64(-2), &hasher()).unwrap();
        assert_eq!(
            v.to_decimal_string(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495615"
        );
    }

    #[test]
    fn int64_min_renders_reference_vector() {
        let v = value_mt_entry(&TypedValue::int64(i64::MIN), &hasher()).unwrap();
        assert_eq!(
            v.to_decimal_string(),
            "21888242871839275222246405745257275088548364400416034343688980814538953719809"
        );
    }

    #[test]
    fn int64_positive_is_identity() {
        let v = value_mt_entry(&TypedValue::int64(19960424), &hasher()).unwrap();
        assert_eq!(v.to_decimal_string(), "19960424");
    }

    // ── Other variants ──────────────────────────────────────────

    #[test]
    fn bool_encodes_as_zero_or_one() {
        assert!(value_mt_entry(&TypedValue::bool(false), &hasher())
            .unwrap()
            .is_zero());
        assert_eq!(
            value_mt_entry(&TypedValue::bool(true), &hasher()).unwrap(),
            FieldElement::one()
        );
    }

    #[test]
    fn double_encodes_ieee_bits() {
        let v = value_mt_entry(&TypedValue::double(1.5), &hasher()).unwrap();
        assert_eq!(v, FieldElement::from_u64(1.5f64.to_bits()));
    }

    #[test]
    fn string_and_iri_share_the_byte_sponge() {
        let h = hasher();
        let s = value_mt_entry(&TypedValue::string("https://x"), &h).unwrap();
        let i = value_mt_entry(&TypedValue::iri("https://x"), &h).unwrap();
        assert_eq!(s, i);
        assert_eq!(s, h.hash_bytes(b"https://x").unwrap());
    }

    #[test]
    fn time_encodes_epoch_nanoseconds() {
        let t = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        let v = value_mt_entry(&TypedValue::time(t), &hasher()).unwrap();
        assert_eq!(v.to_decimal_string(), "1000000000");

        let before_epoch = Utc.with_ymd_and_hms(1958, 7, 18, 0, 0, 0).unwrap();
        let v = value_mt_entry(&TypedValue::time(before_epoch), &hasher()).unwrap();
        assert_eq!(
            v,
            FieldElement::from_i64(before_epoch.timestamp_nanos_opt().unwrap())
        );
    }

    #[test]
    fn bigint_outside_field_is_out_of_range() {
        let big: BigInt = BigInt::parse_bytes(
            b"21888242871839275222246405745257275088548364400416034343698204186575808495617",
            10,
        )
        .unwrap();
        assert!(value_mt_entry(&TypedValue::bigint(big.clone()), &hasher()).is_err());
        assert!(value_mt_entry(&TypedValue::bigint(-big), &hasher()).is_err());
        let ok = BigInt::from(u64::MAX) * 4;
        assert!(value_mt_entry(&TypedValue::bigint(ok), &hasher()).is_ok());
    }

    // ── Path encoding ───────────────────────────────────────────

    #[test]
    fn path_folds_hashed_parts_in_order() {
        let h = hasher();
        let path = Path::new(vec![
            PathPart::from("https://example.com/ns#credentialSubject"),
            PathPart::from(1usize),
            PathPart::from("https://example.com/ns#birthDate"),
        ])
        .unwrap();
        let expected = h
            .hash(&[
                h.hash_bytes(b"https://example.com/ns#credentialSubject").unwrap(),
                FieldElement::from_u64(1),
                h.hash_bytes(b"https://example.com/ns#birthDate").unwrap(),
            ])
            .unwrap();
        assert_eq!(path_mt_entry(&path, &h).unwrap(), expected);
    }

    #[test]
    fn path_order_matters() {
        let h = hasher();
        let a = Path::new(vec![PathPart::from("x"), PathPart::from(1usize)]).unwrap();
        let b = Path::new(vec![PathPart::from(1usize), PathPart::from("x")]).unwrap();
        assert_ne!(path_mt_entry(&a, &h).unwrap(), path_mt_entry(&b, &h).unwrap());
    }

    #[test]
    fn empty_path_is_invalid() {
        let empty = Path::from_parts(vec![]);
        assert!(path_mt_entry(&empty, &hasher()).is_err());
    }

    // ── Round trip ──────────────────────────────────────────────

    #[test]
    fn decode_int_round_trips_in_range_values() {
        let h = hasher();
        for v in [0i64, 1, -1, 19960424, i64::MAX, i64::MIN + 1, i64::MIN] {
            let encoded = value_mt_entry(&TypedValue::int64(v), &h).unwrap();
            assert_eq!(decode_int(&encoded), Some(v), "value {v}");
        }
    }

    #[test]
    fn decode_int_rejects_non_integer_residues() {
        let h = hasher();
        let hashed = value_mt_entry(&TypedValue::string("Bahamas"), &h).unwrap();
        // A sponge digest is (overwhelmingly) outside both integer bands.
        assert_eq!(decode_int(&hashed), None);
    }
}
