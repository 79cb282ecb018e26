//! # Field Arithmetic — BN254 Scalar Residues
//!
//! All values in the merklization pipeline live as residues modulo the
//! BN254 scalar field prime *q*. This module defines [`FieldElement`], the
//! sole carrier of such residues.
//!
//! ## Invariant
//!
//! The inner `BigUint` is private and always canonical (in `[0, q)`). Every
//! constructor reduces modulo *q*; overflow is not an error, it is
//! reduction. The one exception is [`FieldElement::try_from_biguint`],
//! which refuses values ≥ *q* for callers that require exactness.

use std::fmt;
use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{Num, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Decimal representation of the BN254 scalar field prime.
const FIELD_PRIME_DEC: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// The BN254 scalar field prime *q*.
pub fn field_prime() -> &'static BigUint {
    static PRIME: OnceLock<BigUint> = OnceLock::new();
    PRIME.get_or_init(|| {
        BigUint::from_str_radix(FIELD_PRIME_DEC, 10)
            .expect("field prime constant parses")
    })
}

/// A canonical residue modulo the BN254 scalar field prime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(BigUint::from(1u8))
    }

    /// Create a field element from an unsigned 64-bit integer.
    pub fn from_u64(v: u64) -> Self {
        // u64 < q, no reduction needed.
        Self(BigUint::from(v))
    }

    /// Create a field element from a signed 64-bit integer.
    ///
    /// Negative *n* maps to *q* + *n*, so `from_i64(-1)` is *q* − 1.
    pub fn from_i64(v: i64) -> Self {
        if v >= 0 {
            Self::from_u64(v as u64)
        } else {
            // |v| ≤ 2^63 < q, so q - |v| never underflows.
            let abs = BigUint::from(v.unsigned_abs());
            Self(field_prime() - abs)
        }
    }

    /// Create a field element from an arbitrary-precision integer,
    /// reducing modulo *q*.
    pub fn from_biguint(v: BigUint) -> Self {
        Self(v % field_prime())
    }

    /// Create a field element from an arbitrary-precision integer,
    /// failing if the value is not already canonical.
    pub fn try_from_biguint(v: BigUint) -> Result<Self, CoreError> {
        if &v >= field_prime() {
            return Err(CoreError::ValueOutOfRange(v.to_string()));
        }
        Ok(Self(v))
    }

    /// Create a field element from big-endian bytes, reducing modulo *q*.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self::from_biguint(BigUint::from_bytes_be(bytes))
    }

    /// Parse a field element from a decimal string, reducing modulo *q*.
    pub fn from_decimal_str(s: &str) -> Result<Self, CoreError> {
        let v = BigUint::from_str_radix(s, 10)
            .map_err(|_| CoreError::ValueOutOfRange(format!("not a decimal integer: {s}")))?;
        Ok(Self::from_biguint(v))
    }

    /// Field addition: (a + b) mod *q*.
    pub fn add(&self, other: &Self) -> Self {
        Self((&self.0 + &other.0) % field_prime())
    }

    /// Field negation: −a mod *q* (zero stays zero).
    pub fn neg(&self) -> Self {
        if self.0.is_zero() {
            Self::zero()
        } else {
            Self(field_prime() - &self.0)
        }
    }

    /// Whether this is the zero element.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The bit of the canonical representation at position `i`
    /// (little-endian; bit 0 is the least significant).
    pub fn bit(&self, i: u64) -> bool {
        self.0.bit(i)
    }

    /// Access the canonical residue.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Render as a fixed 32-byte big-endian string.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let raw = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - raw.len()..].copy_from_slice(&raw);
        out
    }

    /// Render as 64 lowercase hex characters (big-endian).
    pub fn to_hex(&self) -> String {
        self.to_bytes_be().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Render as a fixed 32-byte little-endian string — the byte order
    /// zk tree tooling renders roots in.
    pub fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = self.to_bytes_be();
        out.reverse();
        out
    }

    /// Render as 64 lowercase hex characters (little-endian).
    pub fn to_hex_le(&self) -> String {
        self.to_bytes_le().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Render as a decimal string.
    pub fn to_decimal_string(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FieldElement::from_decimal_str(&s).map_err(de::Error::custom)
    }
}
