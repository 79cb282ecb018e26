//! # Typed Values
//!
//! [`TypedValue`] replaces the untyped value holder of earlier credential
//! processors with a tagged variant: each kind owns its native payload,
//! and accessors for the wrong tag fail with
//! [`CoreError::IncorrectType`] instead of coercing.
//!
//! The optional `datatype` records the datatype IRI observed on the source
//! RDF literal (e.g. `xsd:dateTime` on a string that was parsed into a
//! timestamp), so callers can distinguish serialization provenance without
//! re-deriving it.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;

use crate::error::CoreError;

/// The payload of a [`TypedValue`], one variant per RDF literal kind the
/// merklizer models.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An `xsd:boolean` literal.
    Bool(bool),
    /// An integer literal that fits a signed 64-bit word.
    Int64(i64),
    /// An integer literal outside the 64-bit range.
    BigInt(BigInt),
    /// An `xsd:double` or `xsd:float` literal.
    Double(f64),
    /// A plain or `xsd:string` literal.
    String(String),
    /// An `xsd:dateTime` or `xsd:date` literal, normalized to UTC.
    Time(DateTime<Utc>),
    /// An `xsd:hexBinary` or `xsd:base64Binary` literal, decoded.
    Bytes(Vec<u8>),
    /// An IRI reference with no literal payload.
    Iri(String),
}

impl Value {
    /// The variant name, used in [`CoreError::IncorrectType`] diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int64(_) => "Int64",
            Value::BigInt(_) => "BigInt",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Time(_) => "Time",
            Value::Bytes(_) => "Bytes",
            Value::Iri(_) => "Iri",
        }
    }
}

/// A tagged value together with the datatype IRI observed in the source
/// RDF literal, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    value: Value,
    datatype: Option<String>,
}

macro_rules! accessor {
    ($is:ident, $as:ident, $variant:ident, $ty:ty, $expected:literal) => {
        /// Whether the value holds this variant.
        pub fn $is(&self) -> bool {
            matches!(self.value, Value::$variant(_))
        }

        /// Extract the payload, failing with
        /// [`CoreError::IncorrectType`] for any other variant.
        pub fn $as(&self) -> Result<$ty, CoreError> {
            match &self.value {
                Value::$variant(v) => Ok(v.clone()),
                other => Err(CoreError::IncorrectType {
                    expected: $expected,
                    actual: other.kind(),
                }),
            }
        }
    };
}

impl TypedValue {
    /// Wrap a payload with no recorded datatype.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            datatype: None,
        }
    }

    /// Record the source literal's datatype IRI.
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// A boolean value.
    pub fn bool(v: bool) -> Self {
        Self::new(Value::Bool(v))
    }

    /// A signed 64-bit integer value.
    pub fn int64(v: i64) -> Self {
        Self::new(Value::Int64(v))
    }

    /// An integer value outside the 64-bit range.
    pub fn bigint(v: BigInt) -> Self {
        Self::new(Value::BigInt(v))
    }

    /// A double-precision float value.
    pub fn double(v: f64) -> Self {
        Self::new(Value::Double(v))
    }

    /// A string value.
    pub fn string(v: impl Into<String>) -> Self {
        Self::new(Value::String(v.into()))
    }

    /// A timestamp value.
    pub fn time(v: DateTime<Utc>) -> Self {
        Self::new(Value::Time(v))
    }

    /// A byte-sequence value.
    pub fn bytes(v: Vec<u8>) -> Self {
        Self::new(Value::Bytes(v))
    }

    /// An IRI reference value.
    pub fn iri(v: impl Into<String>) -> Self {
        Self::new(Value::Iri(v.into()))
    }

    /// The payload variant.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The datatype IRI observed on the source literal, if any.
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    accessor!(is_bool, as_bool, Bool, bool, "Bool");
    accessor!(is_int64, as_int64, Int64, i64, "Int64");
    accessor!(is_bigint, as_bigint, BigInt, BigInt, "BigInt");
    accessor!(is_double, as_double, Double, f64, "Double");
    accessor!(is_string, as_string, String, String, "String");
    accessor!(is_time, as_time, Time, DateTime<Utc>, "Time");
    accessor!(is_bytes, as_bytes, Bytes, Vec<u8>, "Bytes");
    accessor!(is_iri, as_iri, Iri, String, "Iri");
}
