//! # Core Error Types
//!
//! Structured errors for the foundational types, built with `thiserror`.
//! Higher-level crates wrap these into their own hierarchies with `#[from]`.

use thiserror::Error;

/// Errors from foundational type operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value cannot be embedded in the prime field without loss.
    #[error("value out of range for the field: {0}")]
    ValueOutOfRange(String),

    /// A typed-value accessor was called for the wrong variant.
    #[error("incorrect type: expected {expected}, value is {actual}")]
    IncorrectType {
        /// The variant the accessor expects.
        expected: &'static str,
        /// The variant the value actually holds.
        actual: &'static str,
    },

    /// A path was constructed empty or from an unsupported part.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_out_of_range_display() {
        let err = CoreError::ValueOutOfRange("2^300".to_string());
        assert!(format!("{err}").contains("out of range"));
        assert!(format!("{err}").contains("2^300"));
    }

    #[test]
    fn incorrect_type_display_names_both_variants() {
        let err = CoreError::IncorrectType {
            expected: "Int64",
            actual: "String",
        };
        let msg = format!("{err}");
        assert!(msg.contains("Int64"));
        assert!(msg.contains("String"));
    }

    #[test]
    fn invalid_path_display() {
        let err = CoreError::InvalidPath("empty path".to_string());
        assert!(format!("{err}").contains("empty path"));
    }
}
