//! # Hashing Error Types
//!
//! Structured errors for hashing operations, built with `thiserror`.

use thiserror::Error;

/// Errors from hash computation.
#[derive(Error, Debug)]
pub enum HashError {
    /// The permutation accepts a bounded number of inputs per call.
    #[error("too many inputs for one permutation: {got} (maximum {max})")]
    TooManyInputs {
        /// How many inputs were supplied.
        got: usize,
        /// The parameter-set maximum.
        max: usize,
    },

    /// The permutation needs at least one input.
    #[error("the permutation needs at least one input")]
    EmptyInput,

    /// An input element could not be carried into the backend field type.
    #[error("input is not a canonical field element: {0}")]
    NonCanonicalInput(String),

    /// The hash backend rejected the computation.
    #[error("hash backend error: {0}")]
    Backend(String),
}
