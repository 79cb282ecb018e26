#![deny(missing_docs)]

//! # zkvc-core — Foundational Types for the ZKVC Merklization Stack
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, `chrono`, and `num-bigint`/`num-traits` from the external
//! ecosystem.
//!
//! ## Design Principles
//!
//! 1. **[`FieldElement`] is the sole carrier of field-scale values.** Every
//!    constructor reduces modulo the BN254 scalar prime; a non-canonical
//!    residue cannot be observed.
//!
//! 2. **Tagged variants instead of dynamic values.** [`TypedValue`] owns its
//!    payload per variant; a wrong-tag accessor fails with
//!    [`CoreError::IncorrectType`] instead of guessing.
//!
//! 3. **[`CoreError`] hierarchy.** Structured errors with `thiserror` — no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod entry;
pub mod error;
pub mod field;
pub mod path;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use entry::RdfEntry;
pub use error::CoreError;
pub use field::FieldElement;
pub use path::{Path, PathPart};
pub use value::{TypedValue, Value};
