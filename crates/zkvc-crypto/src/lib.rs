#![deny(missing_docs)]

//! # zkvc-crypto — ZK-Friendly Hashing for the ZKVC Merklization Stack
//!
//! This crate provides the hashing capability the rest of the workspace
//! injects at construction time:
//!
//! - **[`Hasher`]** — the capability trait: a pure, deterministic map from
//!   a sequence of field elements (or a byte string) to one field element.
//! - **[`PoseidonHasher`]** — the default implementation: Poseidon over the
//!   BN254 scalar field with the circomlib-compatible parameter set, plus
//!   the 31-byte-chunk sponge for byte inputs.
//!
//! There is no global default hasher. Callers that want the standard
//! behavior construct a [`PoseidonHasher`] and pass it down explicitly.

pub mod error;
pub mod hasher;
pub mod poseidon;

// Re-export primary types.
pub use error::HashError;
pub use hasher::Hasher;
pub use poseidon::PoseidonHasher;
