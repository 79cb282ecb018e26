//! # Hasher Capability Trait
//!
//! The hashing capability every field-element consumer in the workspace
//! receives by injection. Implementations must be pure: the same inputs
//! always produce the same output, and no state is shared between calls.
//!
//! The trait requires `Send + Sync` so a built merklizer can serve
//! concurrent read-only proof requests.

use zkvc_core::FieldElement;

use crate::error::HashError;

/// A deterministic, collision-resistant map into the scalar field.
pub trait Hasher: Send + Sync {
    /// Hash a sequence of field elements into one.
    ///
    /// # Errors
    ///
    /// Fails with [`HashError::TooManyInputs`] when the sequence exceeds
    /// the implementation's permutation width, and with backend errors
    /// surfaced as [`HashError::Backend`].
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, HashError>;

    /// Hash an arbitrary byte string into one field element.
    ///
    /// Byte inputs are absorbed through a sponge whose packing keeps them
    /// disjoint from [`Hasher::hash`]'s input space.
    fn hash_bytes(&self, msg: &[u8]) -> Result<FieldElement, HashError>;
}
