//! # Poseidon over BN254
//!
//! The default [`Hasher`] implementation: Poseidon with the
//! circomlib-compatible parameter set over the BN254 scalar field, as
//! verified by zero-knowledge circuits built on the same constants.
//!
//! ## Construction
//!
//! - **Vector inputs** (`hash`): one permutation call, 1..=16 inputs,
//!   state width t = n + 1, output is state element 0.
//! - **Byte inputs** (`hash_bytes`): a sponge over the same permutation.
//!   The message is split into 31-byte big-endian chunks (the final chunk
//!   right-padded with zeros) and absorbed into a 16-element frame. A full
//!   frame is hashed and its digest becomes element 0 of the next frame.
//!   A trailing partially-filled frame is hashed last; the empty message
//!   hashes the all-zero frame.
//!
//! The permutation itself comes from the `poseidon-rs` crate; its `ff_ce`
//! field type never crosses this module's boundary.

use ff::{PrimeField, PrimeFieldRepr};
use num_bigint::BigUint;
use poseidon_rs::{Fr, Poseidon};

use zkvc_core::FieldElement;

use crate::error::HashError;
use crate::hasher::Hasher;

/// Maximum number of inputs one permutation call accepts.
const MAX_INPUTS: usize = 16;

/// Chunk size of the byte sponge. 31 bytes always fit a 254-bit element.
const SPONGE_CHUNK_SIZE: usize = 31;

/// Frame width of the byte sponge.
const SPONGE_FRAME: usize = 16;

/// Poseidon over BN254 with circomlib-compatible constants.
pub struct PoseidonHasher {
    permutation: Poseidon,
}

impl PoseidonHasher {
    /// Build a hasher. Constant tables are initialized once here and
    /// immutable afterwards.
    pub fn new() -> Self {
        Self {
            permutation: Poseidon::new(),
        }
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for PoseidonHasher {
    fn hash(&self, inputs: &[FieldElement]) -> Result<FieldElement, HashError> {
        if inputs.is_empty() {
            return Err(HashError::EmptyInput);
        }
        if inputs.len() > MAX_INPUTS {
            return Err(HashError::TooManyInputs {
                got: inputs.len(),
                max: MAX_INPUTS,
            });
        }
        let frs: Vec<Fr> = inputs
            .iter()
            .map(field_to_fr)
            .collect::<Result<_, _>>()?;
        let out = self.permutation.hash(frs).map_err(HashError::Backend)?;
        Ok(fr_to_field(&out))
    }

    fn hash_bytes(&self, msg: &[u8]) -> Result<FieldElement, HashError> {
        let mut inputs = vec![FieldElement::zero(); SPONGE_FRAME];
        let mut digest: Option<FieldElement> = None;
        let mut dirty = false;
        let mut k = 0;

        for chunk in msg.chunks_exact(SPONGE_CHUNK_SIZE) {
            dirty = true;
            inputs[k] = FieldElement::from_bytes_be(chunk);
            if k == SPONGE_FRAME - 1 {
                let h = self.hash(&inputs)?;
                inputs = vec![FieldElement::zero(); SPONGE_FRAME];
                inputs[0] = h.clone();
                digest = Some(h);
                dirty = false;
                k = 1;
            } else {
                k += 1;
            }
        }

        let tail = msg.chunks_exact(SPONGE_CHUNK_SIZE).remainder();
        if !tail.is_empty() {
            // Right-pad the last chunk with zeros to the full chunk size.
            let mut buf = [0u8; SPONGE_CHUNK_SIZE];
            buf[..tail.len()].copy_from_slice(tail);
            inputs[k] = FieldElement::from_bytes_be(&buf);
            dirty = true;
        }

        if dirty || digest.is_none() {
            digest = Some(self.hash(&inputs)?);
        }

        Ok(digest.expect("sponge produced a digest"))
    }
}

/// Carry a canonical residue into the backend field type.
fn field_to_fr(fe: &FieldElement) -> Result<Fr, HashError> {
    Fr::from_str(&fe.to_decimal_string())
        .ok_or_else(|| HashError::NonCanonicalInput(fe.to_decimal_string()))
}

/// Carry a backend field value back into a canonical residue.
fn fr_to_field(fr: &Fr) -> FieldElement {
    let repr = fr.into_repr();
    let limbs: &[u64] = repr.as_ref();
    let mut bytes = Vec::with_capacity(limbs.len() * 8);
    // Limbs are little-endian words; render big-endian bytes.
    for limb in limbs.iter().rev() {
        bytes.extend_from_slice(&limb.to_be_bytes());
    }
    FieldElement::from_biguint(BigUint::from_bytes_be(&bytes))
}
