//! # Membership and Non-Membership Proofs
//!
//! A [`Proof`] witnesses either that a key is bound in the tree
//! (`existence = true`) or that it is absent. Absence comes in two shapes:
//! the addressed slot is empty (no auxiliary leaf), or the slot is
//! occupied by a leaf for a *different* key whose bit path shares the
//! traversed prefix — that other leaf's binding is the non-membership
//! witness.
//!
//! Siblings are listed from the leaf level toward the root, empty
//! siblings included, so a verifier can fold the path bottom-up without
//! any out-of-band shape information.

use serde::{Deserialize, Serialize};

use zkvc_core::FieldElement;
use zkvc_crypto::Hasher;

use crate::node::Node;

/// A (non-)membership proof for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Whether the key is bound in the tree.
    pub existence: bool,
    /// Sibling hashes along the traversed path, leaf level first.
    pub siblings: Vec<FieldElement>,
    /// Key of the foreign leaf occupying the slot, for non-membership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux_key: Option<FieldElement>,
    /// Value of the foreign leaf occupying the slot, for non-membership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux_value: Option<FieldElement>,
}

impl Proof {
    /// The foreign-leaf witness, when the slot is occupied by another key.
    pub fn aux(&self) -> Option<(&FieldElement, &FieldElement)> {
        match (&self.aux_key, &self.aux_value) {
            (Some(k), Some(v)) => Some((k, v)),
            _ => None,
        }
    }
}

/// Reconstruct the root from a proof and compare it to `root`.
///
/// For membership, `value` must be the bound value; for non-membership it
/// is ignored. Malformed proofs verify as `false` — this function never
/// fails.
pub fn verify_proof(
    hasher: &dyn Hasher,
    root: &FieldElement,
    proof: &Proof,
    key: &FieldElement,
    value: &FieldElement,
) -> bool {
    // The hash at the bottom of the traversed path.
    let mut current = if proof.existence {
        let leaf = Node::Leaf {
            key: key.clone(),
            value: value.clone(),
        };
        match leaf.hash(hasher) {
            Ok(h) => h,
            Err(_) => return false,
        }
    } else if let Some((aux_key, aux_value)) = proof.aux() {
        // A foreign leaf cannot witness non-membership of its own key.
        if aux_key == key {
            return false;
        }
        let leaf = Node::Leaf {
            key: aux_key.clone(),
            value: aux_value.clone(),
        };
        match leaf.hash(hasher) {
            Ok(h) => h,
            Err(_) => return false,
        }
    } else {
        FieldElement::zero()
    };

    // Fold bottom-up. siblings[0] sits at the deepest traversed level.
    let depth = proof.siblings.len();
    for (i, sibling) in proof.siblings.iter().enumerate() {
        let level = (depth - 1 - i) as u64;
        let node = if key.bit(level) {
            Node::Internal {
                left: sibling.clone(),
                right: current,
            }
        } else {
            Node::Internal {
                left: current,
                right: sibling.clone(),
            }
        };
        current = match node.hash(hasher) {
            Ok(h) => h,
            Err(_) => return false,
        };
    }

    current == *root
}
