//! # Sparse Merkle Tree
//!
//! Insertion, root computation, and proof generation over a fixed-depth
//! binary tree addressed by key bits. The tree is single-writer; once
//! built, read-only proof generation may be shared.

use std::sync::Arc;

use tracing::debug;

use zkvc_core::FieldElement;
use zkvc_crypto::Hasher;

use crate::error::TreeError;
use crate::node::Node;
use crate::proof::Proof;
use crate::storage::NodeStorage;

/// Default tree depth. Deep enough that 40-bit prefix collisions of
/// Poseidon digests are not a practical concern for document-sized trees.
pub const DEFAULT_DEPTH: u64 = 40;

/// A sparse Merkle tree over (key → value) bindings of field elements.
pub struct SparseMerkleTree<S: NodeStorage> {
    storage: S,
    hasher: Arc<dyn Hasher>,
    root: FieldElement,
    depth: u64,
}

impl<S: NodeStorage> SparseMerkleTree<S> {
    /// Create an empty tree of [`DEFAULT_DEPTH`].
    pub fn new(storage: S, hasher: Arc<dyn Hasher>) -> Self {
        Self::with_depth(storage, hasher, DEFAULT_DEPTH)
    }

    /// Create an empty tree of the given depth.
    pub fn with_depth(storage: S, hasher: Arc<dyn Hasher>, depth: u64) -> Self {
        Self {
            storage,
            hasher,
            root: FieldElement::zero(),
            depth,
        }
    }

    /// The current root. Zero for the empty tree.
    pub fn root(&self) -> &FieldElement {
        &self.root
    }

    /// The configured depth.
    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// Insert a (key → value) binding.
    ///
    /// The key's little-endian bits, starting at bit 0 for the root level,
    /// address the leaf. An existing leaf on the way down is pushed deeper
    /// until the two bit paths diverge.
    ///
    /// # Errors
    ///
    /// [`TreeError::KeyExists`] when the key is already bound,
    /// [`TreeError::TreeFull`] when the bit paths agree through the whole
    /// configured depth.
    pub fn add(&mut self, key: FieldElement, value: FieldElement) -> Result<(), TreeError> {
        let root = self.root.clone();
        self.root = self.add_leaf(&key, &value, &root, 0)?;
        Ok(())
    }

    /// Read the value bound to a key, if any.
    pub fn get(&self, key: &FieldElement) -> Result<Option<FieldElement>, TreeError> {
        let mut current = self.root.clone();
        for level in 0..self.depth {
            if current.is_zero() {
                return Ok(None);
            }
            match self.node(&current)? {
                Node::Leaf { key: k, value } => {
                    return Ok(if &k == key { Some(value) } else { None });
                }
                Node::Internal { left, right } => {
                    current = if key.bit(level) { right } else { left };
                }
            }
        }
        Ok(None)
    }

    /// Generate a membership or non-membership proof for a key.
    ///
    /// Siblings are listed from the leaf level toward the root, empty
    /// siblings included.
    pub fn generate_proof(&self, key: &FieldElement) -> Result<Proof, TreeError> {
        let mut siblings: Vec<FieldElement> = Vec::new();
        let mut existence = false;
        let mut aux: Option<(FieldElement, FieldElement)> = None;

        let mut current = self.root.clone();
        let mut terminated = false;
        for level in 0..self.depth {
            if current.is_zero() {
                // Empty slot: absence with no witness leaf.
                terminated = true;
                break;
            }
            match self.node(&current)? {
                Node::Leaf { key: k, value } => {
                    if &k == key {
                        existence = true;
                    } else {
                        aux = Some((k, value));
                    }
                    terminated = true;
                    break;
                }
                Node::Internal { left, right } => {
                    if key.bit(level) {
                        siblings.push(left);
                        current = right;
                    } else {
                        siblings.push(right);
                        current = left;
                    }
                }
            }
        }
        if !terminated {
            // Insertion bounds keep every leaf above the configured depth;
            // running past it means the stored tree is inconsistent.
            return Err(TreeError::NodeMissing(current.to_hex()));
        }

        // Collected root-first; proofs list leaf-first.
        siblings.reverse();
        let (aux_key, aux_value) = match aux {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        Ok(Proof {
            existence,
            siblings,
            aux_key,
            aux_value,
        })
    }

    /// Consume the tree, returning its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    // Recursive insertion. Returns the hash of the subtree rooted where
    // `current` was.
    fn add_leaf(
        &mut self,
        key: &FieldElement,
        value: &FieldElement,
        current: &FieldElement,
        level: u64,
    ) -> Result<FieldElement, TreeError> {
        if level >= self.depth {
            return Err(TreeError::TreeFull(self.depth));
        }
        if current.is_zero() {
            return self.store(Node::Leaf {
                key: key.clone(),
                value: value.clone(),
            });
        }
        match self.node(current)? {
            Node::Leaf {
                key: old_key,
                value: old_value,
            } => {
                if &old_key == key {
                    return Err(TreeError::KeyExists);
                }
                self.push_leaf(key, value, &old_key, &old_value, level)
            }
            Node::Internal { left, right } => {
                let node = if key.bit(level) {
                    let new_right = self.add_leaf(key, value, &right, level + 1)?;
                    Node::Internal {
                        left,
                        right: new_right,
                    }
                } else {
                    let new_left = self.add_leaf(key, value, &left, level + 1)?;
                    Node::Internal {
                        left: new_left,
                        right,
                    }
                };
                self.store(node)
            }
        }
    }

    // Push an existing leaf deeper until its bit path diverges from the
    // new leaf's, then hang both under one internal node.
    fn push_leaf(
        &mut self,
        new_key: &FieldElement,
        new_value: &FieldElement,
        old_key: &FieldElement,
        old_value: &FieldElement,
        level: u64,
    ) -> Result<FieldElement, TreeError> {
        // An internal node created here hangs leaves at `level + 1`, which
        // must stay within the configured depth.
        if level + 2 > self.depth {
            debug!(depth = self.depth, "key bit paths collide through full depth");
            return Err(TreeError::TreeFull(self.depth));
        }
        let new_bit = new_key.bit(level);
        let old_bit = old_key.bit(level);

        if new_bit == old_bit {
            let child = self.push_leaf(new_key, new_value, old_key, old_value, level + 1)?;
            let node = if new_bit {
                Node::Internal {
                    left: FieldElement::zero(),
                    right: child,
                }
            } else {
                Node::Internal {
                    left: child,
                    right: FieldElement::zero(),
                }
            };
            return self.store(node);
        }

        let new_hash = self.store(Node::Leaf {
            key: new_key.clone(),
            value: new_value.clone(),
        })?;
        let old_hash = self.store(Node::Leaf {
            key: old_key.clone(),
            value: old_value.clone(),
        })?;
        let node = if new_bit {
            Node::Internal {
                left: old_hash,
                right: new_hash,
            }
        } else {
            Node::Internal {
                left: new_hash,
                right: old_hash,
            }
        };
        self.store(node)
    }

    fn store(&mut self, node: Node) -> Result<FieldElement, TreeError> {
        let hash = node.hash(self.hasher.as_ref())?;
        self.storage.put(hash.clone(), node)?;
        Ok(hash)
    }

    fn node(&self, hash: &FieldElement) -> Result<Node, TreeError> {
        self.storage
            .get(hash)?
            .ok_or_else(|| TreeError::NodeMissing(hash.to_hex()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::verify_proof;
    use crate::storage::MemoryStorage;
    use zkvc_crypto::PoseidonHasher;

    fn tree() -> SparseMerkleTree<MemoryStorage> {
        SparseMerkleTree::new(MemoryStorage::new(), Arc::new(PoseidonHasher::new()))
    }

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    #[test]
    fn empty_tree_root_is_zero() {
        assert!(tree().root().is_zero());
    }

    #[test]
    fn single_insert_root_is_leaf_hash() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        let hasher = PoseidonHasher::new();
        let leaf = Node::Leaf {
            key: fe(1),
            value: fe(10),
        };
        assert_eq!(t.root(), &leaf.hash(&hasher).unwrap());
    }

    #[test]
    fn get_returns_bound_value() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        t.add(fe(2), fe(20)).unwrap();
        assert_eq!(t.get(&fe(1)).unwrap(), Some(fe(10)));
        assert_eq!(t.get(&fe(2)).unwrap(), Some(fe(20)));
        assert_eq!(t.get(&fe(3)).unwrap(), None);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        assert!(matches!(t.add(fe(1), fe(10)), Err(TreeError::KeyExists)));
        assert!(matches!(t.add(fe(1), fe(99)), Err(TreeError::KeyExists)));
    }

    #[test]
    fn root_is_insertion_order_independent() {
        let bindings = [(1u64, 10u64), (2, 20), (3, 30), (4, 40), (5, 50)];
        let mut forward = tree();
        for (k, v) in bindings {
            forward.add(fe(k), fe(v)).unwrap();
        }
        let mut reverse = tree();
        for (k, v) in bindings.iter().rev() {
            reverse.add(fe(*k), fe(*v)).unwrap();
        }
        assert_eq!(forward.root(), reverse.root());
    }

    #[test]
    fn membership_proof_verifies() {
        let mut t = tree();
        for k in 1..=8u64 {
            t.add(fe(k), fe(k * 100)).unwrap();
        }
        let hasher = PoseidonHasher::new();
        for k in 1..=8u64 {
            let proof = t.generate_proof(&fe(k)).unwrap();
            assert!(proof.existence);
            assert!(verify_proof(&hasher, t.root(), &proof, &fe(k), &fe(k * 100)));
        }
    }

    #[test]
    fn membership_proof_rejects_wrong_value() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        t.add(fe(2), fe(20)).unwrap();
        let hasher = PoseidonHasher::new();
        let proof = t.generate_proof(&fe(1)).unwrap();
        assert!(!verify_proof(&hasher, t.root(), &proof, &fe(1), &fe(11)));
    }

    #[test]
    fn non_membership_empty_slot_verifies() {
        let mut t = tree();
        // Keys 1 (…01) and 3 (…11) both start with bit 1, leaving the
        // root's bit-0 side empty.
        t.add(fe(1), fe(10)).unwrap();
        t.add(fe(3), fe(30)).unwrap();
        let hasher = PoseidonHasher::new();
        let absent = fe(2); // bit 0 is 0: empty slot
        let proof = t.generate_proof(&absent).unwrap();
        assert!(!proof.existence);
        assert!(proof.aux().is_none());
        assert!(verify_proof(&hasher, t.root(), &proof, &absent, &FieldElement::zero()));
    }

    #[test]
    fn non_membership_foreign_leaf_carries_aux() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        let hasher = PoseidonHasher::new();
        // With a single leaf at the root slot, any other key resolves to
        // that leaf.
        let absent = fe(5);
        let proof = t.generate_proof(&absent).unwrap();
        assert!(!proof.existence);
        assert_eq!(proof.aux(), Some((&fe(1), &fe(10))));
        assert!(verify_proof(&hasher, t.root(), &proof, &absent, &FieldElement::zero()));
    }

    #[test]
    fn non_membership_proof_fails_against_wrong_root() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        let hasher = PoseidonHasher::new();
        let proof = t.generate_proof(&fe(5)).unwrap();
        assert!(!verify_proof(
            &hasher,
            &fe(12345),
            &proof,
            &fe(5),
            &FieldElement::zero()
        ));
    }

    #[test]
    fn aux_leaf_cannot_witness_its_own_key() {
        let mut t = tree();
        t.add(fe(1), fe(10)).unwrap();
        let hasher = PoseidonHasher::new();
        let mut proof = t.generate_proof(&fe(5)).unwrap();
        // Tamper: claim non-membership of the aux leaf's own key.
        proof.aux_key = Some(fe(1));
        proof.aux_value = Some(fe(10));
        assert!(!verify_proof(&hasher, t.root(), &proof, &fe(1), &FieldElement::zero()));
    }

    #[test]
    fn shallow_tree_fills_up() {
        let hasher: Arc<dyn Hasher> = Arc::new(PoseidonHasher::new());
        let mut t = SparseMerkleTree::with_depth(MemoryStorage::new(), hasher, 2);
        // Keys 1 (…0001) and 5 (…0101) agree on bits 0 and 1, so a
        // depth-2 tree cannot separate them.
        t.add(fe(1), fe(10)).unwrap();
        assert!(matches!(t.add(fe(5), fe(50)), Err(TreeError::TreeFull(2))));
    }

    #[test]
    fn sibling_count_never_exceeds_depth() {
        let mut t = tree();
        for k in 1..=16u64 {
            t.add(fe(k), fe(k)).unwrap();
        }
        let proof = t.generate_proof(&fe(9)).unwrap();
        assert!((proof.siblings.len() as u64) <= t.depth());
    }
}
