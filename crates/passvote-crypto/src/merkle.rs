//! Binary Merkle tree with sorted-pair hashing.
//!
//! At every internal node the two children are ordered bytewise before being
//! concatenated and hashed, so a proof carries no left/right flags and two
//! parties can build identical trees without agreeing on leaf order. An odd
//! node at the end of a level is promoted to the next level unchanged.

use crate::error::CryptoError;
use crate::hashing::{keccak, parse_b256, Hash};

/// Hash two nodes after ordering them.
pub fn hash_sorted_pair(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(lo.as_slice());
    combined[32..].copy_from_slice(hi.as_slice());
    keccak(&combined)
}

/// A Merkle tree over pre-hashed leaves.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `layers[0]` holds the leaves; the last layer holds the root.
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build the tree. Leaves are used in the given order.
    pub fn from_leaves(leaves: Vec<Hash>) -> Self {
        let mut layers = vec![leaves];

        while layers.last().map_or(0, Vec::len) > 1 {
            let current = &layers[layers.len() - 1];
            let next: Vec<Hash> = current
                .chunks(2)
                .filter_map(|pair| {
                    pair.iter()
                        .copied()
                        .reduce(|left, right| hash_sorted_pair(&left, &right))
                })
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// The root. An empty tree has the zero hash as its root.
    pub fn root(&self) -> Hash {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.layers[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Sibling path for the first occurrence of `leaf`, bottom-up.
    /// `None` if the leaf is not in the tree.
    pub fn proof(&self, leaf: &Hash) -> Option<Vec<Hash>> {
        let mut index = self.layers[0].iter().position(|l| l == leaf)?;
        let mut path = Vec::new();

        for layer in &self.layers {
            let sibling = if index % 2 == 1 { index - 1 } else { index + 1 };
            if sibling < layer.len() {
                path.push(layer[sibling]);
            }
            index /= 2;
        }

        Some(path)
    }
}

/// Replay the sorted-pair hashing from `leaf` along `proof` and compare with
/// `root`. Never errors; a mismatch is simply `false`.
pub fn verify_proof(proof: &[Hash], leaf: &Hash, root: &Hash) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |acc, sibling| hash_sorted_pair(&acc, sibling));
    computed == *root
}

/// Hex front-end for [`verify_proof`]. Errors only on malformed hex.
pub fn verify_proof_hex(proof: &[String], leaf: &str, root: &str) -> Result<bool, CryptoError> {
    let proof = proof
        .iter()
        .map(|p| parse_b256(p))
        .collect::<Result<Vec<_>, _>>()?;
    let leaf = parse_b256(leaf)?;
    let root = parse_b256(root)?;
    Ok(verify_proof(&proof, &leaf, &root))
}
