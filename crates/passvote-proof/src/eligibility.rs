//! Eligibility sets and their Merkle proofs.
//!
//! A restriction expands into the set of `"{bucket}_{country}"` combinations
//! it admits. The set is hashed into a sorted-pair Merkle tree whose root is
//! the proposal's eligibility root; a voter proves membership of their own
//! combination without revealing which one it is.

use serde::{Deserialize, Serialize};

use passvote_core::{AgeBucket, Combination, ProposalRestriction, ANY_COUNTRY};
use passvote_crypto::{keccak, merkle, parse_b256, Hash, MerkleTree};

use crate::error::ProofError;

/// Every combination admitted by `restriction`, bucket-major, countries in
/// the order given.
///
/// An empty country list or one containing `ANY` collapses to the single
/// `ANY` country; otherwise it is the full bucket × country product.
pub fn eligible_combinations(restriction: &ProposalRestriction) -> Vec<Combination> {
    let countries: Vec<&str> = if restriction.has_country_restrictions() {
        restriction
            .allowed_countries()
            .iter()
            .map(String::as_str)
            .collect()
    } else {
        vec![ANY_COUNTRY]
    };

    restriction
        .min_age_bucket()
        .iter_from()
        .flat_map(|bucket| {
            countries
                .iter()
                .map(move |country| Combination::new(bucket, country))
        })
        .collect()
}

/// Whether a (bucket, country) pair passes `restriction`.
pub fn is_eligible_combination(
    bucket: AgeBucket,
    country: &str,
    restriction: &ProposalRestriction,
) -> bool {
    bucket >= restriction.min_age_bucket() && restriction.allows_country(country)
}

/// The combination a voter proves for `restriction`: their own country, or
/// `ANY` when the restriction has no country dimension.
pub fn voter_combination(
    restriction: &ProposalRestriction,
    bucket: AgeBucket,
    country: &str,
) -> Combination {
    if restriction.has_country_restrictions() {
        Combination::new(bucket, country)
    } else {
        Combination::new(bucket, ANY_COUNTRY)
    }
}

/// Leaf hash of a combination.
pub fn combination_leaf(combination: &Combination) -> Hash {
    keccak(combination.as_bytes())
}

/// Merkle tree over the eligibility set of one restriction.
#[derive(Debug, Clone)]
pub struct EligibilityTree {
    combinations: Vec<Combination>,
    tree: MerkleTree,
}

impl EligibilityTree {
    pub fn build(restriction: &ProposalRestriction) -> Self {
        let combinations = eligible_combinations(restriction);
        let leaves = combinations.iter().map(combination_leaf).collect();
        Self {
            combinations,
            tree: MerkleTree::from_leaves(leaves),
        }
    }

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    /// Sibling path for `combination`, or `None` when it is not in the set.
    pub fn proof(&self, combination: &Combination) -> Option<Vec<Hash>> {
        self.tree.proof(&combination_leaf(combination))
    }
}

/// Membership proof of one combination in an eligibility tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityProof {
    pub proof: Vec<Hash>,
    pub leaf: Hash,
    pub root: Hash,
    pub combination: Combination,
}

/// Prove that the voter's (bucket, country) belongs to `restriction`'s set.
pub fn generate_eligibility_proof(
    restriction: &ProposalRestriction,
    bucket: AgeBucket,
    country: &str,
) -> Result<EligibilityProof, ProofError> {
    let tree = EligibilityTree::build(restriction);
    let combination = voter_combination(restriction, bucket, country);
    let leaf = combination_leaf(&combination);

    let proof = tree
        .proof(&combination)
        .ok_or_else(|| ProofError::NotInSet(combination.to_string()))?;

    tracing::debug!(
        bucket = %bucket,
        set_size = tree.combinations().len(),
        path_len = proof.len(),
        root = %tree.root(),
        "generated eligibility proof"
    );

    Ok(EligibilityProof {
        proof,
        leaf,
        root: tree.root(),
        combination,
    })
}

/// Replay the proof. A mismatch is `false`, never an error.
pub fn verify_eligibility_proof(proof: &[Hash], leaf: &Hash, root: &Hash) -> bool {
    merkle::verify_proof(proof, leaf, root)
}

/// Hex front-end for [`verify_eligibility_proof`]. Errors only on malformed hex.
pub fn verify_eligibility_proof_hex(
    proof: &[String],
    leaf: &str,
    root: &str,
) -> Result<bool, ProofError> {
    let proof = proof
        .iter()
        .map(|p| parse_b256(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(verify_eligibility_proof(
        &proof,
        &parse_b256(leaf)?,
        &parse_b256(root)?,
    ))
}
