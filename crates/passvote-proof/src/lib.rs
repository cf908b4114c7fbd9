//! Passvote Proof: anonymous eligibility proofs for passport-gated votes.
//!
//! Provides:
//! - Age classification from MRZ dates of birth into coarse buckets
//! - Eligibility sets and sorted-pair Merkle membership proofs
//! - Single-use nonces
//! - The passport verification orchestrator that binds a proof to one vote

pub mod age;
pub mod eligibility;
pub mod error;
pub mod nonce;
pub mod verification;

pub use age::{age_bucket_description, classify_birth_date, classify_birth_date_at};
pub use eligibility::{
    eligible_combinations, generate_eligibility_proof, is_eligible_combination,
    verify_eligibility_proof, verify_eligibility_proof_hex, EligibilityProof, EligibilityTree,
};
pub use error::{ErrorCategory, ProofError, VerificationError};
pub use nonce::Nonce;
pub use verification::{
    EligibilityResult, PassportVerifier, ProofAudit, VerificationCheck, VerificationPayload,
    VerificationProof,
};
