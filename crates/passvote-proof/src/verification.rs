//! Passport verification orchestrator.
//!
//! Turns a passport record, a proposal restriction and a signing identity
//! into a signed, timestamped [`VerificationProof`] bound to one vote.

use alloy_primitives::Address;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use passvote_core::{PassportRecord, ProposalRestriction, ProtocolConfig};
use passvote_crypto::{recover_typed_signer, ActionType, Hash, SigningIdentity, TypedSignature};

use crate::age::classify_birth_date_at;
use crate::eligibility::{generate_eligibility_proof, verify_eligibility_proof, EligibilityTree};
use crate::error::{ProofError, VerificationError};
use crate::nonce::Nonce;

pub const REASON_NO_PASSPORT: &str = "No passport data available";
pub const REASON_INVALID_PASSPORT: &str = "Invalid passport data";
pub const REASON_AGE: &str = "Age requirement not met";
pub const REASON_COUNTRY: &str = "Country not eligible";

/// Outcome of a local eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EligibilityResult {
    fn eligible() -> Self {
        Self {
            eligible: true,
            reason: None,
            details: None,
        }
    }

    fn rejected(reason: &str, details: impl Into<String>) -> Self {
        Self {
            eligible: false,
            reason: Some(reason.to_string()),
            details: Some(details.into()),
        }
    }
}

/// The fields that are both EIP-712 hashed and transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationPayload {
    pub merkle_root: Hash,
    pub merkle_proof: Vec<Hash>,
    pub merkle_leaf: Hash,
    pub post_id: String,
    pub vote_option: String,
    pub nonce: String,
    /// Unix seconds.
    pub timestamp: u64,
}

impl VerificationPayload {
    /// The payload as a typed-data message.
    pub fn to_message(&self) -> Result<Value, ProofError> {
        serde_json::to_value(self).map_err(|e| ProofError::Serialization(e.to_string()))
    }
}

/// A signed verification payload. Built fresh for every vote and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationProof {
    pub signature: TypedSignature,
    #[serde(flatten)]
    pub payload: VerificationPayload,
}

/// An individual audit check.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, failure: impl FnOnce() -> String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: if passed { None } else { Some(failure()) },
        }
    }
}

/// Result of auditing a verification proof the way the server would.
#[derive(Debug, Clone, Serialize)]
pub struct ProofAudit {
    pub valid: bool,
    pub checks: Vec<VerificationCheck>,
    /// Address recovered from the signature, if recovery succeeded.
    pub signer: Option<Address>,
}

/// Builds and checks verification proofs under one protocol configuration.
#[derive(Debug, Clone, Default)]
pub struct PassportVerifier {
    config: ProtocolConfig,
}

impl PassportVerifier {
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Local eligibility check against today's date. No network, no signing.
    pub fn check_eligibility(
        &self,
        passport: Option<&PassportRecord>,
        restriction: &ProposalRestriction,
    ) -> EligibilityResult {
        self.check_eligibility_at(passport, restriction, Utc::now().date_naive())
    }

    pub fn check_eligibility_at(
        &self,
        passport: Option<&PassportRecord>,
        restriction: &ProposalRestriction,
        today: NaiveDate,
    ) -> EligibilityResult {
        let Some(passport) = passport else {
            return EligibilityResult::rejected(REASON_NO_PASSPORT, "Please scan your passport first");
        };

        let bucket = match classify_birth_date_at(&passport.date_of_birth, today) {
            Ok(bucket) => bucket,
            Err(ProofError::Underage { .. }) => {
                return EligibilityResult::rejected(REASON_AGE, "You must be at least 18 years old")
            }
            Err(e) => return EligibilityResult::rejected(REASON_INVALID_PASSPORT, e.to_string()),
        };

        if bucket < restriction.min_age_bucket() {
            return EligibilityResult::rejected(
                REASON_AGE,
                format!(
                    "This proposal requires age range {} or higher",
                    restriction.min_age_bucket()
                ),
            );
        }

        if !restriction.allows_country(&passport.issuing_state) {
            return EligibilityResult::rejected(
                REASON_COUNTRY,
                format!(
                    "This proposal is restricted to: {}",
                    restriction.allowed_countries().join(", ")
                ),
            );
        }

        EligibilityResult::eligible()
    }

    /// Build a signed verification proof timestamped now.
    pub fn generate_verification_proof(
        &self,
        passport: Option<&PassportRecord>,
        restriction: &ProposalRestriction,
        identity: Option<&SigningIdentity>,
        nonce: &Nonce,
        post_id: &str,
        vote_option: &str,
    ) -> Result<VerificationProof, VerificationError> {
        let now = Utc::now().timestamp().max(0) as u64;
        self.generate_verification_proof_at(
            passport,
            restriction,
            identity,
            nonce,
            post_id,
            vote_option,
            now,
        )
    }

    /// Build a signed verification proof with an explicit `timestamp`
    /// (unix seconds). Eligibility is judged on the timestamp's date.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_verification_proof_at(
        &self,
        passport: Option<&PassportRecord>,
        restriction: &ProposalRestriction,
        identity: Option<&SigningIdentity>,
        nonce: &Nonce,
        post_id: &str,
        vote_option: &str,
        timestamp: u64,
    ) -> Result<VerificationProof, VerificationError> {
        let today = DateTime::from_timestamp(timestamp as i64, 0)
            .map(|t| t.date_naive())
            .unwrap_or_else(|| Utc::now().date_naive());

        let check = self.check_eligibility_at(passport, restriction, today);
        if !check.eligible {
            return Err(VerificationError::NotEligible {
                reason: check
                    .reason
                    .unwrap_or_else(|| "Not eligible to vote".to_string()),
                details: check.details,
            });
        }

        let passport = passport
            .ok_or_else(|| VerificationError::InvalidPassportData("no passport record".into()))?;
        passport
            .validate()
            .map_err(|e| VerificationError::InvalidPassportData(e.to_string()))?;

        let identity = identity.ok_or(VerificationError::SigningUnavailable)?;

        let bucket = classify_birth_date_at(&passport.date_of_birth, today)?;
        let eligibility = generate_eligibility_proof(restriction, bucket, &passport.issuing_state)?;

        if let Some(advertised) = restriction.eligibility_root() {
            if advertised != eligibility.root {
                return Err(VerificationError::RootMismatch {
                    advertised: advertised.to_string(),
                    computed: eligibility.root.to_string(),
                });
            }
        }

        let payload = VerificationPayload {
            merkle_root: eligibility.root,
            merkle_proof: eligibility.proof,
            merkle_leaf: eligibility.leaf,
            post_id: post_id.to_string(),
            vote_option: vote_option.to_string(),
            nonce: nonce.value().to_string(),
            timestamp,
        };

        let signature = identity
            .sign_typed(ActionType::PassportVerification, &payload.to_message()?)
            .map_err(|e| VerificationError::SigningFailed(e.to_string()))?;

        tracing::info!(
            post_id = %payload.post_id,
            root = %payload.merkle_root,
            nonce = %payload.nonce,
            server_nonce = nonce.is_server_issued(),
            timestamp = payload.timestamp,
            "generated verification proof"
        );

        Ok(VerificationProof { signature, payload })
    }

    /// Reject a payload whose timestamp is outside the freshness window
    /// around `now` (unix seconds).
    pub fn check_freshness(
        &self,
        payload: &VerificationPayload,
        now: u64,
    ) -> Result<(), VerificationError> {
        let age_secs = now as i64 - payload.timestamp as i64;
        if age_secs.unsigned_abs() > self.config.freshness_window_secs {
            tracing::warn!(
                age_secs,
                window = self.config.freshness_window_secs,
                "verification proof outside freshness window"
            );
            return Err(VerificationError::ProofExpired { age_secs });
        }
        Ok(())
    }

    /// Run the checks a verifier applies to a submitted proof.
    ///
    /// The signature must recover to `expected_signer`.
    pub fn audit_verification_proof(
        &self,
        proof: &VerificationProof,
        restriction: &ProposalRestriction,
        expected_signer: Address,
        now: u64,
    ) -> Result<ProofAudit, VerificationError> {
        let payload = &proof.payload;
        let mut checks = Vec::new();

        let expected_root = EligibilityTree::build(restriction).root();
        let root_matches = payload.merkle_root == expected_root;
        checks.push(VerificationCheck::new("merkle_root_matches", root_matches, || {
            format!(
                "proof root {} does not match restriction root {}",
                payload.merkle_root, expected_root
            )
        }));

        let path_valid =
            verify_eligibility_proof(&payload.merkle_proof, &payload.merkle_leaf, &payload.merkle_root);
        checks.push(VerificationCheck::new("merkle_proof_valid", path_valid, || {
            "merkle path does not lead to the proof root".into()
        }));

        let freshness = self.check_freshness(payload, now);
        checks.push(VerificationCheck::new("timestamp_fresh", freshness.is_ok(), || {
            freshness
                .as_ref()
                .err()
                .map(ToString::to_string)
                .unwrap_or_default()
        }));

        let recovered = recover_typed_signer(
            ActionType::PassportVerification,
            &payload.to_message()?,
            &proof.signature,
        );
        let signer_matches = recovered
            .as_ref()
            .is_ok_and(|addr| *addr == expected_signer);
        checks.push(VerificationCheck::new(
            "signature_matches_signer",
            signer_matches,
            || match &recovered {
                Ok(addr) => format!("signature recovers to {}, expected {}", addr, expected_signer),
                Err(e) => e.to_string(),
            },
        ));

        let signer = recovered.ok();
        let valid = checks.iter().all(|c| c.passed);

        tracing::debug!(valid, signer = ?signer, "audited verification proof");

        Ok(ProofAudit {
            valid,
            checks,
            signer,
        })
    }
}
