//! Integration test: passport → eligibility proof → signed verification proof.
//!
//! Exercises passvote-core, passvote-crypto and passvote-proof together the
//! way a voter's device and a verifier would.

use std::collections::HashSet;

use chrono::NaiveDate;
use passvote_core::{AgeBucket, PassportRecord, ProposalRestriction, ProtocolConfig};
use passvote_crypto::{keccak, to_hex, SigningIdentity};
use passvote_proof::{
    classify_birth_date_at, eligible_combinations, generate_eligibility_proof,
    verify_eligibility_proof, verify_eligibility_proof_hex, EligibilityTree, Nonce,
    PassportVerifier, VerificationError,
};

/// 2026-06-15, the reference "today" for these tests.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

fn noon_timestamp() -> u64 {
    today().and_hms_opt(12, 0, 0).unwrap().and_utc().timestamp() as u64
}

fn reader_json(dob: &str, state: &str) -> String {
    format!(
        r#"{{
            "personalData": {{
                "firstName": "MARIA",
                "lastName": "IVANOVA",
                "nationality": "{state}",
                "issuingState": "{state}",
                "dateOfBirth": "{dob}",
                "dateOfExpiry": "310101",
                "gender": "F",
                "documentNumber": "750000001",
                "documentType": "P"
            }}
        }}"#
    )
}

// =========================================================================
// Eligibility sets
// =========================================================================

#[test]
fn test_completeness_example() {
    let restriction = ProposalRestriction::new(AgeBucket::From21To35, ["USA", "CAN"]);
    let got: HashSet<String> = eligible_combinations(&restriction)
        .into_iter()
        .map(|c| c.to_string())
        .collect();
    let expected: HashSet<String> = ["2_USA", "2_CAN", "3_USA", "3_CAN"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn test_any_collapse_roots_agree() {
    let empty = ProposalRestriction::new(AgeBucket::From21To35, Vec::<String>::new());
    let any = ProposalRestriction::new(AgeBucket::From21To35, ["ANY"]);
    assert_eq!(
        EligibilityTree::build(&empty).root(),
        EligibilityTree::build(&any).root()
    );
}

#[test]
fn test_every_combination_has_valid_proof() {
    let restriction = ProposalRestriction::new(AgeBucket::From18To20, ["RUS", "UKR", "KAZ", "BLR"]);
    let tree = EligibilityTree::build(&restriction);
    assert_eq!(tree.combinations().len(), 12);

    for bucket in AgeBucket::ALL {
        for country in restriction.allowed_countries() {
            let proof = generate_eligibility_proof(&restriction, bucket, country).unwrap();
            assert_eq!(proof.root, tree.root());
            assert!(verify_eligibility_proof(&proof.proof, &proof.leaf, &proof.root));
        }
    }
}

#[test]
fn test_proof_against_other_root_fails() {
    let a = ProposalRestriction::new(AgeBucket::From21To35, ["USA", "CAN"]);
    let b = ProposalRestriction::new(AgeBucket::From18To20, ["USA", "CAN"]);
    let proof = generate_eligibility_proof(&a, AgeBucket::From21To35, "CAN").unwrap();

    let path: Vec<String> = proof.proof.iter().map(|h| to_hex(h.as_slice())).collect();
    let other_root = to_hex(EligibilityTree::build(&b).root().as_slice());
    assert!(!verify_eligibility_proof_hex(&path, &to_hex(proof.leaf.as_slice()), &other_root).unwrap());
}

// =========================================================================
// Passport → proof
// =========================================================================

#[test]
fn test_reader_output_to_bucket() {
    let record = PassportRecord::from_json(&reader_json("920503", "UA")).unwrap();
    assert_eq!(record.issuing_state, "UKR");
    assert_eq!(
        classify_birth_date_at(&record.date_of_birth, today()).unwrap(),
        AgeBucket::From21To35
    );
}

#[test]
fn test_end_to_end_scenario() {
    let restriction = ProposalRestriction::new(AgeBucket::From21To35, ["USA", "CAN"]);
    let record = PassportRecord::from_json(&reader_json("900615", "US")).unwrap();
    let identity = SigningIdentity::generate();
    let verifier = PassportVerifier::new(ProtocolConfig::default());

    let check = verifier.check_eligibility_at(Some(&record), &restriction, today());
    assert!(check.eligible);

    let proof = verifier
        .generate_verification_proof_at(
            Some(&record),
            &restriction,
            Some(&identity),
            &Nonce::ServerIssued("nonce-abc".into()),
            "post_commandment_1",
            "yes",
            noon_timestamp(),
        )
        .unwrap();

    // 36 years old on the reference date: bucket 3.
    assert_eq!(proof.payload.merkle_leaf, keccak(b"3_USA"));

    let audit = verifier
        .audit_verification_proof(&proof, &restriction, identity.address(), noon_timestamp() + 60)
        .unwrap();
    assert!(audit.valid);
    assert_eq!(audit.signer, Some(identity.address()));

    let expired = verifier.check_freshness(&proof.payload, noon_timestamp() + 301);
    assert!(matches!(expired, Err(VerificationError::ProofExpired { .. })));
}

#[test]
fn test_edited_vote_option_fails_audit() {
    let restriction = ProposalRestriction::new(AgeBucket::From21To35, ["USA", "CAN"]);
    let record = PassportRecord::from_json(&reader_json("900615", "USA")).unwrap();
    let identity = SigningIdentity::generate();
    let verifier = PassportVerifier::default();

    let mut proof = verifier
        .generate_verification_proof_at(
            Some(&record),
            &restriction,
            Some(&identity),
            &Nonce::ServerIssued("nonce-abc".into()),
            "post_1",
            "yes",
            noon_timestamp(),
        )
        .unwrap();
    proof.payload.vote_option = "no".into();

    let audit = verifier
        .audit_verification_proof(&proof, &restriction, identity.address(), noon_timestamp())
        .unwrap();
    assert!(!audit.valid);
    assert_ne!(audit.signer, Some(identity.address()));
}

#[test]
fn test_underage_voter_rejected() {
    let restriction = ProposalRestriction::new(AgeBucket::From18To20, ["ANY"]);
    let record = PassportRecord::from_json(&reader_json("080616", "FRA")).unwrap();
    let verifier = PassportVerifier::default();

    let err = verifier
        .generate_verification_proof_at(
            Some(&record),
            &restriction,
            Some(&SigningIdentity::generate()),
            &Nonce::ServerIssued("n".into()),
            "post_1",
            "yes",
            noon_timestamp(),
        )
        .unwrap_err();
    assert_eq!(err.reason(), "Age requirement not met");
}

#[test]
fn test_sequential_proofs_differ() {
    let restriction = ProposalRestriction::new(AgeBucket::From18To20, ["ANY"]);
    let record = PassportRecord::from_json(&reader_json("900615", "DEU")).unwrap();
    let identity = SigningIdentity::generate();
    let verifier = PassportVerifier::default();

    let first = verifier
        .generate_verification_proof_at(
            Some(&record),
            &restriction,
            Some(&identity),
            &Nonce::ServerIssued("n-1".into()),
            "post_1",
            "yes",
            noon_timestamp(),
        )
        .unwrap();
    let second = verifier
        .generate_verification_proof_at(
            Some(&record),
            &restriction,
            Some(&identity),
            &Nonce::ServerIssued("n-2".into()),
            "post_1",
            "yes",
            noon_timestamp() + 1,
        )
        .unwrap();

    assert_eq!(first.payload.merkle_leaf, second.payload.merkle_leaf);
    assert_ne!(first.signature, second.signature);
}
