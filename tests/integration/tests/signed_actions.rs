//! Integration test: signed actions and votes through a session backed by
//! the in-memory transport.

use std::collections::HashSet;
use std::sync::Arc;

use passvote_client::{
    ClientError, InMemoryTransport, SignedActionSession, SignedEndpoint, TransportError,
};
use passvote_core::{AgeBucket, PassportRecord, ProposalRestriction, ProtocolConfig};
use passvote_crypto::{recover_typed_signer, ActionType, SigningIdentity};
use passvote_proof::{EligibilityTree, ErrorCategory};

fn passport(dob: &str, state: &str) -> PassportRecord {
    PassportRecord::from_json(&format!(
        r#"{{"firstName":"LI","lastName":"WEI","issuingState":"{state}","nationality":"{state}","dateOfBirth":"{dob}","documentNumber":"E12345678"}}"#
    ))
    .unwrap()
}

fn setup(config: ProtocolConfig) -> (Arc<InMemoryTransport>, SignedActionSession, SigningIdentity) {
    let transport = Arc::new(InMemoryTransport::new());
    let restriction = ProposalRestriction::new(AgeBucket::From21To35, ["USA", "CAN"]);
    let root = EligibilityTree::build(&restriction).root();
    transport.insert_restriction("post_1", restriction.with_eligibility_root(root));
    transport.insert_restriction(
        "post_open",
        ProposalRestriction::new(AgeBucket::From18To20, Vec::<String>::new()),
    );

    let identity = SigningIdentity::generate();
    let session =
        SignedActionSession::new(transport.clone(), config).with_identity(identity.clone());
    (transport, session, identity)
}

#[tokio::test]
async fn test_every_signed_endpoint() {
    let (transport, session, identity) = setup(ProtocolConfig::default());
    let record = passport("880101", "CAN");
    let passport_hash = format!("{}", record.passport_hash().unwrap());

    session.register("li", &passport_hash).await.unwrap();
    session.create_post("hello").await.unwrap();
    session.get_feed(2, 10, None).await.unwrap();
    session
        .get_profile(&identity.address().to_string())
        .await
        .unwrap();

    for (endpoint, action) in [
        (SignedEndpoint::Register, ActionType::Register),
        (SignedEndpoint::Post, ActionType::CreatePost),
        (SignedEndpoint::Feed, ActionType::GetFeed),
        (SignedEndpoint::Profile, ActionType::GetProfile),
    ] {
        let sent = transport.signed_requests(endpoint);
        assert_eq!(sent.len(), 1, "{}", endpoint);
        let request = &sent[0];
        assert_eq!(request.primary_type, action.primary_type());
        assert_eq!(request.types, action.types_json());
        let signer = recover_typed_signer(action, &request.message, &request.signature).unwrap();
        assert_eq!(signer, identity.address());
    }
    assert_eq!(transport.outstanding_nonces(), 0);
}

#[tokio::test]
async fn test_votes_use_fresh_nonces_and_timestamps() {
    let (transport, session, _identity) = setup(ProtocolConfig::default());
    let record = passport("880101", "USA");

    for option in ["yes", "no", "abstain"] {
        session.vote("post_1", option, &record).await.unwrap();
    }

    let votes = transport.votes("post_1");
    assert_eq!(votes.len(), 3);
    let nonces: HashSet<&str> = votes
        .iter()
        .map(|v| v.verification.payload.nonce.as_str())
        .collect();
    assert_eq!(nonces.len(), 3);
    for pair in votes.windows(2) {
        assert!(pair[1].verification.payload.timestamp > pair[0].verification.payload.timestamp);
    }
}

#[tokio::test]
async fn test_open_proposal_uses_any_leaf() {
    let (transport, session, _identity) = setup(ProtocolConfig::default());
    session
        .vote("post_open", "yes", &passport("500101", "JPN"))
        .await
        .unwrap();

    let vote = &transport.votes("post_open")[0];
    assert_eq!(
        vote.verification.payload.merkle_leaf,
        passvote_crypto::keccak(b"3_ANY")
    );
}

#[tokio::test]
async fn test_vote_wire_body() {
    let (transport, session, _identity) = setup(ProtocolConfig::default());
    session
        .vote("post_1", "yes", &passport("880101", "USA"))
        .await
        .unwrap();

    let body = serde_json::to_value(&transport.votes("post_1")[0]).unwrap();
    assert_eq!(body["voteOption"], "yes");
    let verification = body["verification"].as_object().unwrap();
    for key in [
        "signature",
        "merkleRoot",
        "merkleProof",
        "merkleLeaf",
        "postId",
        "voteOption",
        "nonce",
        "timestamp",
    ] {
        assert!(verification.contains_key(key), "missing {}", key);
    }
    assert!(verification["timestamp"].is_u64());
}

#[tokio::test]
async fn test_unknown_proposal() {
    let (_transport, session, _identity) = setup(ProtocolConfig::default());
    let err = session
        .vote("missing", "yes", &passport("880101", "USA"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::NotFound(_))
    ));
    assert_eq!(err.category(), ErrorCategory::Network);
}

#[tokio::test]
async fn test_ineligible_country() {
    let (transport, session, _identity) = setup(ProtocolConfig::default());
    let err = session
        .vote("post_1", "yes", &passport("880101", "MEX"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Eligibility);
    assert!(transport.votes("post_1").is_empty());
}

#[tokio::test]
async fn test_offline_without_fallback() {
    let (transport, session, _identity) = setup(ProtocolConfig::default());
    transport.set_offline(true);
    let err = session.create_post("x").await.unwrap_err();
    assert!(matches!(err, ClientError::NonceFetchFailed(_)));
}

#[tokio::test]
async fn test_demo_mode_prefers_server_nonce() {
    // Falls back only while the server is unreachable.
    let (transport, session, _identity) = setup(ProtocolConfig::demo());
    transport.set_offline(true);
    let nonce = session.acquire_nonce().await.unwrap();
    assert!(!nonce.is_server_issued());

    transport.set_offline(false);
    let request = session
        .create_signed_request(ActionType::CreatePost, {
            let mut fields = serde_json::Map::new();
            fields.insert("content".into(), serde_json::json!("hi"));
            fields
        })
        .await
        .unwrap();
    assert_eq!(request.nonce().map(str::len), Some(32));
}
