//! In-process transport with a single-use nonce ledger.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy_primitives::Address;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};

use passvote_core::ProposalRestriction;
use passvote_crypto::{recover_typed_signer, ActionType};

use crate::error::TransportError;
use crate::requests::{SignedEndpoint, SignedRequest, VoteRequest};
use crate::transport::Transport;

/// A [`Transport`] that keeps everything in memory.
///
/// Issues UUIDv7 nonces bound to the requesting address, consumes each on
/// first use by that address and refuses replays, nonces it never issued and
/// nonces spent by another signer. Can be switched offline to exercise
/// fallbacks.
#[derive(Default)]
pub struct InMemoryTransport {
    /// Outstanding nonces and the address they were issued to.
    issued: DashMap<String, Address>,
    restrictions: DashMap<String, ProposalRestriction>,
    votes: DashMap<String, Vec<VoteRequest>>,
    signed: DashMap<SignedEndpoint, Vec<SignedRequest>>,
    offline: AtomicBool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn insert_restriction(&self, proposal_id: impl Into<String>, restriction: ProposalRestriction) {
        self.restrictions.insert(proposal_id.into(), restriction);
    }

    /// Nonces issued but not yet used.
    pub fn outstanding_nonces(&self) -> usize {
        self.issued.len()
    }

    /// Accepted votes for a post, in submission order.
    pub fn votes(&self, post_id: &str) -> Vec<VoteRequest> {
        self.votes
            .get(post_id)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }

    /// Accepted signed requests for an endpoint, in submission order.
    pub fn signed_requests(&self, endpoint: SignedEndpoint) -> Vec<SignedRequest> {
        self.signed
            .get(&endpoint)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }

    fn ensure_online(&self) -> Result<(), TransportError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Offline);
        }
        Ok(())
    }

    /// Spend `nonce` on behalf of `signer`. A nonce issued to another
    /// address stays outstanding.
    fn consume_nonce(&self, nonce: &str, signer: Address) -> Result<(), TransportError> {
        if self
            .issued
            .remove_if(nonce, |_, issued_to| *issued_to == signer)
            .is_some()
        {
            return Ok(());
        }
        if self.issued.contains_key(nonce) {
            tracing::warn!(nonce, signer = %signer, "nonce presented by another address");
            return Err(TransportError::NonceRejected(format!(
                "{} was issued to another address",
                nonce
            )));
        }
        Err(TransportError::NonceRejected(nonce.to_string()))
    }
}

fn unauthorized(e: impl std::fmt::Display) -> TransportError {
    TransportError::Status {
        status: 401,
        message: format!("invalid signature: {}", e),
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn fetch_nonce(&self, address: &Address) -> Result<String, TransportError> {
        self.ensure_online()?;
        let nonce = uuid::Uuid::now_v7().simple().to_string();
        self.issued.insert(nonce.clone(), *address);
        tracing::debug!(address = %address, nonce = %nonce, "issued nonce");
        Ok(nonce)
    }

    async fn fetch_restriction(
        &self,
        proposal_id: &str,
    ) -> Result<ProposalRestriction, TransportError> {
        self.ensure_online()?;
        self.restrictions
            .get(proposal_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| TransportError::NotFound(format!("proposal {}", proposal_id)))
    }

    async fn submit_vote(
        &self,
        post_id: &str,
        request: &VoteRequest,
    ) -> Result<Value, TransportError> {
        self.ensure_online()?;
        let proof = &request.verification;
        let message = proof.payload.to_message().map_err(unauthorized)?;
        let signer = recover_typed_signer(ActionType::PassportVerification, &message, &proof.signature)
            .map_err(unauthorized)?;
        self.consume_nonce(&proof.payload.nonce, signer)?;
        self.votes
            .entry(post_id.to_string())
            .or_default()
            .push(request.clone());
        Ok(json!({ "success": true, "postId": post_id, "voteOption": request.vote_option }))
    }

    async fn submit_signed(
        &self,
        endpoint: SignedEndpoint,
        request: &SignedRequest,
    ) -> Result<Value, TransportError> {
        self.ensure_online()?;
        let nonce = request
            .nonce()
            .ok_or_else(|| TransportError::NonceRejected("missing nonce".into()))?;
        let signer = request.recover_signer().map_err(unauthorized)?;
        self.consume_nonce(nonce, signer)?;
        self.signed.entry(endpoint).or_default().push(request.clone());
        Ok(json!({ "success": true }))
    }
}
