//! The nonce/deadline signing protocol.
//!
//! Every signed action fetches a fresh nonce, stamps a deadline, signs under
//! its domain, submits once and forgets the nonce. A retry is a new action.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use passvote_core::{PassportRecord, ProtocolConfig};
use passvote_crypto::{ActionType, SigningIdentity};
use passvote_proof::{Nonce, PassportVerifier};

use crate::error::ClientError;
use crate::requests::{SignedEndpoint, SignedRequest, VoteRequest};
use crate::transport::Transport;

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Signing context for one identity.
///
/// Signed actions are serialized so at most one is in flight.
pub struct SignedActionSession {
    identity: Option<SigningIdentity>,
    transport: Arc<dyn Transport>,
    verifier: PassportVerifier,
    in_flight: Mutex<()>,
    last_timestamp: AtomicU64,
}

impl SignedActionSession {
    /// A session without an identity; every signed action fails with
    /// [`ClientError::NoSigner`] until one is attached.
    pub fn new(transport: Arc<dyn Transport>, config: ProtocolConfig) -> Self {
        Self {
            identity: None,
            transport,
            verifier: PassportVerifier::new(config),
            in_flight: Mutex::new(()),
            last_timestamp: AtomicU64::new(0),
        }
    }

    pub fn with_identity(mut self, identity: SigningIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn address(&self) -> Option<Address> {
        self.identity.as_ref().map(SigningIdentity::address)
    }

    pub fn config(&self) -> &ProtocolConfig {
        self.verifier.config()
    }

    pub fn verifier(&self) -> &PassportVerifier {
        &self.verifier
    }

    pub fn identity(&self) -> Option<&SigningIdentity> {
        self.identity.as_ref()
    }

    fn require_identity(&self) -> Result<&SigningIdentity, ClientError> {
        self.identity.as_ref().ok_or(ClientError::NoSigner)
    }

    /// Strictly increasing unix seconds across this session.
    fn next_timestamp(&self) -> u64 {
        let now = unix_now();
        let mut last = self.last_timestamp.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self.last_timestamp.compare_exchange(
                last,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    /// Fetch a fresh nonce, or synthesize a local one when the server is
    /// unreachable and fallback is allowed.
    pub async fn acquire_nonce(&self) -> Result<Nonce, ClientError> {
        let address = self.require_identity()?.address();
        match self.transport.fetch_nonce(&address).await {
            Ok(nonce) => {
                tracing::debug!(address = %address, nonce = %nonce, "acquired server nonce");
                Ok(Nonce::ServerIssued(nonce))
            }
            Err(e) if self.config().allow_fallback_nonce => {
                let nonce = Nonce::local_fallback();
                tracing::warn!(
                    address = %address,
                    nonce = %nonce,
                    error = %e,
                    "server nonce unavailable, using local fallback nonce"
                );
                Ok(nonce)
            }
            Err(e) => Err(ClientError::NonceFetchFailed(e)),
        }
    }

    /// Build the signed envelope for `action` over `fields`, adding a fresh
    /// `nonce` and a `deadline`, without submitting it.
    ///
    /// Waits for any in-flight action of this session to finish first.
    pub async fn create_signed_request(
        &self,
        action: ActionType,
        fields: Map<String, Value>,
    ) -> Result<SignedRequest, ClientError> {
        let _guard = self.in_flight.lock().await;
        self.build_signed_request(action, fields).await
    }

    /// Caller must hold `in_flight`.
    async fn build_signed_request(
        &self,
        action: ActionType,
        fields: Map<String, Value>,
    ) -> Result<SignedRequest, ClientError> {
        let identity = self.require_identity()?;
        let nonce = self.acquire_nonce().await?;
        let deadline = unix_now() + self.config().deadline_secs;

        let mut message = fields;
        message.insert("nonce".into(), Value::String(nonce.value().to_string()));
        message.insert("deadline".into(), json!(deadline));
        let message = Value::Object(message);

        let signature = identity
            .sign_typed(action, &message)
            .map_err(|e| ClientError::SigningFailed(e.to_string()))?;

        Ok(SignedRequest {
            signature,
            message,
            types: action.types_json(),
            primary_type: action.primary_type().to_string(),
        })
    }

    async fn send_signed(
        &self,
        action: ActionType,
        fields: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let endpoint = SignedEndpoint::for_action(action).ok_or_else(|| {
            ClientError::InvalidMessage(format!("{} has no signed endpoint", action))
        })?;

        let _guard = self.in_flight.lock().await;
        let request = self.build_signed_request(action, fields).await?;
        let response = self.transport.submit_signed(endpoint, &request).await?;
        tracing::info!(action = %action, endpoint = %endpoint, "signed request accepted");
        Ok(response)
    }

    pub async fn register(&self, nickname: &str, passport_hash: &str) -> Result<Value, ClientError> {
        let mut fields = Map::new();
        fields.insert("nickname".into(), json!(nickname));
        fields.insert("passportHash".into(), json!(passport_hash));
        self.send_signed(ActionType::Register, fields).await
    }

    pub async fn create_post(&self, content: &str) -> Result<Value, ClientError> {
        let mut fields = Map::new();
        fields.insert("content".into(), json!(content));
        self.send_signed(ActionType::CreatePost, fields).await
    }

    /// `sort` is transmitted but not part of the signed schema.
    pub async fn get_feed(
        &self,
        page: u64,
        limit: u64,
        sort: Option<&str>,
    ) -> Result<Value, ClientError> {
        let mut fields = Map::new();
        fields.insert("page".into(), json!(page));
        fields.insert("limit".into(), json!(limit));
        if let Some(sort) = sort {
            fields.insert("sort".into(), json!(sort));
        }
        self.send_signed(ActionType::GetFeed, fields).await
    }

    pub async fn get_profile(&self, address: &str) -> Result<Value, ClientError> {
        let mut fields = Map::new();
        fields.insert("address".into(), json!(address));
        self.send_signed(ActionType::GetProfile, fields).await
    }

    /// Prove eligibility for `post_id` and cast a vote.
    ///
    /// Fetches the proposal restriction and a fresh nonce, builds a
    /// verification proof stamped with a new timestamp, checks it is still
    /// fresh, then submits once.
    pub async fn vote(
        &self,
        post_id: &str,
        vote_option: &str,
        passport: &PassportRecord,
    ) -> Result<Value, ClientError> {
        let _guard = self.in_flight.lock().await;
        let identity = self.require_identity()?;

        let restriction = self.transport.fetch_restriction(post_id).await?;
        let nonce = self.acquire_nonce().await?;
        if !nonce.is_server_issued() && self.config().production {
            tracing::warn!(post_id, "vote refused: fallback nonce in production mode");
            return Err(ClientError::FallbackNonceRejected);
        }

        let proof = self.verifier.generate_verification_proof_at(
            Some(passport),
            &restriction,
            Some(identity),
            &nonce,
            post_id,
            vote_option,
            self.next_timestamp(),
        )?;
        self.verifier.check_freshness(&proof.payload, unix_now())?;

        let request = VoteRequest {
            vote_option: vote_option.to_string(),
            verification: proof,
        };
        let response = self.transport.submit_vote(post_id, &request).await?;
        tracing::info!(
            post_id,
            root = %request.verification.payload.merkle_root,
            "vote submitted"
        );
        Ok(response)
    }
}
