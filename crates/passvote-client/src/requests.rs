//! Wire shapes posted to the platform API.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use passvote_crypto::{recover_typed_signer, ActionType, CryptoError, TypedSignature};
use passvote_proof::VerificationProof;

/// Envelope for every `/api/signed/*` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRequest {
    pub signature: TypedSignature,
    /// The signed message, including `nonce` and `deadline`.
    pub message: Value,
    /// `{ <primaryType>: [{ name, type }, ...] }`
    pub types: Value,
    pub primary_type: String,
}

impl SignedRequest {
    pub fn action(&self) -> Result<ActionType, CryptoError> {
        self.primary_type.parse()
    }

    pub fn nonce(&self) -> Option<&str> {
        self.message.get("nonce").and_then(Value::as_str)
    }

    pub fn deadline(&self) -> Option<u64> {
        self.message.get("deadline").and_then(Value::as_u64)
    }

    /// Address that signed this request.
    pub fn recover_signer(&self) -> Result<Address, CryptoError> {
        recover_typed_signer(self.action()?, &self.message, &self.signature)
    }
}

/// Body of `POST /api/posts/{id}/vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_option: String,
    pub verification: VerificationProof,
}

/// The `/api/signed/{endpoint}` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignedEndpoint {
    Register,
    Post,
    Feed,
    Profile,
}

impl SignedEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Post => "post",
            Self::Feed => "feed",
            Self::Profile => "profile",
        }
    }

    /// Route for an action type; votes and passport proofs have their own.
    pub fn for_action(action: ActionType) -> Option<Self> {
        match action {
            ActionType::Register => Some(Self::Register),
            ActionType::CreatePost => Some(Self::Post),
            ActionType::GetFeed => Some(Self::Feed),
            ActionType::GetProfile => Some(Self::Profile),
            ActionType::Vote | ActionType::PassportVerification => None,
        }
    }
}

impl fmt::Display for SignedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/api/signed/{}", self.path())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NonceResponse {
    pub nonce: String,
}
