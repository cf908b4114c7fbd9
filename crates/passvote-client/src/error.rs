use passvote_crypto::CryptoError;
use passvote_proof::{ErrorCategory, VerificationError};

/// Failures at the transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("nonce rejected: {0}")]
    NonceRejected(String),

    #[error("transport offline")]
    Offline,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Self::Request(e.to_string()),
        }
    }
}

/// Signed action session errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no signer available")]
    NoSigner,

    #[error("nonce fetch failed: {0}")]
    NonceFetchFailed(TransportError),

    #[error("refusing to submit a vote over a locally generated nonce")]
    FallbackNonceRejected,

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoSigner | Self::SigningFailed(_) | Self::Crypto(_) => ErrorCategory::Signer,
            Self::NonceFetchFailed(_) | Self::FallbackNonceRejected | Self::Transport(_) => {
                ErrorCategory::Network
            }
            Self::Verification(e) => e.category(),
            Self::InvalidMessage(_) => ErrorCategory::Input,
        }
    }
}
