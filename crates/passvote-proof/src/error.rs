use passvote_core::CoreError;
use passvote_crypto::CryptoError;

/// Eligibility proof errors.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("underage: {age} years old, at least 18 required")]
    Underage { age: i64 },

    #[error("combination {0} is not in the eligibility set")]
    NotInSet(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

/// Coarse classification of a failure, for callers that react by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or missing passport input.
    Input,
    /// The user is outside the proposal's eligibility set.
    Eligibility,
    /// A proof timestamp fell outside the freshness window.
    Freshness,
    /// No signer, or signing failed.
    Signer,
    /// Nonce or submission transport failure.
    Network,
}

/// Passport verification errors.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("not eligible: {reason}")]
    NotEligible {
        reason: String,
        details: Option<String>,
    },

    #[error("invalid passport data: {0}")]
    InvalidPassportData(String),

    #[error("no signing identity available")]
    SigningUnavailable,

    #[error("verification proof expired: timestamp is {age_secs}s away from now")]
    ProofExpired { age_secs: i64 },

    #[error("eligibility root mismatch: advertised {advertised}, computed {computed}")]
    RootMismatch { advertised: String, computed: String },

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("proof error: {0}")]
    Proof(#[from] ProofError),
}

impl VerificationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotEligible { .. } | Self::RootMismatch { .. } => ErrorCategory::Eligibility,
            Self::InvalidPassportData(_) => ErrorCategory::Input,
            Self::SigningUnavailable | Self::SigningFailed(_) => ErrorCategory::Signer,
            Self::ProofExpired { .. } => ErrorCategory::Freshness,
            Self::Proof(ProofError::Underage { .. }) | Self::Proof(ProofError::NotInSet(_)) => {
                ErrorCategory::Eligibility
            }
            Self::Proof(ProofError::Crypto(_)) => ErrorCategory::Signer,
            Self::Proof(_) => ErrorCategory::Input,
        }
    }

    /// Short human-readable reason.
    pub fn reason(&self) -> String {
        match self {
            Self::NotEligible { reason, .. } => reason.clone(),
            Self::InvalidPassportData(_) => "Invalid passport data".into(),
            Self::SigningUnavailable => "No signing identity available".into(),
            Self::ProofExpired { .. } => "Verification proof expired".into(),
            Self::RootMismatch { .. } => "Eligibility root mismatch".into(),
            Self::SigningFailed(_) => "Signing failed".into(),
            Self::Proof(e) => e.to_string(),
        }
    }

    /// Longer explanation, when there is one.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::NotEligible { details, .. } => details.clone(),
            Self::InvalidPassportData(d) | Self::SigningFailed(d) => Some(d.clone()),
            Self::ProofExpired { age_secs } => Some(format!(
                "proof timestamp is {}s from the verifier clock",
                age_secs
            )),
            Self::RootMismatch { .. } => Some(self.to_string()),
            Self::SigningUnavailable | Self::Proof(_) => None,
        }
    }
}
