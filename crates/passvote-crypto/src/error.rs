/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("{action} message is missing field `{field}`")]
    MissingField { action: String, field: String },

    #[error("{action} field `{field}` must be {expected}")]
    FieldType {
        action: String,
        field: String,
        expected: &'static str,
    },

    #[error("typed-data message must be a JSON object")]
    NotAnObject,

    #[error("unknown action type: {0}")]
    UnknownAction(String),
}
