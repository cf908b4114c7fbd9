/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("invalid age bucket: {0} (expected 1, 2 or 3)")]
    InvalidAgeBucket(u8),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
