use alloy_primitives::{keccak256, B256};

use crate::error::CryptoError;

/// Keccak-256 hash (32 bytes).
pub type Hash = B256;

/// Hash arbitrary data using Keccak-256.
pub fn keccak(data: &[u8]) -> Hash {
    keccak256(data)
}

/// Encode bytes as lowercase `0x`-prefixed hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a `0x`-prefixed (or bare) 32-byte hex string.
pub fn parse_b256(value: &str) -> Result<Hash, CryptoError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidHex(format!("{}: {}", value, e)))?;
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidHex(format!(
            "expected 32 bytes, got {} in {}",
            bytes.len(),
            value
        )));
    }
    Ok(B256::from_slice(&bytes))
}
