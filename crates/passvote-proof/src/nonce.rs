use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const FALLBACK_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const FALLBACK_LEN: usize = 13;

/// A single-use nonce for one signed action.
///
/// `LocalFallback` nonces are never seen by the server before use and give no
/// replay protection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Nonce {
    ServerIssued(String),
    LocalFallback(String),
}

impl Nonce {
    /// Synthesize a random 13-character base-36 placeholder.
    pub fn local_fallback() -> Self {
        let mut rng = rand::thread_rng();
        let value: String = (0..FALLBACK_LEN)
            .map(|_| FALLBACK_ALPHABET[rng.gen_range(0..FALLBACK_ALPHABET.len())] as char)
            .collect();
        Self::LocalFallback(value)
    }

    pub fn value(&self) -> &str {
        match self {
            Self::ServerIssued(v) | Self::LocalFallback(v) => v,
        }
    }

    pub fn is_server_issued(&self) -> bool {
        matches!(self, Self::ServerIssued(_))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
