use serde::{Deserialize, Serialize};

/// Allowed distance, in seconds, between a proof timestamp and the
/// verifier's clock.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 300;

/// Lifetime of a signed action's deadline.
pub const DEFAULT_DEADLINE_SECS: u64 = 3600;

/// Protocol knobs shared by the orchestrator and the signing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Freshness window for verification proof timestamps (seconds).
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,
    /// How far in the future signed actions set their deadline (seconds).
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
    /// Synthesize a local nonce when the server cannot issue one.
    /// Forfeits replay protection; demo/offline use only.
    #[serde(default)]
    pub allow_fallback_nonce: bool,
    /// Refuse to submit votes signed over a locally synthesized nonce.
    #[serde(default = "default_true")]
    pub production: bool,
}

fn default_freshness_window() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_SECS
}
fn default_deadline() -> u64 {
    DEFAULT_DEADLINE_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: default_freshness_window(),
            deadline_secs: default_deadline(),
            allow_fallback_nonce: false,
            production: true,
        }
    }
}

impl ProtocolConfig {
    /// Demo/offline profile: local nonces allowed, fallback votes allowed.
    pub fn demo() -> Self {
        Self {
            allow_fallback_nonce: true,
            production: false,
            ..Default::default()
        }
    }
}
