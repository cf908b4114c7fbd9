use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, Signature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hashing::to_hex;
use crate::typed_data::ActionType;

/// A 65-byte `r ‖ s ‖ v` signature as `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypedSignature(String);

impl TypedSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_signature(sig: &Signature) -> Self {
        Self(to_hex(&sig.as_bytes()))
    }

    fn to_signature(&self) -> Result<Signature, CryptoError> {
        let digits = self.0.strip_prefix("0x").unwrap_or(&self.0);
        let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidSignature(format!(
                "signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }
        Signature::from_raw(&bytes).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

impl From<String> for TypedSignature {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TypedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The wallet key behind every typed-data signature of a session.
///
/// One identity maps to exactly one address, the user's pseudonym.
#[derive(Clone)]
pub struct SigningIdentity {
    signer: PrivateKeySigner,
}

impl SigningIdentity {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Load from a 32-byte private key in hex, with or without `0x`.
    pub fn from_private_key_hex(key: &str) -> Result<Self, CryptoError> {
        let key = Zeroizing::new(key.trim().to_string());
        let signer = PrivateKeySigner::from_str(&key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Build from raw private key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signer = PrivateKeySigner::from_bytes(&B256::from(*bytes))
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Export the private key as `0x`-prefixed hex. The caller owns the secret.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(to_hex(self.signer.to_bytes().as_slice()))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a prehashed 32-byte digest.
    pub fn sign_hash(&self, hash: &B256) -> Result<TypedSignature, CryptoError> {
        let sig = self
            .signer
            .sign_hash_sync(hash)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;
        Ok(TypedSignature::from_signature(&sig))
    }

    /// Sign `message` as the typed data of `action`, under that action's domain.
    pub fn sign_typed(
        &self,
        action: ActionType,
        message: &Value,
    ) -> Result<TypedSignature, CryptoError> {
        let digest = action.signing_hash(message)?;
        let signature = self.sign_hash(&digest)?;
        tracing::debug!(
            action = %action,
            domain = action.domain().name(),
            signer = %self.address(),
            "signed typed data"
        );
        Ok(signature)
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_typed_signer(
    action: ActionType,
    message: &Value,
    signature: &TypedSignature,
) -> Result<Address, CryptoError> {
    let digest = action.signing_hash(message)?;
    signature
        .to_signature()?
        .recover_address_from_prehash(&digest)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vote_message() -> Value {
        json!({
            "postId": "post_1",
            "voteOption": "yes",
            "nonce": "abc123",
            "deadline": 1_700_003_600u64,
        })
    }

    #[test]
    fn test_sign_recover_roundtrip() {
        let identity = SigningIdentity::generate();
        let sig = identity.sign_typed(ActionType::Vote, &vote_message()).unwrap();
        let recovered = recover_typed_signer(ActionType::Vote, &vote_message(), &sig).unwrap();
        assert_eq!(recovered, identity.address());
    }

    #[test]
    fn test_signature_shape() {
        let identity = SigningIdentity::generate();
        let sig = identity.sign_typed(ActionType::Vote, &vote_message()).unwrap();
        assert!(sig.as_str().starts_with("0x"));
        assert_eq!(sig.as_str().len(), 2 + 130);
    }

    #[test]
    fn test_tampered_message_recovers_other_address() {
        let identity = SigningIdentity::generate();
        let sig = identity.sign_typed(ActionType::Vote, &vote_message()).unwrap();

        let mut tampered = vote_message();
        tampered["voteOption"] = json!("no");
        let recovered = recover_typed_signer(ActionType::Vote, &tampered, &sig).unwrap();
        assert_ne!(recovered, identity.address());
    }

    #[test]
    fn test_other_action_does_not_verify() {
        // Same fields, different primary type: the digest differs.
        let identity = SigningIdentity::generate();
        let message = json!({ "content": "hi", "nonce": "n", "deadline": 1 });
        let sig = identity.sign_typed(ActionType::CreatePost, &message).unwrap();
        assert!(ActionType::Vote.signing_hash(&message).is_err());
        let recovered = recover_typed_signer(ActionType::CreatePost, &message, &sig).unwrap();
        assert_eq!(recovered, identity.address());
    }

    #[test]
    fn test_signature_changes_under_other_domain() {
        use crate::hashing::keccak;
        use crate::typed_data::TypedDomain;

        let identity = SigningIdentity::from_bytes(&[9u8; 32]).unwrap();
        let struct_hash = ActionType::Vote.hash_struct(&vote_message()).unwrap();
        let digest_under = |domain: TypedDomain| {
            let mut input = vec![0x19, 0x01];
            input.extend_from_slice(domain.separator().as_slice());
            input.extend_from_slice(struct_hash.as_slice());
            keccak(&input)
        };

        let platform = identity.sign_hash(&digest_under(TypedDomain::Platform)).unwrap();
        let verification = identity
            .sign_hash(&digest_under(TypedDomain::Verification))
            .unwrap();
        assert_ne!(platform, verification);

        // Only the platform-domain signature is accepted for a vote.
        assert_eq!(
            platform,
            identity.sign_typed(ActionType::Vote, &vote_message()).unwrap()
        );
        let recovered =
            recover_typed_signer(ActionType::Vote, &vote_message(), &verification).unwrap();
        assert_ne!(recovered, identity.address());
    }

    #[test]
    fn test_deterministic_signatures() {
        let identity = SigningIdentity::from_bytes(&[7u8; 32]).unwrap();
        let a = identity.sign_typed(ActionType::Vote, &vote_message()).unwrap();
        let b = identity.sign_typed(ActionType::Vote, &vote_message()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let identity = SigningIdentity::generate();
        let exported = identity.private_key_hex();
        let restored = SigningIdentity::from_private_key_hex(&exported).unwrap();
        assert_eq!(restored.address(), identity.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(SigningIdentity::from_private_key_hex("0x1234").is_err());
        assert!(SigningIdentity::from_private_key_hex("not hex").is_err());
        assert!(SigningIdentity::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_malformed_signature() {
        let short = TypedSignature::from("0xdeadbeef".to_string());
        assert!(recover_typed_signer(ActionType::Vote, &vote_message(), &short).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let identity = SigningIdentity::from_bytes(&[7u8; 32]).unwrap();
        let debug = format!("{:?}", identity);
        assert!(debug.contains("address"));
        assert!(!debug.contains(&hex::encode([7u8; 32])));
    }
}
