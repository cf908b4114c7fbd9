pub mod error;
pub mod hashing;
pub mod merkle;
pub mod signing;
pub mod typed_data;

pub use error::CryptoError;
pub use hashing::{keccak, parse_b256, to_hex, Hash};
pub use merkle::{hash_sorted_pair, verify_proof, verify_proof_hex, MerkleTree};
pub use signing::{recover_typed_signer, SigningIdentity, TypedSignature};
pub use typed_data::{ActionType, FieldKind, TypedDomain, TypedField};
