//! EIP-712 typed-data encoding for every signed action.
//!
//! Each [`ActionType`] has a fixed field schema and belongs to exactly one of
//! two domains. Messages are JSON objects; fields are hashed in schema order
//! and any extra keys are ignored by the hash.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::CryptoError;
use crate::hashing::{keccak, parse_b256, Hash};

/// Domain name for passport verification proofs.
pub const VERIFICATION_DOMAIN_NAME: &str = "NFCPassportVerification";
/// Domain name for every other signed action.
pub const PLATFORM_DOMAIN_NAME: &str = "NFC Reader Platform";
pub const DOMAIN_VERSION: &str = "1";
/// Sepolia.
pub const CHAIN_ID: u64 = 11_155_111;

/// The two signing domains. They must never be conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedDomain {
    Verification,
    Platform,
}

impl TypedDomain {
    pub fn name(self) -> &'static str {
        match self {
            Self::Verification => VERIFICATION_DOMAIN_NAME,
            Self::Platform => PLATFORM_DOMAIN_NAME,
        }
    }

    /// The full EIP-712 domain (`verifyingContract` is the zero address).
    pub fn eip712(self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Borrowed(self.name())),
            Some(Cow::Borrowed(DOMAIN_VERSION)),
            Some(U256::from(CHAIN_ID)),
            Some(Address::ZERO),
            None,
        )
    }

    pub fn separator(self) -> B256 {
        self.eip712().separator()
    }
}

/// Solidity type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Uint256,
    Bytes32,
    Bytes32Array,
}

impl FieldKind {
    pub fn sol_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Uint256 => "uint256",
            Self::Bytes32 => "bytes32",
            Self::Bytes32Array => "bytes32[]",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Uint256 => "a non-negative integer or decimal string",
            Self::Bytes32 => "a 32-byte hex string",
            Self::Bytes32Array => "an array of 32-byte hex strings",
        }
    }
}

/// One named, typed field of an action schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedField {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> TypedField {
    TypedField { name, kind }
}

const REGISTER: &[TypedField] = &[
    field("nickname", FieldKind::String),
    field("passportHash", FieldKind::String),
    field("nonce", FieldKind::String),
    field("deadline", FieldKind::Uint256),
];

const CREATE_POST: &[TypedField] = &[
    field("content", FieldKind::String),
    field("nonce", FieldKind::String),
    field("deadline", FieldKind::Uint256),
];

const VOTE: &[TypedField] = &[
    field("postId", FieldKind::String),
    field("voteOption", FieldKind::String),
    field("nonce", FieldKind::String),
    field("deadline", FieldKind::Uint256),
];

const PASSPORT_VERIFICATION: &[TypedField] = &[
    field("merkleRoot", FieldKind::Bytes32),
    field("merkleProof", FieldKind::Bytes32Array),
    field("merkleLeaf", FieldKind::Bytes32),
    field("postId", FieldKind::String),
    field("voteOption", FieldKind::String),
    field("nonce", FieldKind::String),
    field("timestamp", FieldKind::Uint256),
];

const GET_FEED: &[TypedField] = &[
    field("page", FieldKind::Uint256),
    field("limit", FieldKind::Uint256),
    field("nonce", FieldKind::String),
    field("deadline", FieldKind::Uint256),
];

const GET_PROFILE: &[TypedField] = &[
    field("address", FieldKind::String),
    field("nonce", FieldKind::String),
    field("deadline", FieldKind::Uint256),
];

/// Every kind of signed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Register,
    CreatePost,
    Vote,
    PassportVerification,
    GetFeed,
    GetProfile,
}

impl ActionType {
    pub const ALL: [ActionType; 6] = [
        Self::Register,
        Self::CreatePost,
        Self::Vote,
        Self::PassportVerification,
        Self::GetFeed,
        Self::GetProfile,
    ];

    /// EIP-712 primary type name.
    pub fn primary_type(self) -> &'static str {
        match self {
            Self::Register => "Register",
            Self::CreatePost => "CreatePost",
            Self::Vote => "Vote",
            Self::PassportVerification => "PassportVerification",
            Self::GetFeed => "GetFeed",
            Self::GetProfile => "GetProfile",
        }
    }

    pub fn schema(self) -> &'static [TypedField] {
        match self {
            Self::Register => REGISTER,
            Self::CreatePost => CREATE_POST,
            Self::Vote => VOTE,
            Self::PassportVerification => PASSPORT_VERIFICATION,
            Self::GetFeed => GET_FEED,
            Self::GetProfile => GET_PROFILE,
        }
    }

    pub fn domain(self) -> TypedDomain {
        match self {
            Self::PassportVerification => TypedDomain::Verification,
            _ => TypedDomain::Platform,
        }
    }

    /// `Vote(string postId,string voteOption,string nonce,uint256 deadline)`
    pub fn encode_type(self) -> String {
        let fields: Vec<String> = self
            .schema()
            .iter()
            .map(|f| format!("{} {}", f.kind.sol_type(), f.name))
            .collect();
        format!("{}({})", self.primary_type(), fields.join(","))
    }

    pub fn type_hash(self) -> Hash {
        keccak(self.encode_type().as_bytes())
    }

    /// The `types` object sent alongside a signed request:
    /// `{"Vote": [{"name": "postId", "type": "string"}, ...]}`.
    pub fn types_json(self) -> Value {
        let fields: Vec<Value> = self
            .schema()
            .iter()
            .map(|f| json!({ "name": f.name, "type": f.kind.sol_type() }))
            .collect();
        let mut types = Map::new();
        types.insert(self.primary_type().to_string(), Value::Array(fields));
        Value::Object(types)
    }

    /// EIP-712 `hashStruct(message)`.
    pub fn hash_struct(self, message: &Value) -> Result<Hash, CryptoError> {
        let object = message.as_object().ok_or(CryptoError::NotAnObject)?;

        let mut encoded = Vec::with_capacity(32 * (self.schema().len() + 1));
        encoded.extend_from_slice(self.type_hash().as_slice());
        for f in self.schema() {
            let value = object.get(f.name).ok_or_else(|| CryptoError::MissingField {
                action: self.primary_type().into(),
                field: f.name.into(),
            })?;
            let word = self.encode_value(f, value)?;
            encoded.extend_from_slice(word.as_slice());
        }

        Ok(keccak(&encoded))
    }

    /// The digest that is actually signed:
    /// `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
    pub fn signing_hash(self, message: &Value) -> Result<Hash, CryptoError> {
        let struct_hash = self.hash_struct(message)?;
        let mut digest_input = [0u8; 66];
        digest_input[0] = 0x19;
        digest_input[1] = 0x01;
        digest_input[2..34].copy_from_slice(self.domain().separator().as_slice());
        digest_input[34..].copy_from_slice(struct_hash.as_slice());
        Ok(keccak(&digest_input))
    }

    fn encode_value(self, f: &TypedField, value: &Value) -> Result<B256, CryptoError> {
        let type_error = || CryptoError::FieldType {
            action: self.primary_type().into(),
            field: f.name.into(),
            expected: f.kind.expected(),
        };

        match f.kind {
            FieldKind::String => {
                let s = value.as_str().ok_or_else(type_error)?;
                Ok(keccak(s.as_bytes()))
            }
            FieldKind::Uint256 => {
                let n = match value {
                    Value::Number(n) => n.as_u64().map(U256::from),
                    Value::String(s) => s.parse::<U256>().ok(),
                    _ => None,
                }
                .ok_or_else(type_error)?;
                Ok(B256::from(n.to_be_bytes::<32>()))
            }
            FieldKind::Bytes32 => {
                let s = value.as_str().ok_or_else(type_error)?;
                parse_b256(s)
            }
            FieldKind::Bytes32Array => {
                let items = value.as_array().ok_or_else(type_error)?;
                let mut concat = Vec::with_capacity(items.len() * 32);
                for item in items {
                    let s = item.as_str().ok_or_else(type_error)?;
                    concat.extend_from_slice(parse_b256(s)?.as_slice());
                }
                Ok(keccak(&concat))
            }
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary_type())
    }
}

impl FromStr for ActionType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.primary_type() == s)
            .ok_or_else(|| CryptoError::UnknownAction(s.to_string()))
    }
}
