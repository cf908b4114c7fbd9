//! Passvote Core: Fundamental types, errors, and configuration for the
//! passport-gated voting protocol.

pub mod config;
pub mod error;
pub mod passport;
pub mod types;

pub use config::ProtocolConfig;
pub use error::CoreError;
pub use passport::{normalize_country_code, parse_mrz_date, PassportRecord, RawPassportData};
pub use types::{AgeBucket, Combination, ProposalRestriction, ANY_COUNTRY};
