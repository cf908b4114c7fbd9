pub mod bucket;
pub mod check;
pub mod feed;
pub mod init;
pub mod keygen;
pub mod post;
pub mod profile;
pub mod prove;
pub mod register;
pub mod root;
pub mod verify;
pub mod vote;

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use zeroize::Zeroizing;

use passvote_client::{HttpTransport, SignedActionSession};
use passvote_core::{normalize_country_code, AgeBucket, PassportRecord, ProposalRestriction};
use passvote_crypto::{parse_b256, SigningIdentity};

use crate::config::ClientConfig;

/// A proposal restriction given on the command line.
#[derive(Args, Debug)]
pub struct RestrictionArgs {
    /// Minimum age bucket (1: 18-20, 2: 21-35, 3: 36+).
    #[arg(short = 'm', long, default_value_t = 1)]
    pub min_age_bucket: u8,

    /// Allowed country codes, comma separated. Empty or ANY admits every country.
    #[arg(short = 'C', long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Eligibility root advertised for the proposal (hex).
    #[arg(long)]
    pub root: Option<String>,
}

impl RestrictionArgs {
    pub fn restriction(&self) -> anyhow::Result<ProposalRestriction> {
        let bucket = AgeBucket::try_from(self.min_age_bucket)?;
        let restriction = ProposalRestriction::new(
            bucket,
            self.countries.iter().map(|c| normalize_country_code(c)),
        );
        match &self.root {
            Some(root) => Ok(restriction.with_eligibility_root(parse_b256(root)?)),
            None => Ok(restriction),
        }
    }
}

/// Read the signing key named in the config.
pub fn load_identity(config: &ClientConfig) -> anyhow::Result<SigningIdentity> {
    let path = &config.identity.key_path;
    let key = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!(
            "cannot read key file {}: {} (run `passvote keygen` first)",
            path.display(),
            e
        )
    })?);
    Ok(SigningIdentity::from_private_key_hex(&key)?)
}

/// Read passport reader JSON (nested or flat) from a file.
pub fn load_passport(path: &Path) -> anyhow::Result<PassportRecord> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read passport file {}: {}", path.display(), e))?;
    Ok(PassportRecord::from_json(&json)?)
}

/// Accept either a path to a JSON file or inline JSON.
pub fn read_json_arg(value: &str) -> anyhow::Result<serde_json::Value> {
    let json_str = if Path::new(value).exists() {
        std::fs::read_to_string(value)?
    } else {
        value.to_string()
    };
    serde_json::from_str(&json_str).map_err(|e| anyhow::anyhow!("invalid JSON: {}", e))
}

/// A signed action session against the configured API.
pub fn session(config: &ClientConfig) -> anyhow::Result<SignedActionSession> {
    let transport = HttpTransport::new(config.api.base_url.clone(), config.timeout())?;
    Ok(
        SignedActionSession::new(Arc::new(transport), config.protocol.clone())
            .with_identity(load_identity(config)?),
    )
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restriction_args() {
        let args = RestrictionArgs {
            min_age_bucket: 2,
            countries: vec!["us".into(), "CAN".into()],
            root: None,
        };
        let r = args.restriction().unwrap();
        assert_eq!(r.min_age_bucket(), AgeBucket::From21To35);
        assert_eq!(r.allowed_countries(), &["USA".to_string(), "CAN".to_string()]);
    }

    #[test]
    fn test_restriction_args_rejects_bad_input() {
        let bad_bucket = RestrictionArgs {
            min_age_bucket: 4,
            countries: vec![],
            root: None,
        };
        assert!(bad_bucket.restriction().is_err());

        let bad_root = RestrictionArgs {
            min_age_bucket: 1,
            countries: vec![],
            root: Some("0x1234".into()),
        };
        assert!(bad_root.restriction().is_err());
    }

    #[test]
    fn test_read_json_arg_inline() {
        let value = read_json_arg(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
        assert!(read_json_arg("{not json").is_err());
    }
}
