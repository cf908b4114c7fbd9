use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Country sentinel meaning "no country restriction".
pub const ANY_COUNTRY: &str = "ANY";

/// Coarse, privacy-preserving age class.
///
/// Only the bucket ever reaches the eligibility tree; the exact age stays on
/// the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AgeBucket {
    /// 18 to 20 years old.
    From18To20 = 1,
    /// 21 to 35 years old.
    From21To35 = 2,
    /// 36 years and older.
    From36 = 3,
}

impl AgeBucket {
    /// All buckets, youngest first.
    pub const ALL: [AgeBucket; 3] = [Self::From18To20, Self::From21To35, Self::From36];

    /// Map a whole-year age to its bucket. `None` below 18.
    pub fn from_age(age: i64) -> Option<Self> {
        match age {
            18..=20 => Some(Self::From18To20),
            21..=35 => Some(Self::From21To35),
            a if a >= 36 => Some(Self::From36),
            _ => None,
        }
    }

    /// Numeric value used in combinations and on the wire.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Lowest age covered by this bucket.
    pub fn min_age(self) -> u32 {
        match self {
            Self::From18To20 => 18,
            Self::From21To35 => 21,
            Self::From36 => 36,
        }
    }

    /// Human-readable range.
    pub fn description(self) -> &'static str {
        match self {
            Self::From18To20 => "18-20 years",
            Self::From21To35 => "21-35 years",
            Self::From36 => "36+ years",
        }
    }

    /// This bucket and every older one.
    pub fn iter_from(self) -> impl Iterator<Item = AgeBucket> {
        Self::ALL.into_iter().filter(move |b| *b >= self)
    }
}

impl TryFrom<u8> for AgeBucket {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::From18To20),
            2 => Ok(Self::From21To35),
            3 => Ok(Self::From36),
            other => Err(CoreError::InvalidAgeBucket(other)),
        }
    }
}

impl From<AgeBucket> for u8 {
    fn from(bucket: AgeBucket) -> Self {
        bucket.as_u8()
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Canonical `"{ageBucket}_{country}"` string hashed into tree leaves.
///
/// The format must match the server byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination(String);

impl Combination {
    /// Build the combination for a bucket and a country code (or `ANY`).
    pub fn new(bucket: AgeBucket, country: &str) -> Self {
        Self(format!("{}_{}", bucket.as_u8(), country))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who may vote on a proposal.
///
/// Immutable once published: changing it changes the eligibility root and
/// invalidates every proof issued against the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRestriction {
    /// Lowest eligible age bucket.
    #[serde(rename = "minAgeRange")]
    min_age_bucket: AgeBucket,
    /// ISO3 country codes, or `ANY`. Empty means no country restriction.
    #[serde(rename = "allowedCountries", default)]
    allowed_countries: Vec<String>,
    /// Root advertised by the server, if any.
    #[serde(
        rename = "eligibilityRoot",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    eligibility_root: Option<B256>,
}

impl ProposalRestriction {
    /// Create a restriction from a minimum bucket and the allowed countries.
    pub fn new<I, S>(min_age_bucket: AgeBucket, allowed_countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            min_age_bucket,
            allowed_countries: allowed_countries.into_iter().map(Into::into).collect(),
            eligibility_root: None,
        }
    }

    /// Attach the root the server advertises for this proposal.
    pub fn with_eligibility_root(mut self, root: B256) -> Self {
        self.eligibility_root = Some(root);
        self
    }

    pub fn min_age_bucket(&self) -> AgeBucket {
        self.min_age_bucket
    }

    pub fn allowed_countries(&self) -> &[String] {
        &self.allowed_countries
    }

    pub fn eligibility_root(&self) -> Option<B256> {
        self.eligibility_root
    }

    /// False when the country list is empty or contains `ANY`.
    pub fn has_country_restrictions(&self) -> bool {
        !self.allowed_countries.is_empty()
            && !self.allowed_countries.iter().any(|c| c == ANY_COUNTRY)
    }

    /// Whether `country` passes the country dimension of this restriction.
    pub fn allows_country(&self, country: &str) -> bool {
        !self.has_country_restrictions() || self.allowed_countries.iter().any(|c| c == country)
    }

    /// Short display text, e.g. `"Age 21+ • USA/CAN citizens only"`.
    pub fn summary(&self) -> String {
        let age = format!("Age {}+", self.min_age_bucket.min_age());
        let countries = if !self.has_country_restrictions() {
            "All countries eligible".to_string()
        } else if self.allowed_countries.len() <= 3 {
            format!("{} citizens only", self.allowed_countries.join("/"))
        } else {
            format!("{} countries eligible", self.allowed_countries.len())
        };
        format!("{} • {}", age, countries)
    }
}
