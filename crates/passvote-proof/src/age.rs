//! Coarse age classification from an MRZ date of birth.

use chrono::{Datelike, NaiveDate, Utc};

use passvote_core::{parse_mrz_date, AgeBucket, CoreError};

use crate::error::ProofError;

/// Classify a `YYMMDD` birth date against today's date.
pub fn classify_birth_date(date_of_birth: &str) -> Result<AgeBucket, ProofError> {
    classify_birth_date_at(date_of_birth, Utc::now().date_naive())
}

/// Classify a `YYMMDD` birth date as of `today`.
pub fn classify_birth_date_at(date_of_birth: &str, today: NaiveDate) -> Result<AgeBucket, ProofError> {
    let dob = parse_mrz_date(date_of_birth).map_err(|e| match e {
        CoreError::InvalidDateFormat(msg) => ProofError::InvalidDateFormat(msg),
        other => ProofError::Core(other),
    })?;
    let age = compute_age(dob, today);
    AgeBucket::from_age(age).ok_or(ProofError::Underage { age })
}

/// Human-readable bucket for a `YYMMDD` birth date, e.g. `"21-35 years"`.
pub fn age_bucket_description(date_of_birth: &str) -> Result<&'static str, ProofError> {
    classify_birth_date(date_of_birth).map(AgeBucket::description)
}

/// Compute age in whole years from DOB and today's date.
fn compute_age(dob: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = today.year() as i64 - dob.year() as i64;
    if today.month() < dob.month() || (today.month() == dob.month() && today.day() < dob.day()) {
        age -= 1;
    }
    age
}
