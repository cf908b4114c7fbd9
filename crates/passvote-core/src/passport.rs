//! Passport fields as they arrive from the MRZ/NFC reader, normalized once at
//! the input boundary.

use alloy_primitives::{keccak256, B256};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Two-digit years at or below this value belong to the 2000s.
pub const MRZ_CENTURY_PIVOT: u32 = 30;

/// Parse an MRZ `YYMMDD` date.
///
/// `yy <= 30` maps to `20yy`, anything above to `19yy`.
pub fn parse_mrz_date(value: &str) -> Result<NaiveDate, CoreError> {
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidDateFormat(format!(
            "expected 6 digits (YYMMDD), got {:?}",
            value
        )));
    }

    let field = |range: std::ops::Range<usize>| -> Result<u32, CoreError> {
        value[range]
            .parse::<u32>()
            .map_err(|e| CoreError::InvalidDateFormat(format!("{}: {}", value, e)))
    };
    let yy = field(0..2)?;
    let mm = field(2..4)?;
    let dd = field(4..6)?;

    let year = if yy <= MRZ_CENTURY_PIVOT {
        2000 + yy
    } else {
        1900 + yy
    };

    NaiveDate::from_ymd_opt(year as i32, mm, dd).ok_or_else(|| {
        CoreError::InvalidDateFormat(format!("{} is not a calendar date", value))
    })
}

/// Normalize a passport country code to the ISO3 form used by proposals.
///
/// Strips MRZ `<` filler, upper-cases, and maps common two-letter codes.
pub fn normalize_country_code(code: &str) -> String {
    let cleaned: String = code
        .trim()
        .trim_matches('<')
        .to_ascii_uppercase();

    match cleaned.as_str() {
        "RU" => "RUS".into(),
        "UA" => "UKR".into(),
        "KZ" => "KAZ".into(),
        "BY" => "BLR".into(),
        "US" => "USA".into(),
        "GB" => "GBR".into(),
        "DE" => "DEU".into(),
        "FR" => "FRA".into(),
        _ => cleaned,
    }
}

/// Personal data block as produced by the passport reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    pub nationality: String,
    pub issuing_state: String,
    pub date_of_birth: String,
    pub date_of_expiry: String,
    pub gender: String,
    pub document_number: String,
    pub document_type: String,
}

/// Reader output in either of its two shapes: fields nested under
/// `personalData`, or flat at the top level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPassportData {
    #[serde(default)]
    pub personal_data: Option<PersonalData>,
    #[serde(flatten)]
    pub flat: PersonalData,
}

/// The normalized passport value every protocol component consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportRecord {
    pub first_name: String,
    pub last_name: String,
    /// ISO3 nationality.
    pub nationality: String,
    /// ISO3 issuing state; this is the country used for eligibility.
    pub issuing_state: String,
    /// MRZ `YYMMDD`.
    pub date_of_birth: String,
    /// MRZ `YYMMDD`.
    pub date_of_expiry: String,
    pub gender: String,
    pub document_number: String,
    pub document_type: String,
}

impl PassportRecord {
    /// Normalize the reader's output. Nested fields win over flat ones, field
    /// by field.
    pub fn from_raw(raw: RawPassportData) -> Result<Self, CoreError> {
        let nested = raw.personal_data.unwrap_or_default();
        let flat = raw.flat;
        let pick = |a: String, b: String| if a.trim().is_empty() { b } else { a };

        let record = Self {
            first_name: pick(nested.first_name, flat.first_name).trim().to_string(),
            last_name: pick(nested.last_name, flat.last_name).trim().to_string(),
            nationality: normalize_country_code(&pick(nested.nationality, flat.nationality)),
            issuing_state: normalize_country_code(&pick(
                nested.issuing_state,
                flat.issuing_state,
            )),
            date_of_birth: pick(nested.date_of_birth, flat.date_of_birth).trim().to_string(),
            date_of_expiry: pick(nested.date_of_expiry, flat.date_of_expiry)
                .trim()
                .to_string(),
            gender: pick(nested.gender, flat.gender).trim().to_string(),
            document_number: pick(nested.document_number, flat.document_number)
                .trim()
                .to_string(),
            document_type: pick(nested.document_type, flat.document_type)
                .trim()
                .to_string(),
        };
        record.validate()?;

        tracing::debug!(
            issuing_state = %record.issuing_state,
            document_type = %record.document_type,
            "normalized passport record"
        );
        Ok(record)
    }

    /// Parse reader JSON (nested or flat) straight into a record.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let raw: RawPassportData = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Check the fields the eligibility protocol depends on.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.date_of_birth.is_empty() {
            return Err(CoreError::MissingField("dateOfBirth".into()));
        }
        if self.issuing_state.is_empty() {
            return Err(CoreError::MissingField("issuingState".into()));
        }
        Ok(())
    }

    /// Parsed date of birth.
    pub fn birth_date(&self) -> Result<NaiveDate, CoreError> {
        parse_mrz_date(&self.date_of_birth)
    }

    /// Registration commitment: keccak-256 of the compact JSON
    /// `{"documentNumber","dateOfBirth","dateOfExpiry"}`, keys in that order.
    pub fn passport_hash(&self) -> Result<B256, CoreError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Commitment<'a> {
            document_number: &'a str,
            date_of_birth: &'a str,
            date_of_expiry: &'a str,
        }

        let json = serde_json::to_string(&Commitment {
            document_number: &self.document_number,
            date_of_birth: &self.date_of_birth,
            date_of_expiry: &self.date_of_expiry,
        })?;
        Ok(keccak256(json.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_mrz_date_century_rule() {
        assert_eq!(parse_mrz_date("920503").unwrap().year(), 1992);
        assert_eq!(parse_mrz_date("050503").unwrap().year(), 2005);
        assert_eq!(parse_mrz_date("300101").unwrap().year(), 2030);
        assert_eq!(parse_mrz_date("310101").unwrap().year(), 1931);
    }

    #[test]
    fn test_parse_mrz_date_components() {
        let d = parse_mrz_date("920503").unwrap();
        assert_eq!((d.month(), d.day()), (5, 3));
    }

    #[test]
    fn test_parse_mrz_date_rejects_bad_input() {
        assert!(parse_mrz_date("").is_err());
        assert!(parse_mrz_date("92053").is_err());
        assert!(parse_mrz_date("9205031").is_err());
        assert!(parse_mrz_date("92O503").is_err());
        assert!(parse_mrz_date("+20503").is_err());
        assert!(parse_mrz_date("921303").is_err());
        assert!(parse_mrz_date("920231").is_err());
    }

    #[test]
    fn test_normalize_country_code() {
        assert_eq!(normalize_country_code("US"), "USA");
        assert_eq!(normalize_country_code("ua"), "UKR");
        assert_eq!(normalize_country_code("D<<"), "D");
        assert_eq!(normalize_country_code(" can "), "CAN");
        assert_eq!(normalize_country_code("USA"), "USA");
    }

    #[test]
    fn test_record_from_nested_json() {
        let json = r#"{
            "personalData": {
                "firstName": "ANNA",
                "lastName": "MARTIN",
                "nationality": "FRA",
                "issuingState": "FRA",
                "dateOfBirth": "920503",
                "dateOfExpiry": "300101",
                "gender": "F",
                "documentNumber": "12AB34567",
                "documentType": "P"
            },
            "faceImage": "ignored"
        }"#;
        let record = PassportRecord::from_json(json).unwrap();
        assert_eq!(record.first_name, "ANNA");
        assert_eq!(record.issuing_state, "FRA");
        assert_eq!(record.birth_date().unwrap().year(), 1992);
    }

    #[test]
    fn test_record_from_flat_json() {
        let json = r#"{
            "firstName": "JOHN",
            "lastName": "DOE",
            "nationality": "US",
            "issuingState": "US",
            "dateOfBirth": "850101"
        }"#;
        let record = PassportRecord::from_json(json).unwrap();
        assert_eq!(record.nationality, "USA");
        assert_eq!(record.issuing_state, "USA");
        assert_eq!(record.document_type, "");
    }

    #[test]
    fn test_record_nested_wins_over_flat() {
        let json = r#"{
            "personalData": { "issuingState": "CAN", "dateOfBirth": "850101" },
            "issuingState": "USA"
        }"#;
        let record = PassportRecord::from_json(json).unwrap();
        assert_eq!(record.issuing_state, "CAN");
    }

    #[test]
    fn test_passport_hash() {
        let record = PassportRecord::from_json(
            r#"{"issuingState":"USA","dateOfBirth":"850101","dateOfExpiry":"300101","documentNumber":"L898902C3"}"#,
        )
        .unwrap();
        let expected = keccak256(
            br#"{"documentNumber":"L898902C3","dateOfBirth":"850101","dateOfExpiry":"300101"}"#,
        );
        assert_eq!(record.passport_hash().unwrap(), expected);

        let mut other = record.clone();
        other.document_number = "X0000000".into();
        assert_ne!(other.passport_hash().unwrap(), expected);
    }

    #[test]
    fn test_record_missing_required_fields() {
        let no_dob = r#"{ "issuingState": "USA" }"#;
        assert!(matches!(
            PassportRecord::from_json(no_dob),
            Err(CoreError::MissingField(f)) if f == "dateOfBirth"
        ));

        let no_state = r#"{ "dateOfBirth": "850101" }"#;
        assert!(matches!(
            PassportRecord::from_json(no_state),
            Err(CoreError::MissingField(f)) if f == "issuingState"
        ));
    }
}
