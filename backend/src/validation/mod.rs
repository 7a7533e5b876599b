//! JSON Schema validation of dashboard records.
//!
//! The clean record schema (`schemas/clean-record.json`, Draft 7) is embedded
//! at compile time. It restates the record invariants (non-blank site, central
//! region, known status, `YYYY-MM-DD` date, numeric coordinates) so a
//! projection bug is caught before anything reaches `data.json`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use fuelmap::validation::validate_clean_record;
//!
//! let record = json!({
//!     "SiteName": "Site1",
//!     "Region": "Central",
//!     "COWStatus": "ON-AIR",
//!     "NextFuelingPlan": "2025-12-15",
//!     "lat": 24.7136,
//!     "lng": 46.6753
//! });
//! assert!(validate_clean_record(&record).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::CleanRecord;

const CLEAN_RECORD_SCHEMA: &str = include_str!("../../schemas/clean-record.json");

static CLEAN_RECORD_VALIDATOR: Lazy<jsonschema::Validator> = Lazy::new(|| {
    let schema: Value =
        serde_json::from_str(CLEAN_RECORD_SCHEMA).expect("embedded clean record schema is JSON");
    jsonschema::draft7::new(&schema).expect("embedded clean record schema is valid Draft 7")
});

/// Validate one record (as JSON) against the clean record schema.
pub fn validate_clean_record(data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = CLEAN_RECORD_VALIDATOR
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check against the clean record schema.
pub fn is_valid_clean_record(data: &Value) -> bool {
    CLEAN_RECORD_VALIDATOR.is_valid(data)
}

/// Validate every record, failing on the first invalid one.
pub fn validate_records(records: &[CleanRecord]) -> Result<(), ValidationError> {
    for (index, record) in records.iter().enumerate() {
        let value = serde_json::to_value(record).map_err(|e| ValidationError::SchemaError {
            index,
            errors: vec![e.to_string()],
        })?;
        validate_clean_record(&value)
            .map_err(|errors| ValidationError::SchemaError { index, errors })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CowStatus;
    use chrono::NaiveDate;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "SiteName": "Site1",
            "Region": "Central",
            "COWStatus": "ON-AIR",
            "NextFuelingPlan": "2025-12-15",
            "lat": 24.7136,
            "lng": 46.6753
        })
    }

    #[test]
    fn test_valid_record() {
        assert!(is_valid_clean_record(&valid()));
        assert!(validate_clean_record(&valid()).is_ok());
    }

    #[test]
    fn test_region_is_case_insensitive() {
        let mut record = valid();
        record["Region"] = json!("CENTRAL");
        assert!(is_valid_clean_record(&record));
        record["Region"] = json!("North");
        assert!(!is_valid_clean_record(&record));
    }

    #[test]
    fn test_invalid_fields() {
        for (field, bad) in [
            ("SiteName", json!("")),
            ("COWStatus", json!("OFF-AIR")),
            ("NextFuelingPlan", json!("12-15-2025")),
            ("lat", json!("24.7")),
            ("lng", json!(null)),
        ] {
            let mut record = valid();
            record[field] = bad;
            assert!(!is_valid_clean_record(&record), "field {field} should be rejected");
        }
    }

    #[test]
    fn test_missing_field_errors() {
        let result = validate_clean_record(&json!({ "SiteName": "Site1" }));
        let errors = result.unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_validate_records_reports_index() {
        let good = CleanRecord {
            site_name: "S1".into(),
            region: "Central".into(),
            cow_status: CowStatus::OnAir,
            next_fueling_plan: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            lat: 1.0,
            lng: 2.0,
        };
        let bad = CleanRecord {
            region: "North".into(),
            ..good.clone()
        };
        assert!(validate_records(&[good.clone()]).is_ok());
        match validate_records(&[good, bad]) {
            Err(ValidationError::SchemaError { index, .. }) => assert_eq!(index, 1),
            Ok(()) => panic!("expected the second record to fail"),
        }
    }
}
