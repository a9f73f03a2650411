//! Common validation utilities.

use chrono::{DateTime, NaiveDate};
use validator::ValidationError;

/// Returns the trimmed value, or a `required` error naming the field.
///
/// `None`, empty strings and whitespace-only strings are all treated as absent.
pub fn require_present(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => {
            let mut err = ValidationError::new("required");
            err.message = Some(format!("{} is required", field).into());
            Err(err)
        }
    }
}

/// Parses a caller-supplied service date.
///
/// Accepts a calendar date (`2024-01-10`) or an RFC 3339 timestamp, in which
/// case the date part in the timestamp's own offset is kept.
pub fn parse_service_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.date_naive());
    }

    let mut err = ValidationError::new("date_format");
    err.message = Some("date must be a valid date (YYYY-MM-DD)".into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present_trims() {
        assert_eq!(
            require_present("reason", Some("  sensor drift ")).unwrap(),
            "sensor drift"
        );
    }

    #[test]
    fn test_require_present_missing() {
        let err = require_present("reason", None).unwrap_err();
        assert_eq!(err.code, "required");
        assert_eq!(err.message.unwrap().to_string(), "reason is required");
    }

    #[test]
    fn test_require_present_blank() {
        assert!(require_present("reportedBy", Some("")).is_err());
        let err = require_present("reportedBy", Some("   \t")).unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "reportedBy is required");
    }

    #[test]
    fn test_parse_service_date_plain() {
        let date = parse_service_date("2024-01-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_parse_service_date_rfc3339() {
        let date = parse_service_date("2024-01-12T23:30:00-05:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_parse_service_date_rejects_garbage() {
        let err = parse_service_date("last tuesday").unwrap_err();
        assert_eq!(err.code, "date_format");
        assert!(parse_service_date("2024-13-01").is_err());
    }
}
