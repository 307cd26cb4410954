use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::AppError;
use crate::shared::expiration::{parse_expiration_date, ExpirationError};

lazy_static! {
    /// Regex for CAS registry numbers
    /// Two to seven digits, two digits and a single check digit, separated by hyphens
    /// - Valid: "7732-18-5", "64-17-5", "1310-73-2"
    /// - Invalid: "7732185", "7732-18", "77-3-2-1", "ab-17-5"
    pub static ref CAS_NUMBER_REGEX: Regex = Regex::new(r"^\d{2,7}-\d{2}-\d$").unwrap();

    /// Regex for UN numbers used on emergency sheets
    /// Four digits with an optional "UN" prefix
    /// - Valid: "1203", "UN1203", "UN 1203", "un1090"
    /// - Invalid: "120", "UN12034", "U1203"
    pub static ref UN_NUMBER_REGEX: Regex = Regex::new(r"(?i)^(UN\s?)?\d{4}$").unwrap();
}

/// Canonical `UN1234` form of a UN number, `None` when it does not match
pub fn normalize_un_number(raw: &str) -> Option<String> {
    let value = raw.trim();
    if !UN_NUMBER_REGEX.is_match(value) {
        return None;
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    Some(format!("UN{}", digits))
}

/// Parse a date form field with the formats accepted for expiration dates
pub fn parse_form_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    parse_expiration_date(raw).map_err(|e| match e {
        ExpirationError::Missing => AppError::Validation(format!("{} is required", field)),
        ExpirationError::Invalid(value) => {
            AppError::Validation(format!("Invalid {} '{}'", field, value))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cas_number_regex_valid() {
        assert!(CAS_NUMBER_REGEX.is_match("7732-18-5"));
        assert!(CAS_NUMBER_REGEX.is_match("64-17-5"));
        assert!(CAS_NUMBER_REGEX.is_match("1310-73-2"));
        assert!(CAS_NUMBER_REGEX.is_match("1234567-89-0"));
    }

    #[test]
    fn test_cas_number_regex_invalid() {
        assert!(!CAS_NUMBER_REGEX.is_match("7732185")); // no hyphens
        assert!(!CAS_NUMBER_REGEX.is_match("7732-18")); // missing check digit
        assert!(!CAS_NUMBER_REGEX.is_match("7-18-5")); // first group too short
        assert!(!CAS_NUMBER_REGEX.is_match("ab-17-5"));
        assert!(!CAS_NUMBER_REGEX.is_match(""));
    }

    #[test]
    fn test_un_number_regex() {
        assert!(UN_NUMBER_REGEX.is_match("1203"));
        assert!(UN_NUMBER_REGEX.is_match("UN1203"));
        assert!(UN_NUMBER_REGEX.is_match("UN 1203"));
        assert!(UN_NUMBER_REGEX.is_match("un1090"));

        assert!(!UN_NUMBER_REGEX.is_match("120"));
        assert!(!UN_NUMBER_REGEX.is_match("UN12034"));
        assert!(!UN_NUMBER_REGEX.is_match("U1203"));
    }

    #[test]
    fn test_parse_form_date_names_the_field() {
        assert_eq!(
            parse_form_date("issue_date", "15/03/2025").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert!(matches!(
            parse_form_date("issue_date", "soon"),
            Err(AppError::Validation(ref m)) if m.contains("issue_date")
        ));
        assert!(matches!(
            parse_form_date("calibration_date", " "),
            Err(AppError::Validation(ref m)) if m == "calibration_date is required"
        ));
    }

    #[test]
    fn test_normalize_un_number() {
        assert_eq!(normalize_un_number("1203").as_deref(), Some("UN1203"));
        assert_eq!(normalize_un_number(" un 1090 ").as_deref(), Some("UN1090"));
        assert_eq!(normalize_un_number("UN12034"), None);
    }
}
