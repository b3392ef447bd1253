//! Shared helpers for command handlers.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

use crate::error::CliError;

/// Accepted `--date` spellings.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// Parse a `--date` value (YYYY-MM-DD or DD-MM-YYYY); today when absent.
pub fn parse_date(value: Option<&str>) -> Result<NaiveDate, CliError> {
    let Some(raw) = value.map(str::trim) else {
        return Ok(chrono::Local::now().date_naive());
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| CliError::Validation {
            field: "date".into(),
            reason: format!("'{raw}' is not a date; use YYYY-MM-DD or DD-MM-YYYY"),
        })
}

/// Show only the ends of a credential.
pub fn mask_token(token: &SecretString) -> String {
    let raw = token.expose_secret();
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn both_date_orders_parse() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date(Some("2024-03-07")).unwrap(), expected);
        assert_eq!(parse_date(Some("07-03-2024")).unwrap(), expected);
        assert_eq!(parse_date(Some(" 2024-03-07 ")).unwrap(), expected);
    }

    #[test]
    fn bad_dates_are_usage_errors() {
        let err = parse_date(Some("2024/03/07")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
        assert!(parse_date(Some("31-02-2024")).is_err());
    }

    #[test]
    fn tokens_are_masked() {
        assert_eq!(mask_token(&SecretString::from("abcdefghijkl")), "abcd…ijkl");
        assert_eq!(mask_token(&SecretString::from("short")), "*****");
    }
}
