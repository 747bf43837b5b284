use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;

use crate::error::ValidationError;

// ASCII digits only; `\d` in `regex` would also accept other scripts' digits.
static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})\.([0-9]{2})\.([0-9]{4})$").expect("date pattern compiles")
});

/// True if the token looks like `DD.MM.YYYY`, whether or not that day exists.
pub fn is_date_shaped(token: &str) -> bool {
    DATE_SHAPE.is_match(token)
}

/// Number of days in `month` of `year` (proleptic Gregorian), or `None` if
/// the month is not 1..=12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// A calendar-checked birth date. Keeps the exact text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthDate(String);

impl BirthDate {
    pub fn parse(token: &str) -> Result<Self, ValidationError> {
        let bad_format = || ValidationError::InvalidDateFormat {
            token: token.to_string(),
        };
        let caps = DATE_SHAPE.captures(token).ok_or_else(bad_format)?;
        let day: u32 = caps[1].parse().map_err(|_| bad_format())?;
        let month: u32 = caps[2].parse().map_err(|_| bad_format())?;
        let year: i32 = caps[3].parse().map_err(|_| bad_format())?;

        if !(1..=12).contains(&month) {
            return Err(ValidationError::InvalidMonth {
                token: token.to_string(),
                month,
            });
        }
        let max = days_in_month(year, month).ok_or_else(bad_format)?;
        if day < 1 || day > max {
            return Err(ValidationError::InvalidDay {
                token: token.to_string(),
                day,
                max,
            });
        }
        Ok(BirthDate(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BirthDate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[test]
fn test_date_shape() {
    assert!(is_date_shaped("15.05.1990"));
    assert!(is_date_shaped("99.99.0000"));
    assert!(!is_date_shaped("1.05.1990"));
    assert!(!is_date_shaped("15-05-1990"));
    assert!(!is_date_shaped("15.05.19900"));
    assert!(!is_date_shaped("١٥.٠٥.١٩٩٠"));
}

#[test]
fn test_days_in_month() {
    assert_eq!(days_in_month(2024, 2), Some(29));
    assert_eq!(days_in_month(2023, 2), Some(28));
    assert_eq!(days_in_month(1900, 2), Some(28));
    assert_eq!(days_in_month(2000, 2), Some(29));
    assert_eq!(days_in_month(2024, 4), Some(30));
    assert_eq!(days_in_month(2024, 12), Some(31));
    assert_eq!(days_in_month(2024, 13), None);
    assert_eq!(days_in_month(2024, 0), None);
}

#[test]
fn test_leap_days() {
    assert!(BirthDate::parse("29.02.2024").is_ok());
    assert_eq!(
        BirthDate::parse("29.02.2023"),
        Err(ValidationError::InvalidDay {
            token: "29.02.2023".into(),
            day: 29,
            max: 28
        })
    );
}

#[test]
fn test_month_lengths() {
    assert!(BirthDate::parse("31.12.2024").is_ok());
    assert!(matches!(
        BirthDate::parse("31.04.2024"),
        Err(ValidationError::InvalidDay { max: 30, .. })
    ));
    assert!(matches!(
        BirthDate::parse("00.01.2024"),
        Err(ValidationError::InvalidDay { day: 0, .. })
    ));
}

#[test]
fn test_bad_month() {
    assert_eq!(
        BirthDate::parse("10.13.2000"),
        Err(ValidationError::InvalidMonth {
            token: "10.13.2000".into(),
            month: 13
        })
    );
    assert!(matches!(
        BirthDate::parse("10.00.2000"),
        Err(ValidationError::InvalidMonth { month: 0, .. })
    ));
}

#[test]
fn test_not_a_date() {
    assert!(matches!(
        BirthDate::parse("Ivanov"),
        Err(ValidationError::InvalidDateFormat { .. })
    ));
}

#[test]
fn test_keeps_text() {
    assert_eq!(BirthDate::parse("01.01.0001").unwrap().as_str(), "01.01.0001");
}
