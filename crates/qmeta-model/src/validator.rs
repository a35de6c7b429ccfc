//! Per-question answer validators.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::question::ValueRange;

/// Optional numeric bounds declared on a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "[{min}, {max}]"),
            (Some(min), None) => write!(f, ">= {min}"),
            (None, Some(max)) => write!(f, "<= {max}"),
            (None, None) => write!(f, "any number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueIssue {
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("'{0}' is not 0 or 1")]
    NotBinary(String),
    #[error("'{value}' is not one of {allowed:?}")]
    NotAChoice { value: String, allowed: Vec<i64> },
    #[error("'{value}' is outside {bounds}")]
    OutOfRange { value: String, bounds: Bounds },
    #[error("'{0}' is not a date or time")]
    NotADate(String),
}

/// Validation rule attached to a catalog question.
///
/// Blank answers always pass; missingness is handled by scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    Binary,
    Choices(Vec<i64>),
    Numeric(Bounds),
    Date,
    Slider(ValueRange),
    AcceptAll,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

impl Validator {
    pub fn validate(&self, raw: &str) -> Result<(), ValueIssue> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(());
        }
        match self {
            Validator::AcceptAll => Ok(()),
            Validator::Date => {
                if is_date_like(value) {
                    Ok(())
                } else {
                    Err(ValueIssue::NotADate(value.to_string()))
                }
            }
            Validator::Binary => match parse_number(value)? {
                v if v == 0.0 || v == 1.0 => Ok(()),
                _ => Err(ValueIssue::NotBinary(value.to_string())),
            },
            Validator::Choices(keys) => {
                let number = parse_number(value)?;
                if number.fract() == 0.0 && keys.contains(&(number as i64)) {
                    Ok(())
                } else {
                    Err(ValueIssue::NotAChoice {
                        value: value.to_string(),
                        allowed: keys.clone(),
                    })
                }
            }
            Validator::Numeric(bounds) => check_bounds(value, *bounds),
            Validator::Slider(range) => {
                check_bounds(value, Bounds::new(Some(range.min), Some(range.max)))
            }
        }
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.validate(raw).is_ok()
    }
}

fn parse_number(value: &str) -> Result<f64, ValueIssue> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValueIssue::NotNumeric(value.to_string()))
}

fn check_bounds(value: &str, bounds: Bounds) -> Result<(), ValueIssue> {
    let number = parse_number(value)?;
    if bounds.contains(number) {
        Ok(())
    } else {
        Err(ValueIssue::OutOfRange {
            value: value.to_string(),
            bounds,
        })
    }
}

fn is_date_like(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        || TIME_FORMATS
            .iter()
            .any(|format| NaiveTime::parse_from_str(value, format).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_accepts_zero_and_one() {
        assert!(Validator::Binary.is_valid("0"));
        assert!(Validator::Binary.is_valid("1.0"));
        assert_eq!(
            Validator::Binary.validate("2"),
            Err(ValueIssue::NotBinary("2".to_string()))
        );
        assert!(Validator::Binary.is_valid(""));
    }

    #[test]
    fn choices_require_declared_keys() {
        let validator = Validator::Choices(vec![1, 2, 3]);
        assert!(validator.is_valid("2"));
        assert!(!validator.is_valid("2.5"));
        assert!(!validator.is_valid("4"));
        assert!(matches!(validator.validate("often"), Err(ValueIssue::NotNumeric(_))));
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let validator = Validator::Numeric(Bounds::new(Some(0.0), Some(18.0)));
        assert!(validator.is_valid("0"));
        assert!(validator.is_valid("18"));
        assert!(!validator.is_valid("19"));
        assert!(Validator::Numeric(Bounds::default()).is_valid("-3"));
    }

    #[test]
    fn slider_uses_range() {
        let validator = Validator::Slider(ValueRange::SLIDER_DEFAULT);
        assert!(validator.is_valid("7"));
        assert!(!validator.is_valid("11"));
    }

    #[test]
    fn dates_and_times_parse() {
        assert!(Validator::Date.is_valid("2024-03-01"));
        assert!(Validator::Date.is_valid("01-03-2024 10:15"));
        assert!(Validator::Date.is_valid("09:30"));
        assert!(!Validator::Date.is_valid("next week"));
    }
}
