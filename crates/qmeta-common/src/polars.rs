//! Polars value helpers.
//!
//! Response tables arrive with mixed column types (integers from clean
//! exports, strings where a form allowed free text or `NA` markers), so
//! everything numeric is read through [`any_to_f64`].

use polars::prelude::{AnyValue, DataFrame, PolarsResult};

/// Cell contents that count as missing in response exports.
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

/// Returns true when a raw cell string is one of the missing markers.
pub fn is_missing_marker(value: &str) -> bool {
    let trimmed = value.trim();
    MISSING_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Converts an `AnyValue` to `f64`.
///
/// Nulls, NaN, missing markers and non-numeric strings all map to `None`.
/// Booleans count as 0/1 so checkbox exports score like indicator items.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let number = match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    };
    number.filter(|v| !v.is_nan())
}

/// Parses a string as `f64`, returning `None` for missing markers and invalid input.
pub fn parse_f64(value: &str) -> Option<f64> {
    if is_missing_marker(value) {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Reads a frame column as optional floats, one entry per row.
///
/// # Errors
///
/// Returns the polars error when the column does not exist.
pub fn column_as_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?;
    Ok((0..df.height())
        .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}
