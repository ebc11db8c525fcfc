//! Per-type coercers turning one `RawValue` into a wire string.
//!
//! Each schema field carries a `FieldKind`; `FieldKind::coerce` is the single
//! accept/reject decision for that field. Numbers are accepted wherever a
//! plain string is expected, and numeric strings wherever a number is.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};

use super::codes::{is_country_code, is_us_state_code};
use super::raw::RawValue;

/// Why a single parameter value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Must be a number.")]
    NotNumber,

    #[error("Must be a string.")]
    NotString,

    #[error("String must have length greater than 0.")]
    EmptyString,

    #[error("Must be a boolean.")]
    NotBoolean,

    #[error("Must be a JavaScript Date Object or ISO 8601 Date String")]
    NotDate,

    #[error("Must be an ISO 8601 Date String")]
    NotIsoDate,

    #[error("Invalid country code. Country codes should follow ISO 3166-1 A2 convention, like 'US'.")]
    CountryCode,

    #[error("Invalid state code. State codes should follow ISO 3166-2 convention, like 'FL'.")]
    StateCode,

    #[error("Cospar IDs must be in the format of YYYY-NNN (eg. 2023-123)")]
    Cospar,
}

/// How a native date value is rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    /// `YYYY-MM-DD`.
    Day,
    /// RFC 3339 with milliseconds, UTC.
    Full,
}

/// The semantic type of one query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
    Boolean,
    Date(DatePrecision),
    CountryCode,
    StateCode,
    Cospar,
}

impl FieldKind {
    pub fn coerce(self, value: &RawValue) -> Result<String, FieldError> {
        match self {
            FieldKind::Number => coerce_number(value),
            FieldKind::String => coerce_string(value),
            FieldKind::Boolean => match value {
                RawValue::Bool(true) => Ok("1".to_string()),
                RawValue::Bool(false) => Ok("0".to_string()),
                _ => Err(FieldError::NotBoolean),
            },
            FieldKind::Date(precision) => coerce_date(value, precision),
            FieldKind::CountryCode => coerce_code(value, is_country_code, FieldError::CountryCode),
            FieldKind::StateCode => coerce_code(value, is_us_state_code, FieldError::StateCode),
            FieldKind::Cospar => match value {
                RawValue::String(s) if is_cospar_id(s) => Ok(s.clone()),
                RawValue::String(_) => Err(FieldError::Cospar),
                _ => Err(FieldError::NotString),
            },
        }
    }
}

/// Render a finite number the way it reads in a query string: no trailing
/// `.0`, no negative zero.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

fn coerce_number(value: &RawValue) -> Result<String, FieldError> {
    match value {
        RawValue::Number(n) if n.is_finite() => Ok(format_number(*n)),
        RawValue::String(s) => parse_number(s).map(format_number).ok_or(FieldError::NotNumber),
        _ => Err(FieldError::NotNumber),
    }
}

/// Strict numeric parse: blank and non-finite input is rejected.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn coerce_string(value: &RawValue) -> Result<String, FieldError> {
    let s = match value {
        RawValue::String(s) => s.clone(),
        RawValue::Number(n) if n.is_finite() => format_number(*n),
        _ => return Err(FieldError::NotString),
    };
    if s.is_empty() {
        return Err(FieldError::EmptyString);
    }
    Ok(s)
}

fn coerce_date(value: &RawValue, precision: DatePrecision) -> Result<String, FieldError> {
    match value {
        RawValue::Date(dt) => Ok(match precision {
            DatePrecision::Day => dt.format("%Y-%m-%d").to_string(),
            DatePrecision::Full => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
        RawValue::String(s) if is_iso8601(s) => Ok(s.clone()),
        RawValue::String(_) => Err(FieldError::NotIsoDate),
        _ => Err(FieldError::NotDate),
    }
}

fn coerce_code(
    value: &RawValue,
    known: fn(&str) -> bool,
    invalid: FieldError,
) -> Result<String, FieldError> {
    match value {
        RawValue::String(s) if known(s) => Ok(s.clone()),
        RawValue::String(_) => Err(invalid),
        _ => Err(FieldError::NotString),
    }
}

/// Calendar dates, RFC 3339 timestamps and zone-less local timestamps.
fn is_iso8601(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
}

/// `YYYY-NNN`, e.g. `2023-123`.
fn is_cospar_id(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 8
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
