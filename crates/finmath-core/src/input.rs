//! Text-to-number boundary for user-entered form values.
//!
//! Every raw field is parsed into a typed value (or a [`ParseError`]) before it
//! reaches the calculators, so empty or malformed text never turns into a
//! silent zero.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{field} is required")]
    Empty { field: String },

    #[error("{field}: '{raw}' is not a number")]
    NotANumber { field: String, raw: String },

    #[error("{field} cannot be negative")]
    Negative { field: String },

    #[error("{field}: '{raw}' must be a whole number")]
    NotWhole { field: String, raw: String },

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("{field}: '{raw}' is out of range")]
    OutOfRange { field: String, raw: String },
}

impl ParseError {
    pub fn field(&self) -> &str {
        match self {
            ParseError::Empty { field }
            | ParseError::NotANumber { field, .. }
            | ParseError::Negative { field }
            | ParseError::NotWhole { field, .. }
            | ParseError::Zero { field }
            | ParseError::OutOfRange { field, .. } => field,
        }
    }
}

/// Parse a money amount such as `"$250,000.50"` or `"1 200"`.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, ParseError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '_') && !c.is_whitespace())
        .collect();
    parse_cleaned(field, raw, &cleaned)
}

/// Like [`parse_amount`], but blank text means "not provided".
pub fn parse_optional_amount(field: &str, raw: &str) -> Result<Option<Decimal>, ParseError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_amount(field, raw).map(Some)
}

/// Parse a percentage such as `"6.5"` or `"6.5%"`. Returns the percent value (6.5).
pub fn parse_percent(field: &str, raw: &str) -> Result<Decimal, ParseError> {
    let trimmed = raw.trim();
    let without_sign = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let cleaned: String = without_sign
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    parse_cleaned(field, raw, &cleaned)
}

/// Parse a count of periods. Zero, negative and fractional values are rejected.
pub fn parse_periods(field: &str, raw: &str) -> Result<u32, ParseError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    let value = parse_cleaned(field, raw, &cleaned)?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ParseError::Negative {
            field: field.into(),
        });
    }
    if value.is_zero() {
        return Err(ParseError::Zero {
            field: field.into(),
        });
    }
    if value.fract() != Decimal::ZERO {
        return Err(ParseError::NotWhole {
            field: field.into(),
            raw: raw.trim().into(),
        });
    }
    value.to_u32().ok_or_else(|| ParseError::OutOfRange {
        field: field.into(),
        raw: raw.trim().into(),
    })
}

fn parse_cleaned(field: &str, raw: &str, cleaned: &str) -> Result<Decimal, ParseError> {
    if cleaned.is_empty() {
        return Err(ParseError::Empty {
            field: field.into(),
        });
    }
    Decimal::from_str(cleaned).map_err(|_| ParseError::NotANumber {
        field: field.into(),
        raw: raw.trim().into(),
    })
}
