use rust_decimal::Decimal;
use thiserror::Error;

use crate::input::ParseError;

#[derive(Debug, Error)]
pub enum FinMathError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Non-amortizing loan: payment {payment} does not exceed periodic interest {interest}")]
    NonAmortizing { payment: Decimal, interest: Decimal },

    #[error("No solution: {function} — {reason}")]
    NoSolution { function: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinMathError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FinMathError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn no_solution(function: &str, reason: impl Into<String>) -> Self {
        FinMathError::NoSolution {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinMathError {
    fn from(e: serde_json::Error) -> Self {
        FinMathError::SerializationError(e.to_string())
    }
}

impl From<ParseError> for FinMathError {
    fn from(e: ParseError) -> Self {
        FinMathError::InvalidInput {
            field: e.field().to_string(),
            reason: e.to_string(),
        }
    }
}
