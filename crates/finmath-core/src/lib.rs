pub mod error;
pub mod input;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "savings")]
pub mod savings;

pub use error::FinMathError;
pub use types::*;

/// Standard result type for all finmath operations
pub type FinMathResult<T> = Result<T, FinMathError>;
