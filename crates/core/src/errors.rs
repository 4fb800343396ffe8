//! Core error types for the premium aggregation pipeline.
//!
//! Stage functions never panic across their own boundary for recoverable
//! conditions: they return these types and the caller (a display surface)
//! decides what to show. Transport-specific errors from `premia-rating` are
//! converted to [`crate::rating::RatingError`] at the rating seam.

use chrono::ParseError as ChronoParseError;
use std::num::ParseFloatError;
use thiserror::Error;

use crate::proposals::ProposalError;
use crate::rating::RatingError;
use crate::sections::SectionError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the premium aggregation pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rating operation failed: {0}")]
    Rating(#[from] RatingError),

    #[error("Section operation failed: {0}")]
    Section(#[from] SectionError),

    #[error("Proposal operation failed: {0}")]
    Proposal(#[from] ProposalError),

    #[error("Premium calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that occur inside the premium calculators.
#[derive(Error, Debug)]
pub enum CalculatorError {
    /// Pro-rata was requested before any authoritative net premium existed
    /// (no cached adjustment result and no server aggregate).
    #[error("No authoritative net premium available: {0}")]
    MissingAuthoritativePremium(String),

    /// A stage was handed a zero or negative figure where a positive
    /// premium is required.
    #[error("Net premium must be positive, got {0}")]
    NonPositiveNetPremium(rust_decimal::Decimal),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for user input; rejected before any network call.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Rate '{name}' must be between 0 and 100, got {value}")]
    RateOutOfRange {
        name: String,
        value: rust_decimal::Decimal,
    },

    #[error("Cover days must be positive, got {0}")]
    NonPositiveCoverDays(i64),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
