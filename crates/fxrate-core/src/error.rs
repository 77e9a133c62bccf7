//! Error types for the FxRate crates.
//!
//! Missing market data is deliberately absent from this taxonomy: a data gap
//! resolves to a tagged fallback rate in the converter. What remains are
//! malformed inputs and the configuration fault of a provider that cannot
//! produce a series object at all.

use rust_decimal::Decimal;
use thiserror::Error;

/// A specialized Result type for FxRate operations.
pub type FxResult<T> = Result<T, FxError>;

/// The main error type for FxRate operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// Error in date construction or parsing.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Malformed currency code.
    #[error("Invalid currency code '{code}': {reason}")]
    InvalidCurrency {
        /// The rejected code.
        code: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Exchange rate factor that cannot be used (non-positive).
    #[error("Invalid exchange rate: {value} - {reason}")]
    InvalidRate {
        /// The invalid factor.
        value: Decimal,
        /// Reason for invalidity.
        reason: String,
    },

    /// Floating point input that has no decimal representation.
    #[error("Non-finite exchange rate input: {value}")]
    NonFiniteRate {
        /// The rejected input, formatted.
        value: String,
    },

    /// Observation does not belong to the series it was added to.
    #[error("Currency pair mismatch: expected {expected}, got {actual}")]
    PairMismatch {
        /// Pair of the receiving series.
        expected: String,
        /// Pair of the offered observation.
        actual: String,
    },

    /// The provider could not produce a series object for a pair.
    ///
    /// A correct repository always answers with at least an empty series, so
    /// this indicates a wiring defect rather than missing market data.
    #[error("No exchange rate time series found for {source_currency} -> {term_currency}")]
    SeriesNotFound {
        /// Source currency code.
        source_currency: String,
        /// Term currency code.
        term_currency: String,
    },

    /// Arithmetic overflow or division by zero in decimal arithmetic.
    #[error("Mathematical error: {reason}")]
    MathError {
        /// Description of the error.
        reason: String,
    },
}

impl FxError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid currency error.
    #[must_use]
    pub fn invalid_currency(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCurrency {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid rate error.
    #[must_use]
    pub fn invalid_rate(value: Decimal, reason: impl Into<String>) -> Self {
        Self::InvalidRate {
            value,
            reason: reason.into(),
        }
    }

    /// Creates a series-not-found error.
    #[must_use]
    pub fn series_not_found(source: impl Into<String>, term: impl Into<String>) -> Self {
        Self::SeriesNotFound {
            source_currency: source.into(),
            term_currency: term.into(),
        }
    }

    /// Creates a math error.
    #[must_use]
    pub fn math_error(reason: impl Into<String>) -> Self {
        Self::MathError {
            reason: reason.into(),
        }
    }

    /// Returns true for the configuration fault class of errors.
    #[must_use]
    pub fn is_configuration_fault(&self) -> bool {
        matches!(self, Self::SeriesNotFound { .. })
    }
}
