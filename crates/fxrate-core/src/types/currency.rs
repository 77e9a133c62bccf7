//! Currency codes and ordered currency pairs.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::{FxError, FxResult};

/// An ISO 4217-like currency code.
///
/// The engine treats codes as opaque keys: two codes are the same currency
/// iff their strings are equal. [`CurrencyCode::parse`] is available for
/// boundaries that want to reject obviously malformed input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code without validation.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Parses a currency code, normalizing to upper case.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidCurrency` unless the input is three ASCII letters.
    pub fn parse(code: &str) -> FxResult<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(FxError::invalid_currency(code, "expected three ASCII letters"));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of minor units (decimal places) for amounts.
    #[must_use]
    pub fn minor_units(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "CLP" | "ISK" | "VND" | "PYG" | "UGX" | "XOF" | "XAF" => 0,
            "BHD" | "KWD" | "OMR" | "JOD" | "TND" | "LYD" | "IQD" => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl Borrow<str> for CurrencyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An ordered currency pair.
///
/// For EUR/USD = 1.10, source=EUR, term=USD, meaning 1 EUR = 1.10 USD.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Source (base) currency
    pub source: CurrencyCode,
    /// Term (quote) currency
    pub term: CurrencyCode,
}

impl CurrencyPair {
    /// Creates a new currency pair.
    #[must_use]
    pub fn new(source: impl Into<CurrencyCode>, term: impl Into<CurrencyCode>) -> Self {
        Self {
            source: source.into(),
            term: term.into(),
        }
    }

    /// Returns the inverse pair (swaps source and term).
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            source: self.term.clone(),
            term: self.source.clone(),
        }
    }

    /// Returns true if source and term are the same currency.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.source == self.term
    }

    /// Returns the ticker form (e.g., "EURUSD").
    #[must_use]
    pub fn ticker(&self) -> String {
        format!("{}{}", self.source, self.term)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.term)
    }
}
