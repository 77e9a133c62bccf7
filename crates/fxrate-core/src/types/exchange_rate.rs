//! Exchange rate observation.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Date;
use crate::error::{FxError, FxResult};

/// An exchange rate on a given date.
///
/// Means "1 unit of source currency = `value` units of term currency" on
/// `date`. The pair itself is carried by the series holding the rate. Two
/// rates are equal iff their dates and values are numerically equal.
///
/// # Example
///
/// ```rust
/// use fxrate_core::types::{Date, ExchangeRate};
/// use rust_decimal_macros::dec;
///
/// let date = Date::from_ymd(2024, 1, 1).unwrap();
/// let rate = ExchangeRate::new(date, dec!(1.10));
/// assert_eq!(rate, ExchangeRate::new(date, dec!(1.100)));
/// assert!(ExchangeRate::identity(date).is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Observation date
    date: Date,
    /// Conversion factor
    value: Decimal,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub fn new(date: Date, value: Decimal) -> Self {
        Self { date, value }
    }

    /// Creates the identity rate (factor 1) for a date.
    #[must_use]
    pub fn identity(date: Date) -> Self {
        Self {
            date,
            value: Decimal::ONE,
        }
    }

    /// Creates a rate from a floating point factor as delivered by feeds.
    ///
    /// # Errors
    ///
    /// Returns `FxError::NonFiniteRate` for NaN or infinite input, and
    /// `FxError::InvalidRate` for non-positive factors.
    pub fn from_f64(date: Date, value: f64) -> FxResult<Self> {
        if !value.is_finite() {
            return Err(FxError::NonFiniteRate {
                value: value.to_string(),
            });
        }
        let decimal = Decimal::from_f64(value).ok_or_else(|| FxError::NonFiniteRate {
            value: value.to_string(),
        })?;
        let rate = Self::new(date, decimal);
        rate.validate()?;
        Ok(rate)
    }

    /// Validates that the factor is positive.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidRate` if the factor is zero or negative.
    pub fn validate(&self) -> FxResult<()> {
        if self.value <= Decimal::ZERO {
            return Err(FxError::invalid_rate(
                self.value,
                "Exchange rate must be positive",
            ));
        }
        Ok(())
    }

    /// Returns the observation date.
    #[must_use]
    pub fn date(&self) -> Date {
        self.date
    }

    /// Returns the conversion factor.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the factor is exactly one.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.value == Decimal::ONE
    }

    /// Returns the reciprocal rate (term to source) on the same date.
    ///
    /// # Errors
    ///
    /// Returns `FxError::MathError` if the factor is zero.
    pub fn inverse(&self) -> FxResult<Self> {
        Decimal::ONE
            .checked_div(self.value)
            .map(|value| Self::new(self.date, value))
            .ok_or_else(|| FxError::math_error(format!("cannot invert rate {}", self.value)))
    }

    /// Converts an amount of source currency into term currency.
    ///
    /// # Errors
    ///
    /// Returns `FxError::MathError` on decimal overflow.
    pub fn apply(&self, amount: Decimal) -> FxResult<Decimal> {
        amount
            .checked_mul(self.value)
            .ok_or_else(|| FxError::math_error(format!("{amount} * {} overflows", self.value)))
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.value, self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_equality_is_numeric() {
        let a = ExchangeRate::new(date(2024, 1, 1), dec!(1.10));
        let b = ExchangeRate::new(date(2024, 1, 1), dec!(1.1000));
        let c = ExchangeRate::new(date(2024, 1, 2), dec!(1.10));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_f64() {
        let rate = ExchangeRate::from_f64(date(2024, 1, 1), 1.08).unwrap();
        assert_eq!(rate.value().round_dp(10), dec!(1.08));

        assert!(matches!(
            ExchangeRate::from_f64(date(2024, 1, 1), f64::NAN),
            Err(FxError::NonFiniteRate { .. })
        ));
        assert!(matches!(
            ExchangeRate::from_f64(date(2024, 1, 1), f64::INFINITY),
            Err(FxError::NonFiniteRate { .. })
        ));
        assert!(matches!(
            ExchangeRate::from_f64(date(2024, 1, 1), -1.0),
            Err(FxError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(ExchangeRate::new(date(2024, 1, 1), dec!(0.0001)).validate().is_ok());
        assert!(ExchangeRate::new(date(2024, 1, 1), Decimal::ZERO).validate().is_err());
    }

    #[test]
    fn test_inverse() {
        let rate = ExchangeRate::new(date(2024, 1, 1), dec!(150));
        let inverse = rate.inverse().unwrap();
        assert_eq!(inverse.date(), rate.date());
        assert_eq!((inverse.value() * dec!(150)).round_dp(20), Decimal::ONE);

        assert!(ExchangeRate::new(date(2024, 1, 1), Decimal::ZERO)
            .inverse()
            .is_err());
    }

    #[test]
    fn test_apply() {
        let rate = ExchangeRate::new(date(2024, 1, 1), dec!(1.10));
        assert_eq!(rate.apply(dec!(100)).unwrap(), dec!(110));
        assert!(rate.apply(Decimal::MAX).is_err());
    }

    #[test]
    fn test_display() {
        let rate = ExchangeRate::new(date(2024, 1, 1), dec!(1.10));
        assert_eq!(rate.to_string(), "1.10 @ 2024-01-01");
    }
}
