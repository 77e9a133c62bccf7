//! Monetary amount tagged with its currency.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CurrencyCode;

/// An amount of money in a specific currency.
///
/// # Example
///
/// ```rust
/// use fxrate_core::types::Money;
/// use rust_decimal_macros::dec;
///
/// let money = Money::new(dec!(12.345), "EUR");
/// assert_eq!(money.rounded().amount(), dec!(12.34));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    /// Creates a new amount.
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<CurrencyCode>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Returns the amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Rounds to the currency's minor units, ties toward zero.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.minor_units(),
                RoundingStrategy::MidpointTowardZero,
            ),
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}
