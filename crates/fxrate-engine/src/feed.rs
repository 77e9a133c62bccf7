//! Rate feed traits.
//!
//! A feed is whatever populates the repository: a provider download, a file
//! import, a test fixture. Feeds hand over plain observation tuples and the
//! repository takes it from there; transport and formats live outside this
//! crate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fxrate_core::{CurrencyCode, CurrencyPair, Date, ExchangeRate, FxResult};

/// A single `(source, term, date, factor)` observation delivered by a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    /// Currency pair
    pub pair: CurrencyPair,
    /// Observation date
    pub date: Date,
    /// Factor (units of term per unit of source)
    pub value: Decimal,
}

impl RateObservation {
    /// Creates a new observation.
    #[must_use]
    pub fn new(
        source: impl Into<CurrencyCode>,
        term: impl Into<CurrencyCode>,
        date: Date,
        value: Decimal,
    ) -> Self {
        Self {
            pair: CurrencyPair::new(source, term),
            date,
            value,
        }
    }

    /// Returns the observation as an exchange rate.
    #[must_use]
    pub fn rate(&self) -> ExchangeRate {
        ExchangeRate::new(self.date, self.value)
    }
}

/// Trait for exchange rate feeds.
pub trait RateFeed: Send + Sync {
    /// Human readable feed name, used in logs.
    fn name(&self) -> &str;

    /// Returns every observation the feed currently holds.
    fn observations(&self) -> FxResult<Vec<RateObservation>>;
}

/// A feed backed by observations held in memory.
///
/// Used to seed a repository at startup and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateFeed {
    name: String,
    observations: Vec<RateObservation>,
}

impl InMemoryRateFeed {
    /// Creates an empty feed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            observations: Vec::new(),
        }
    }

    /// Builder: adds one observation.
    pub fn with_rate(
        mut self,
        source: impl Into<CurrencyCode>,
        term: impl Into<CurrencyCode>,
        date: Date,
        value: Decimal,
    ) -> Self {
        self.push(RateObservation::new(source, term, date, value));
        self
    }

    /// Adds one observation.
    pub fn push(&mut self, observation: RateObservation) {
        self.observations.push(observation);
    }

    /// Returns the number of buffered observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if the feed holds nothing.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl RateFeed for InMemoryRateFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn observations(&self) -> FxResult<Vec<RateObservation>> {
        Ok(self.observations.clone())
    }
}
