//! Exchange rate time series for one currency pair.
//!
//! Observations are kept sorted by date and unique per date, so lookups are a
//! binary search. Lookup carries the last known rate forward: a query between
//! two observation dates resolves to the earlier one.

use serde::{Deserialize, Serialize};

use fxrate_core::{CurrencyCode, CurrencyPair, Date, ExchangeRate, FxResult};

/// Origin of a series held by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Registered from a rate feed.
    Raw,
    /// Composed from raw series through intermediate currencies.
    Derived,
    /// No data exists and none can be derived.
    Empty,
}

/// Ordered, date-indexed exchange rate observations for a source/term pair.
///
/// # Example
///
/// ```rust
/// use fxrate_core::{CurrencyPair, Date, ExchangeRate};
/// use fxrate_engine::RateSeries;
/// use rust_decimal_macros::dec;
///
/// let d = |m, day| Date::from_ymd(2024, m, day).unwrap();
/// let mut series = RateSeries::new(CurrencyPair::new("EUR", "USD"));
/// series.add_observation(ExchangeRate::new(d(1, 1), dec!(1.10))).unwrap();
/// series.add_observation(ExchangeRate::new(d(3, 1), dec!(1.08))).unwrap();
///
/// assert_eq!(series.lookup_rate(d(2, 15)).unwrap().value(), dec!(1.10));
/// assert!(series.lookup_rate(Date::from_ymd(2023, 12, 1).unwrap()).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSeries {
    pair: CurrencyPair,
    kind: SeriesKind,
    observations: Vec<ExchangeRate>,
}

impl RateSeries {
    /// Creates an empty raw series for a pair.
    #[must_use]
    pub fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            kind: SeriesKind::Raw,
            observations: Vec::new(),
        }
    }

    /// Creates the "no data" series for a pair that cannot be derived.
    #[must_use]
    pub fn empty(pair: CurrencyPair) -> Self {
        Self {
            pair,
            kind: SeriesKind::Empty,
            observations: Vec::new(),
        }
    }

    /// Builds a raw series from unordered observations.
    ///
    /// Observations sharing a date resolve to the one supplied last.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidRate` if any factor is not positive.
    pub fn from_observations(
        pair: CurrencyPair,
        observations: impl IntoIterator<Item = ExchangeRate>,
    ) -> FxResult<Self> {
        let mut sorted: Vec<ExchangeRate> = observations.into_iter().collect();
        for rate in &sorted {
            rate.validate()?;
        }
        // stable: equal dates keep input order, so the last one wins below
        sorted.sort_by_key(ExchangeRate::date);

        let mut observations: Vec<ExchangeRate> = Vec::with_capacity(sorted.len());
        for rate in sorted {
            match observations.last_mut() {
                Some(last) if last.date() == rate.date() => *last = rate,
                _ => observations.push(rate),
            }
        }

        Ok(Self {
            pair,
            kind: SeriesKind::Raw,
            observations,
        })
    }

    /// Wraps observations that are already sorted and unique by date.
    pub(crate) fn derived(pair: CurrencyPair, observations: Vec<ExchangeRate>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].date() < w[1].date()));
        Self {
            pair,
            kind: SeriesKind::Derived,
            observations,
        }
    }

    /// Returns this series marked as raw.
    pub(crate) fn into_raw(mut self) -> Self {
        self.kind = SeriesKind::Raw;
        self
    }

    /// Returns the currency pair.
    #[must_use]
    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// Returns the source currency.
    #[must_use]
    pub fn source(&self) -> &CurrencyCode {
        &self.pair.source
    }

    /// Returns the term currency.
    #[must_use]
    pub fn term(&self) -> &CurrencyCode {
        &self.pair.term
    }

    /// Returns the kind of series.
    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    /// Returns true for composed series.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.kind == SeriesKind::Derived
    }

    /// Returns the rate in effect on `date`.
    ///
    /// That is the observation with the latest date not after `date`, or
    /// `None` if the series is empty or `date` precedes its first observation.
    #[must_use]
    pub fn lookup_rate(&self, date: Date) -> Option<ExchangeRate> {
        let idx = self.observations.partition_point(|rate| rate.date() <= date);
        idx.checked_sub(1).map(|i| self.observations[i])
    }

    /// Inserts an observation, replacing any existing one on the same date.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidRate` if the factor is not positive.
    pub fn add_observation(&mut self, rate: ExchangeRate) -> FxResult<()> {
        rate.validate()?;
        match self
            .observations
            .binary_search_by_key(&rate.date(), ExchangeRate::date)
        {
            Ok(idx) => self.observations[idx] = rate,
            Err(idx) => self.observations.insert(idx, rate),
        }
        Ok(())
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns the earliest observation.
    #[must_use]
    pub fn first(&self) -> Option<&ExchangeRate> {
        self.observations.first()
    }

    /// Returns the most recent observation.
    #[must_use]
    pub fn latest(&self) -> Option<&ExchangeRate> {
        self.observations.last()
    }

    /// Returns all observations in ascending date order.
    #[must_use]
    pub fn observations(&self) -> &[ExchangeRate] {
        &self.observations
    }

    /// Returns the observation dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.observations.iter().map(ExchangeRate::date)
    }

    /// Returns observations between `start` and `end` (inclusive).
    #[must_use]
    pub fn range(&self, start: Date, end: Date) -> &[ExchangeRate] {
        let from = self.observations.partition_point(|rate| rate.date() < start);
        let to = self.observations.partition_point(|rate| rate.date() <= end);
        if from >= to {
            &[]
        } else {
            &self.observations[from..to]
        }
    }

    /// Returns the reciprocal series for the reversed pair.
    ///
    /// # Errors
    ///
    /// Returns `FxError::MathError` if an observation cannot be inverted.
    pub fn inverse(&self) -> FxResult<Self> {
        let observations = self
            .observations
            .iter()
            .map(ExchangeRate::inverse)
            .collect::<FxResult<Vec<_>>>()?;
        Ok(Self::derived(self.pair.inverse(), observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxrate_core::FxError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn eurusd() -> RateSeries {
        RateSeries::from_observations(
            CurrencyPair::new("EUR", "USD"),
            vec![
                ExchangeRate::new(date(2024, 3, 1), dec!(1.08)),
                ExchangeRate::new(date(2024, 1, 1), dec!(1.10)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_carries_forward() {
        let series = eurusd();

        let rate = series.lookup_rate(date(2024, 2, 15)).unwrap();
        assert_eq!(rate, ExchangeRate::new(date(2024, 1, 1), dec!(1.10)));

        // On an observation date
        let rate = series.lookup_rate(date(2024, 3, 1)).unwrap();
        assert_eq!(rate.value(), dec!(1.08));

        // After the last observation
        let rate = series.lookup_rate(date(2030, 1, 1)).unwrap();
        assert_eq!(rate.date(), date(2024, 3, 1));
    }

    #[test]
    fn test_lookup_before_first_is_none() {
        assert!(eurusd().lookup_rate(date(2023, 12, 1)).is_none());
        assert!(eurusd().lookup_rate(date(2023, 12, 31)).is_none());
    }

    #[test]
    fn test_empty_series() {
        let series = RateSeries::new(CurrencyPair::new("EUR", "USD"));
        assert!(series.is_empty());
        assert!(series.lookup_rate(date(2024, 1, 1)).is_none());
        assert_eq!(series.kind(), SeriesKind::Raw);

        let empty = RateSeries::empty(CurrencyPair::new("EUR", "XYZ"));
        assert_eq!(empty.kind(), SeriesKind::Empty);
        assert!(empty.first().is_none());
    }

    #[test]
    fn test_add_observation_keeps_order() {
        let mut series = RateSeries::new(CurrencyPair::new("EUR", "USD"));
        series.add_observation(ExchangeRate::new(date(2024, 3, 1), dec!(1.08))).unwrap();
        series.add_observation(ExchangeRate::new(date(2024, 1, 1), dec!(1.10))).unwrap();
        series.add_observation(ExchangeRate::new(date(2024, 2, 1), dec!(1.09))).unwrap();

        let dates: Vec<Date> = series.dates().collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);
    }

    #[test]
    fn test_add_observation_last_write_wins() {
        let mut series = eurusd();
        series.add_observation(ExchangeRate::new(date(2024, 1, 1), dec!(1.12))).unwrap();
        series.add_observation(ExchangeRate::new(date(2024, 1, 1), dec!(1.12))).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().value(), dec!(1.12));
    }

    #[test]
    fn test_add_observation_rejects_non_positive() {
        let mut series = eurusd();
        let err = series
            .add_observation(ExchangeRate::new(date(2024, 4, 1), Decimal::ZERO))
            .unwrap_err();
        assert!(matches!(err, FxError::InvalidRate { .. }));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_from_observations_deduplicates() {
        let series = RateSeries::from_observations(
            CurrencyPair::new("EUR", "USD"),
            vec![
                ExchangeRate::new(date(2024, 1, 1), dec!(1.10)),
                ExchangeRate::new(date(2024, 1, 2), dec!(1.11)),
                ExchangeRate::new(date(2024, 1, 1), dec!(1.09)),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().value(), dec!(1.09));
        assert_eq!(series.latest().unwrap().value(), dec!(1.11));
    }

    #[test]
    fn test_range() {
        let series = eurusd();
        assert_eq!(series.range(date(2024, 1, 1), date(2024, 3, 1)).len(), 2);
        assert_eq!(series.range(date(2024, 1, 2), date(2024, 3, 1)).len(), 1);
        assert!(series.range(date(2024, 1, 2), date(2024, 2, 28)).is_empty());
        assert!(series.range(date(2024, 3, 1), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_inverse() {
        let inverse = eurusd().inverse().unwrap();
        assert_eq!(inverse.pair(), &CurrencyPair::new("USD", "EUR"));
        assert!(inverse.is_derived());

        let rate = inverse.lookup_rate(date(2024, 2, 1)).unwrap();
        assert_eq!((rate.value() * dec!(1.10)).round_dp(20), Decimal::ONE);
    }
}
