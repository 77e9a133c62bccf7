//! Currency conversion into a fixed term currency.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use fxrate_core::{CurrencyCode, Date, ExchangeRate, FxError, FxResult, Money};

use crate::provider::ExchangeRateProvider;
use crate::series::SeriesKind;

/// Where a conversion rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateSource {
    /// The currency already is the term currency.
    Identity,
    /// Read from a registered series.
    Direct,
    /// Composed through intermediate currencies.
    Derived,
    /// No rate could be resolved; factor 1 was substituted.
    Fallback,
}

/// An exchange rate tagged with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRate {
    /// The rate applied.
    pub rate: ExchangeRate,
    /// How the rate was obtained.
    pub source: RateSource,
}

impl ConversionRate {
    /// Returns the factor.
    pub fn value(&self) -> Decimal {
        self.rate.value()
    }

    /// Returns the observation date of the rate.
    pub fn date(&self) -> Date {
        self.rate.date()
    }

    /// Returns true if no real rate was available.
    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }
}

/// Converts amounts into one term currency.
///
/// Converters are cheap to clone and share their provider, so one repository
/// can serve any number of term-currency perspectives.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use fxrate_core::{CurrencyCode, Date, ExchangeRate};
/// use fxrate_engine::{CurrencyConverter, SeriesRepository};
/// use rust_decimal_macros::dec;
///
/// let repo = Arc::new(SeriesRepository::default());
/// let date = Date::from_ymd(2024, 1, 1).unwrap();
/// repo.add_observation("EUR", "USD", ExchangeRate::new(date, dec!(1.10))).unwrap();
///
/// let usd = CurrencyConverter::new(repo, "USD");
/// let amount = usd.convert(date, dec!(100), &CurrencyCode::new("EUR")).unwrap();
/// assert_eq!(amount, dec!(110.00));
/// ```
#[derive(Clone)]
pub struct CurrencyConverter {
    provider: Arc<dyn ExchangeRateProvider>,
    term: CurrencyCode,
}

impl fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("term", &self.term)
            .finish_non_exhaustive()
    }
}

impl CurrencyConverter {
    /// Creates a converter into `term`.
    pub fn new(provider: Arc<dyn ExchangeRateProvider>, term: impl Into<CurrencyCode>) -> Self {
        Self {
            provider,
            term: term.into(),
        }
    }

    /// Returns the term currency.
    pub fn term_currency(&self) -> &CurrencyCode {
        &self.term
    }

    /// Returns a converter into `term` over the same provider.
    pub fn with(&self, term: impl Into<CurrencyCode>) -> Self {
        let term = term.into();
        if term == self.term {
            return self.clone();
        }
        Self {
            provider: Arc::clone(&self.provider),
            term,
        }
    }

    /// Returns the rate converting `code` into the term currency on `date`.
    ///
    /// Always yields a rate when the provider is wired correctly; check
    /// [`CurrencyConverter::rate`] to tell a fallback apart.
    ///
    /// # Errors
    ///
    /// Returns `FxError::SeriesNotFound` if the provider produced no series
    /// object at all.
    pub fn get_rate(&self, date: Date, code: &CurrencyCode) -> FxResult<ExchangeRate> {
        self.rate(date, code).map(|resolved| resolved.rate)
    }

    /// Resolves the rate for `code` on `date` together with its origin.
    ///
    /// # Errors
    ///
    /// Same as [`CurrencyConverter::get_rate`].
    pub fn rate(&self, date: Date, code: &CurrencyCode) -> FxResult<ConversionRate> {
        if *code == self.term {
            return Ok(ConversionRate {
                rate: ExchangeRate::identity(date),
                source: RateSource::Identity,
            });
        }

        let series = self
            .provider
            .time_series(code, &self.term)
            .ok_or_else(|| FxError::series_not_found(code.as_str(), self.term.as_str()))?;

        match series.lookup_rate(date) {
            Some(rate) => {
                let source = match series.kind() {
                    SeriesKind::Derived => RateSource::Derived,
                    SeriesKind::Raw | SeriesKind::Empty => RateSource::Direct,
                };
                Ok(ConversionRate { rate, source })
            }
            None => {
                warn!(
                    currency = %code,
                    term = %self.term,
                    %date,
                    "no exchange rate available, falling back to 1"
                );
                Ok(ConversionRate {
                    rate: ExchangeRate::identity(Date::today()),
                    source: RateSource::Fallback,
                })
            }
        }
    }

    /// Converts `amount` of `code` into the term currency.
    ///
    /// # Errors
    ///
    /// Propagates rate resolution errors and decimal overflow.
    pub fn convert(&self, date: Date, amount: Decimal, code: &CurrencyCode) -> FxResult<Decimal> {
        self.get_rate(date, code)?.apply(amount)
    }

    /// Converts `money` into the term currency, rounded to its minor units.
    ///
    /// # Errors
    ///
    /// Same as [`CurrencyConverter::convert`].
    pub fn convert_money(&self, date: Date, money: &Money) -> FxResult<Money> {
        let amount = self.convert(date, money.amount(), money.currency())?;
        Ok(Money::new(amount, self.term.clone()).rounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::RateSeries;
    use crate::SeriesRepository;
    use fxrate_core::CurrencyPair;
    use rust_decimal_macros::dec;

    struct Unwired;

    impl ExchangeRateProvider for Unwired {
        fn time_series(&self, _: &CurrencyCode, _: &CurrencyCode) -> Option<Arc<RateSeries>> {
            None
        }
    }

    struct Untouchable;

    impl ExchangeRateProvider for Untouchable {
        fn time_series(&self, _: &CurrencyCode, _: &CurrencyCode) -> Option<Arc<RateSeries>> {
            panic!("provider must not be consulted");
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn repo() -> Arc<SeriesRepository> {
        let repo = SeriesRepository::default();
        repo.register_series(
            RateSeries::from_observations(
                CurrencyPair::new("EUR", "USD"),
                [
                    ExchangeRate::new(date(2024, 1, 1), dec!(1.10)),
                    ExchangeRate::new(date(2024, 3, 1), dec!(1.08)),
                ],
            )
            .unwrap(),
        );
        repo.register_series(
            RateSeries::from_observations(
                CurrencyPair::new("USD", "JPY"),
                [ExchangeRate::new(date(2024, 1, 1), dec!(150))],
            )
            .unwrap(),
        );
        Arc::new(repo)
    }

    #[test]
    fn test_identity_skips_provider() {
        let converter = CurrencyConverter::new(Arc::new(Untouchable), "USD");
        let d = date(2024, 1, 1);
        let resolved = converter.rate(d, &CurrencyCode::new("USD")).unwrap();
        assert_eq!(resolved.source, RateSource::Identity);
        assert_eq!(resolved.rate, ExchangeRate::new(d, Decimal::ONE));
    }

    #[test]
    fn test_direct_and_derived_tags() {
        let usd = CurrencyConverter::new(repo(), "USD");
        let direct = usd.rate(date(2024, 2, 1), &CurrencyCode::new("EUR")).unwrap();
        assert_eq!(direct.source, RateSource::Direct);
        assert_eq!(direct.value(), dec!(1.10));
        assert_eq!(direct.date(), date(2024, 1, 1));

        let jpy = usd.with("JPY");
        let derived = jpy.rate(date(2024, 1, 1), &CurrencyCode::new("EUR")).unwrap();
        assert_eq!(derived.source, RateSource::Derived);
        assert_eq!(derived.value(), dec!(165.0));
    }

    #[test]
    fn test_fallback() {
        let usd = CurrencyConverter::new(repo(), "USD");
        let query = date(2023, 12, 1);

        let before = Date::today();
        let resolved = usd.rate(query, &CurrencyCode::new("EUR")).unwrap();
        let after = Date::today();

        assert!(resolved.is_fallback());
        assert_eq!(resolved.value(), Decimal::ONE);
        // Dated now, not on the query date
        assert!(before <= resolved.date() && resolved.date() <= after);
        assert_ne!(resolved.date(), query);
        assert_ne!(resolved.rate, ExchangeRate::identity(query));

        let unknown = usd.rate(date(2024, 1, 1), &CurrencyCode::new("XYZ")).unwrap();
        assert!(unknown.is_fallback());
    }

    #[test]
    fn test_unwired_provider_is_configuration_fault() {
        let converter = CurrencyConverter::new(Arc::new(Unwired), "USD");
        let err = converter
            .get_rate(date(2024, 1, 1), &CurrencyCode::new("EUR"))
            .unwrap_err();
        assert!(err.is_configuration_fault());
        assert_eq!(
            err.to_string(),
            "No exchange rate time series found for EUR -> USD"
        );
    }

    #[test]
    fn test_convert() {
        let usd = CurrencyConverter::new(repo(), "USD");
        let amount = usd
            .convert(date(2024, 3, 15), dec!(250), &CurrencyCode::new("EUR"))
            .unwrap();
        assert_eq!(amount, dec!(270.00));
    }

    #[test]
    fn test_convert_money_rounds_to_term_units() {
        let jpy = CurrencyConverter::new(repo(), "JPY");
        let money = Money::new(dec!(10.01), "EUR");
        let converted = jpy.convert_money(date(2024, 1, 1), &money).unwrap();
        // 10.01 * 165 = 1651.65
        assert_eq!(converted.currency(), &CurrencyCode::new("JPY"));
        assert_eq!(converted.amount(), dec!(1652));
    }

    #[test]
    fn test_with_shares_provider() {
        let usd = CurrencyConverter::new(repo(), "USD");
        assert_eq!(usd.with("USD").term_currency(), &CurrencyCode::new("USD"));
        let eur = usd.with("EUR");
        assert_eq!(eur.term_currency(), &CurrencyCode::new("EUR"));

        // Inverse edge: USD -> EUR from the EUR/USD series
        let rate = eur.get_rate(date(2024, 1, 1), &CurrencyCode::new("USD")).unwrap();
        assert_eq!((rate.value() * dec!(1.10)).round_dp(20), Decimal::ONE);
        assert_eq!(format!("{eur:?}"), "CurrencyConverter { term: CurrencyCode(\"EUR\"), .. }");
    }
}
