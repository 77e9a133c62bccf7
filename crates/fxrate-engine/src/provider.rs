//! The lookup seam between the converter and whatever stores rates.

use std::sync::Arc;

use fxrate_core::CurrencyCode;

use crate::series::RateSeries;

/// Source of exchange rate time series.
///
/// A well-behaved provider answers every query with a series, returning an
/// empty one when it has no data and cannot derive any. `None` is reserved for
/// providers that cannot produce a series object at all; the converter treats
/// it as a configuration fault.
pub trait ExchangeRateProvider: Send + Sync {
    /// Returns the series converting `source` into `term`.
    fn time_series(&self, source: &CurrencyCode, term: &CurrencyCode) -> Option<Arc<RateSeries>>;
}

impl<P: ExchangeRateProvider + ?Sized> ExchangeRateProvider for Arc<P> {
    fn time_series(&self, source: &CurrencyCode, term: &CurrencyCode) -> Option<Arc<RateSeries>> {
        (**self).time_series(source, term)
    }
}
