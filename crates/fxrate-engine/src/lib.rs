//! # FxRate Engine
//!
//! Historical exchange rate lookup and currency conversion.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CurrencyConverter                        │
//! │        (term currency, identity, fallback tagging)           │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ ExchangeRateProvider
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │                     SeriesRepository                         │
//! │   raw: RwLock<pair -> Arc<RateSeries>>  derived: DashMap     │
//! └──────────────┬───────────────────────────────┬───────────────┘
//!                │                               │
//!       ┌────────▼────────┐            ┌─────────▼─────────┐
//!       │    RateFeed     │            │ CrossRateComposer │
//!       │ (observations)  │            │  (bounded BFS)    │
//!       └─────────────────┘            └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fxrate_core::{CurrencyCode, Date};
//! use fxrate_engine::{CurrencyConverter, InMemoryRateFeed, RateSource, SeriesRepository};
//! use rust_decimal_macros::dec;
//!
//! let d = Date::from_ymd(2024, 1, 1).unwrap();
//! let feed = InMemoryRateFeed::new("seed")
//!     .with_rate("EUR", "USD", d, dec!(1.10))
//!     .with_rate("USD", "JPY", d, dec!(150.0));
//!
//! let repo = Arc::new(SeriesRepository::default());
//! repo.load(&feed).unwrap();
//!
//! let jpy = CurrencyConverter::new(repo, "JPY");
//! let rate = jpy.rate(d, &CurrencyCode::new("EUR")).unwrap();
//! assert_eq!(rate.value(), dec!(165.0));
//! assert_eq!(rate.source, RateSource::Derived);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod composer;
pub mod converter;
pub mod feed;
pub mod provider;
pub mod repository;
pub mod series;

pub use composer::{ConversionPath, CrossRateComposer, Leg, LegDirection};
pub use converter::{ConversionRate, CurrencyConverter, RateSource};
pub use feed::{InMemoryRateFeed, RateFeed, RateObservation};
pub use provider::ExchangeRateProvider;
pub use repository::{Revision, SeriesRepository};
pub use series::{RateSeries, SeriesKind};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::composer::{ConversionPath, CrossRateComposer};
    pub use crate::converter::{ConversionRate, CurrencyConverter, RateSource};
    pub use crate::feed::{InMemoryRateFeed, RateFeed, RateObservation};
    pub use crate::provider::ExchangeRateProvider;
    pub use crate::repository::SeriesRepository;
    pub use crate::series::{RateSeries, SeriesKind};
    pub use fxrate_config::EngineConfig;
    pub use fxrate_core::prelude::*;
}
