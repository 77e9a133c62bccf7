//! Domain types for currency conversion.
//!
//! - [`Date`]: Calendar date of an observation or query
//! - [`CurrencyCode`]: Opaque ISO 4217-like code
//! - [`CurrencyPair`]: Ordered source/term pair
//! - [`ExchangeRate`]: Dated conversion factor
//! - [`Money`]: Amount tagged with a currency

mod currency;
mod date;
mod exchange_rate;
mod money;

pub use currency::{CurrencyCode, CurrencyPair};
pub use date::Date;
pub use exchange_rate::ExchangeRate;
pub use money::Money;
