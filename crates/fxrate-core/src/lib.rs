//! # FxRate Core
//!
//! Value types and the error taxonomy shared by the FxRate crates.
//!
//! - **Types**: `Date`, `CurrencyCode`, `CurrencyPair`, `ExchangeRate`, `Money`
//! - **Errors**: `FxError` and the `FxResult` alias
//!
//! ## Design Philosophy
//!
//! - **Fixed-point arithmetic**: every rate and amount is a `rust_decimal::Decimal`
//! - **Opaque currency codes**: codes are equality-comparable keys, not an enum
//! - **Explicit Over Implicit**: fallible construction returns `FxResult`
//!
//! ## Example
//!
//! ```rust
//! use fxrate_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let date = Date::from_ymd(2024, 1, 1).unwrap();
//! let rate = ExchangeRate::new(date, dec!(1.10));
//! assert_eq!(rate.inverse().unwrap().value().round_dp(4), dec!(0.9091));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{FxError, FxResult};
    pub use crate::types::{CurrencyCode, CurrencyPair, Date, ExchangeRate, Money};
}

// Re-export commonly used types at crate root
pub use error::{FxError, FxResult};
pub use types::{CurrencyCode, CurrencyPair, Date, ExchangeRate, Money};
