//! FxRate Configuration Layer
//!
//! Configuration for the FxRate conversion engine: composition depth, inverse
//! edges and derived-series caching, loadable from TOML and validated on load.
//!
//! # Example
//!
//! ```rust
//! use fxrate_config::{EngineConfig, Validate};
//!
//! let config = EngineConfig::from_toml_str("max_hops = 2").unwrap();
//! assert_eq!(config.max_hops, 2);
//! assert!(config.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod engine;
mod error;

pub use engine::{EngineConfig, MAX_HOPS_LIMIT};
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::EngineConfig;
    pub use crate::error::{ConfigError, ConfigResult, Validate};
}
