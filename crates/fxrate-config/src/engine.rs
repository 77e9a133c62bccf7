//! Conversion engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Hard upper bound on composition depth.
pub const MAX_HOPS_LIMIT: u32 = 6;

// =============================================================================
// ENGINE CONFIGURATION
// =============================================================================

/// Settings for the series repository and the cross-rate composer.
///
/// ```toml
/// max_hops = 2
/// allow_inverse = false
/// cache_derived = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of legs in a composed path.
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,

    /// Whether a raw series `B -> A` may be walked backwards as `A -> B`.
    #[serde(default = "default_true")]
    pub allow_inverse: bool,

    /// Whether composed series are cached between lookups.
    #[serde(default = "default_true")]
    pub cache_derived: bool,
}

fn default_max_hops() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            allow_inverse: true,
            cache_derived: true,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: sets the maximum composition depth.
    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Builder: enables or disables inverse edges.
    pub fn with_inverse(mut self, allow_inverse: bool) -> Self {
        self.allow_inverse = allow_inverse;
        self
    }

    /// Builder: enables or disables caching of composed series.
    pub fn with_cache(mut self, cache_derived: bool) -> Self {
        self.cache_derived = cache_derived;
        self
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.max_hops == 0 || self.max_hops > MAX_HOPS_LIMIT {
            errors.push(ValidationError::with_rule(
                "max_hops",
                format!(
                    "Max hops {} must be between 1 and {}",
                    self.max_hops, MAX_HOPS_LIMIT
                ),
                "hop_range",
            ));
        }

        errors
    }
}
