//! # Engine configuration
//!
//! Global distribution switches plus the search limits of the retry controller
//! and the geographic local search.
//!
//! ## Usage
//! ```rust
//! use pulje_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.tuning.max_attempts, 3);
//! ```
//!
//! A JSON file named by `PULJE_CONFIG_PATH` replaces the defaults, see
//! [`EngineConfig::from_env_or_default`].

use crate::error::{CoreError, Result};
use crate::models::DistributionCriteria;
use serde::{Deserialize, Serialize};
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "PULJE_CONFIG_PATH";

/// Bounds of the randomized search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchTuning {
    /// Full distribution attempts per retry run
    pub max_attempts: u32,
    /// Passes of the pairwise swap search
    pub max_geo_iterations: u32,
    /// Minimum distance saving (km) for a swap to count as an improvement
    pub geo_tolerance_km: f64,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self { max_attempts: 3, max_geo_iterations: 50, geo_tolerance_km: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub criteria: DistributionCriteria,
    pub tuning: SearchTuning,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tuning.max_attempts == 0 {
            return Err(CoreError::InvalidParameter("maxAttempts must be at least 1".to_string()));
        }
        if !self.tuning.geo_tolerance_km.is_finite() || self.tuning.geo_tolerance_km < 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "geoToleranceKm must be a non-negative number, got {}",
                self.tuning.geo_tolerance_km
            )));
        }
        if self.criteria.host_filters.order.is_empty() {
            return Err(CoreError::InvalidParameter("hostFilters.order must not be empty".to_string()));
        }
        Ok(())
    }

    /// Defaults, or the file named by `PULJE_CONFIG_PATH` when set.
    pub fn from_env_or_default() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidParameter(format!("Failed to read config from {CONFIG_PATH_ENV}='{path}': {e}"))
        })?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        tracing::info!(path, "engine config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_json(r#"{"tuning": {"maxAttempts": 5}}"#).unwrap();
        assert_eq!(config.tuning.max_attempts, 5);
        assert_eq!(config.tuning.max_geo_iterations, 50);
        assert!(config.criteria.avoid_same_club);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = EngineConfig::default();
        config.tuning.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
