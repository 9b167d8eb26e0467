use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-stimulus tracking settings. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingConfig {
    /// Spacing of the periodic answer save.
    pub persist_interval_ms: u64,
    /// Scale factor handed to the badge row renderer.
    pub badge_scale: f64,
    /// Location of the badge catalog JSON, relative to `catalog_prefix`
    /// unless it is an absolute `http` URL.
    pub catalog_path: Option<String>,
    pub catalog_prefix: String,
    /// Window size of the save cadence statistics.
    pub cadence_samples: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            persist_interval_ms: 5_000,
            badge_scale: 0.85,
            catalog_path: None,
            catalog_prefix: String::new(),
            cadence_samples: 64,
        }
    }
}

impl TrackingConfig {
    pub fn from_json(body: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(body)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persist_interval_ms == 0 {
            return Err(ConfigError::ZeroPersistInterval);
        }
        if !self.badge_scale.is_finite() || self.badge_scale <= 0.0 {
            return Err(ConfigError::InvalidBadgeScale(self.badge_scale));
        }
        Ok(())
    }

    pub fn persist_interval(&self) -> Duration {
        Duration::from_millis(self.persist_interval_ms)
    }
}
