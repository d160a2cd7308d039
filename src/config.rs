//! Observer configuration, read from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Mp4Error;

/// Default aggregation interval.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Milliseconds between two [`tick`](crate::observer::MediaInfoObserver::tick)
    /// calls, also the divisor for download speed.
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Parse and validate a JSON config. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, Mp4Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults if the file
    /// is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                debug!("No config at {}: {err}, using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(config) => config,
            Err(err) => {
                warn!("Invalid config at {}: {err}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), Mp4Error> {
        if self.tick_interval_ms == 0 {
            return Err(Mp4Error::InvalidConfig("tick_interval_ms must be non-zero".to_owned()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}
