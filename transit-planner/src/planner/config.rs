//! Walking parameters for query overlays.

use std::path::Path;

use serde::Deserialize;

/// Errors from loading a [`PlannerConfig`] file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read planner config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse planner config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid planner config: {0}")]
    Invalid(String),
}

/// How far and how fast a rider walks to and from stops.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Stations at or beyond this distance (km) are out of walking range.
    pub max_walk_km: f64,

    /// Walking speed (km/h).
    pub walk_speed_kmh: f64,
}

impl PlannerConfig {
    /// Create a configuration, rejecting non-positive or non-finite values.
    pub fn new(max_walk_km: f64, walk_speed_kmh: f64) -> Result<Self, ConfigError> {
        let config = Self {
            max_walk_km,
            walk_speed_kmh,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file. Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_walk_km.is_finite() && self.max_walk_km > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_walk_km must be positive, got {}",
                self.max_walk_km
            )));
        }
        if !(self.walk_speed_kmh.is_finite() && self.walk_speed_kmh > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "walk_speed_kmh must be positive, got {}",
                self.walk_speed_kmh
            )));
        }
        Ok(())
    }

    pub fn max_walk_km(&self) -> f64 {
        self.max_walk_km
    }

    pub fn walk_speed_kmh(&self) -> f64 {
        self.walk_speed_kmh
    }

    /// Returns true if a stop `distance_km` away is within walking range.
    pub fn is_walkable(&self, distance_km: f64) -> bool {
        distance_km < self.max_walk_km
    }

    /// Walking time for `distance_km`, truncated to whole seconds.
    pub fn walking_seconds(&self, distance_km: f64) -> u32 {
        (distance_km / self.walk_speed_kmh * 3600.0) as u32
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_walk_km: 1.0,
            walk_speed_kmh: 5.0,
        }
    }
}
