//! Simulator settings.
//!
//! # TOML Example
//!
//! ```toml
//! volume_resolution = 0.01
//! tip_detection = false
//! home_position = { x = 418.0, y = 353.0, z = 218.0 }
//! ```

use lhr_common::config::{ConfigError, ConfigLoader};
use lhr_common::hardware::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gantry position of every mount right after homing.
const DEFAULT_HOME_POSITION: Point = Point::new(418.0, 353.0, 218.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Plunger volumes are rounded to a multiple of this (µL). Zero disables
    /// rounding.
    pub volume_resolution: f64,

    pub home_position: Point,

    /// Whether the simulated mounts report tip presence. When false,
    /// `tip_present` answers `None` unless a reading is forced through the
    /// handle.
    pub tip_detection: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            volume_resolution: 0.0,
            home_position: DEFAULT_HOME_POSITION,
            tip_detection: true,
        }
    }
}

impl SimulationConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for a negative or non-finite
    /// resolution, or a non-finite home position.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.volume_resolution.is_finite() || self.volume_resolution < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "volume_resolution must be a non-negative number, got {}",
                self.volume_resolution
            )));
        }
        let home = self.home_position;
        if ![home.x, home.y, home.z].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "home_position {home} is not finite"
            )));
        }
        Ok(())
    }

    /// Load from a TOML file and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Round `volume` to the configured resolution.
    pub(crate) fn quantize(&self, volume: f64) -> f64 {
        if self.volume_resolution > 0.0 {
            (volume / self.volume_resolution).round() * self.volume_resolution
        } else {
            volume
        }
    }
}
