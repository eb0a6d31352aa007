//! Engine configuration.
//!
//! ```toml
//! [shared]
//! service_name = "lhr-engine"
//! log_level = "info"
//!
//! [engine]
//! robot_type = "OT-2 Standard"
//! api_version = "2.16"
//! ```

use std::path::Path;

use lhr_common::config::{ConfigError, ConfigLoader, SharedConfig};
use serde::{Deserialize, Serialize};

use crate::state::StateConfig;
use crate::types::{ApiVersion, RobotType};

/// Oldest protocol API version the engine accepts.
pub const MIN_API_VERSION: ApiVersion = ApiVersion::new(2, 0);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub robot_type: RobotType,
    /// Declared protocol API version. Selects the zero-volume behaviour of
    /// aspirate and dispense.
    #[serde(default)]
    pub api_version: ApiVersion,
}

impl EngineConfig {
    pub fn new(robot_type: RobotType, api_version: ApiVersion) -> Self {
        Self {
            shared: SharedConfig::default(),
            engine: EngineSettings {
                robot_type,
                api_version,
            },
        }
    }

    /// Load from a TOML file and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        let version = self.engine.api_version;
        if version < MIN_API_VERSION || version > ApiVersion::LATEST {
            return Err(ConfigError::ValidationError(format!(
                "api_version {version} outside supported range {MIN_API_VERSION}..={}",
                ApiVersion::LATEST
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn robot_type(&self) -> RobotType {
        self.engine.robot_type
    }

    #[inline]
    pub fn api_version(&self) -> ApiVersion {
        self.engine.api_version
    }

    /// Whether a requested volume of 0 means "everything".
    #[inline]
    pub fn zero_means_full_volume(&self) -> bool {
        self.engine.api_version < ApiVersion::LITERAL_ZERO_VOLUME
    }

    pub fn state_config(&self) -> StateConfig {
        StateConfig {
            robot_type: self.engine.robot_type,
            api_version: self.engine.api_version,
        }
    }
}
