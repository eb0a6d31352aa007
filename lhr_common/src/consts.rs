//! Workspace-wide constants.

/// Default service name used when no configuration file is supplied.
pub const DEFAULT_SERVICE_NAME: &str = "lhr-engine";

/// Environment variable consulted by [`crate::logging::init`] before the
/// configured log level.
pub const LOG_ENV_VAR: &str = "RUST_LOG";

/// Smallest volume (µL) the engine treats as non-zero.
pub const VOLUME_EPSILON: f64 = 1e-9;
