//! Tracing subscriber setup shared by every LHR binary and test harness.

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, SharedConfig};
use crate::consts::LOG_ENV_VAR;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns `false` if a global
/// subscriber was already installed (e.g. by an earlier test), which is not
/// an error.
pub fn init(level: LogLevel, json: bool) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .try_init()
    };
    result.is_ok()
}

/// Install a subscriber configured from the `[shared]` table.
pub fn init_from_config(shared: &SharedConfig) -> bool {
    init(shared.log_level, shared.json_logs)
}
