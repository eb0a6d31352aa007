//! Everything a backend or engine module usually needs from this crate.
//!
//! ```rust
//! use lhr_common::prelude::*;
//!
//! let home = Point::new(418.0, 353.0, 218.0);
//! assert_eq!(Mount::Left.z_axis(), MotorAxis::LeftZ);
//! # let _ = home;
//! ```

// ─── Config & logging ───────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::logging::init as init_logging;

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hardware::{HardwareControl, HardwareError, MotorAxis, Mount, Point};
