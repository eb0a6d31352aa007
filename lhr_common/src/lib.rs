//! LHR Common Library
//!
//! Shared vocabulary for every crate of the liquid-handling workspace:
//! configuration loading, tracing setup, and the hardware control surface
//! the command engine drives.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`logging`] - `tracing` subscriber initialisation
//! - [`hardware`] - Hardware control trait, errors and motion types
//! - [`consts`] - Workspace-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use lhr_common::config::{ConfigLoader, SharedConfig};
//! use lhr_common::hardware::{HardwareControl, Mount};
//! ```

pub mod config;
pub mod consts;
pub mod hardware;
pub mod logging;
pub mod prelude;
