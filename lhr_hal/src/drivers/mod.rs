//! Hardware backend implementations.
//!
//! - [`simulation`] - In-memory robot for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `HardwareControl` from `lhr_common::hardware`
//! 3. Register its factory in [`register_builtin`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register every built-in backend.
pub fn register_builtin(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);
}
