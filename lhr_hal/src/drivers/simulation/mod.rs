//! Simulation backend.
//!
//! [`SimulatedHardware`] keeps gantry and plunger state in memory, counts
//! every operation, and can be told through a [`SimulationHandle`] to fail
//! the next matching operation.

mod config;
mod driver;
mod gantry;
mod plunger;

pub use config::SimulationConfig;
pub use driver::{SimOperation, SimulatedHardware, SimulationHandle};

use lhr_common::hardware::HardwareControl;

/// Factory function to create a simulator with default settings.
pub fn create_driver() -> Box<dyn HardwareControl> {
    Box::new(SimulatedHardware::new(SimulationConfig::default()))
}
