//! # LHR HAL Library
//!
//! Hardware backends the command engine drives through
//! [`lhr_common::hardware::HardwareControl`].
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Backend factory registration
//! - [`drivers`] - Backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  lhr_hal (single crate)                  │
//! │  ┌────────────────┐     ┌─────────────────────────────┐  │
//! │  │ Driver Registry│────►│ HardwareFactory (fn)        │  │
//! │  └────────────────┘     └──────────────┬──────────────┘  │
//! │                                        │                 │
//! │                                        ▼                 │
//! │  ┌────────────────┐     ┌─────────────────────────────┐  │
//! │  │ HardwareControl│◄────│ SimulatedHardware           │  │
//! │  │ (trait object) │     │ gantry, plungers, faults    │  │
//! │  └────────────────┘     └─────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::{
    SimOperation, SimulatedHardware, SimulationConfig, SimulationHandle,
};
