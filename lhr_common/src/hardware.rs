//! Hardware control surface.
//!
//! The command engine never talks to motors directly; it drives an
//! implementation of [`HardwareControl`] (a simulator in `lhr_hal`, or a real
//! backend) and interprets [`HardwareError`] values.

pub mod driver;
pub mod types;

pub use driver::{HardwareControl, HardwareError, HardwareFactory};
pub use types::{MotorAxis, Mount, Point};
