//! Hardware control trait and error types.
//!
//! This module defines:
//! - `HardwareControl` trait - Async interface the engine drives
//! - `HardwareError` enum - Failures a backend can report
//! - `HardwareFactory` type alias - Factory function type

use async_trait::async_trait;
use thiserror::Error;

use super::types::{MotorAxis, Mount, Point};

/// Error types for hardware operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    /// Pressure sensor tripped during a plunger move.
    #[error("Pipette overpressure detected on {mount} mount: {detail}")]
    Overpressure { mount: Mount, detail: String },

    /// Motion requested on axes that have never been homed.
    #[error("Axes must be homed before moving: {0}")]
    NotHomed(String),

    /// No instrument cached on the mount.
    #[error("No pipette attached on {0} mount")]
    NoInstrument(Mount),

    /// Plunger operation attempted without a tip on the mount.
    #[error("No tip attached on {0} mount")]
    NoTipAttached(Mount),

    /// Requested volume outside the plunger's travel.
    #[error("Volume {requested} µL out of range (max {max} µL)")]
    VolumeOutOfRange { requested: f64, max: f64 },

    /// Motion failed (stall, limit switch, collision).
    #[error("Motion failed: {0}")]
    MotionFailed(String),

    /// Operation not available on this backend.
    #[error("Not supported by this hardware: {0}")]
    Unsupported(String),

    /// Hardware communication error.
    #[error("Hardware communication error: {0}")]
    Communication(String),

    /// Backend not found in a registry.
    #[error("Hardware backend not found: {0}")]
    BackendNotFound(String),
}

impl HardwareError {
    /// Stable numeric code carried in serialised error records.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Overpressure { .. } => "3006",
            Self::NotHomed(_) | Self::MotionFailed(_) => "2000",
            Self::NoInstrument(_) | Self::NoTipAttached(_) => "3000",
            Self::VolumeOutOfRange { .. } => "3001",
            Self::Unsupported(_) | Self::BackendNotFound(_) => "4000",
            Self::Communication(_) => "1000",
        }
    }

    /// Short type name used as `errorType` in serialised error records.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Overpressure { .. } => "PipetteOverpressure",
            Self::NotHomed(_) => "PositionUnknown",
            Self::NoInstrument(_) => "InstrumentNotFound",
            Self::NoTipAttached(_) => "TipNotAttached",
            Self::VolumeOutOfRange { .. } => "InvalidVolume",
            Self::MotionFailed(_) => "MotionFailed",
            Self::Unsupported(_) => "NotSupported",
            Self::Communication(_) => "CommunicationError",
            Self::BackendNotFound(_) => "BackendNotFound",
        }
    }

    #[inline]
    pub const fn is_overpressure(&self) -> bool {
        matches!(self, Self::Overpressure { .. })
    }
}

/// Factory function type for creating hardware backends.
pub type HardwareFactory = fn() -> Box<dyn HardwareControl>;

/// Async control surface of a liquid-handling robot.
///
/// Every method that moves a motor may suspend. Volumes are µL, flow rates
/// µL/s, distances mm. Methods returning a volume report the volume the
/// plunger actually displaced.
#[async_trait]
pub trait HardwareControl: Send + Sync {
    /// Backend identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Home the given axes, or every axis when `axes` is `None`.
    async fn home(&mut self, axes: Option<&[MotorAxis]>) -> Result<(), HardwareError>;

    /// Whether the gantry position for `mount` is trustworthy without homing.
    fn is_position_ok(&self, mount: Mount) -> bool;

    /// Current position of the critical point of `mount`.
    async fn gantry_position(&self, mount: Mount) -> Result<Point, HardwareError>;

    /// Move the critical point of `mount` to `target`; returns where it ended up.
    async fn move_to(
        &mut self,
        mount: Mount,
        target: Point,
        speed: Option<f64>,
    ) -> Result<Point, HardwareError>;

    /// Register the instrument model found on `mount`.
    async fn cache_instrument(&mut self, mount: Mount, model: &str) -> Result<(), HardwareError>;

    /// Switch the pipette on `mount` into the liquid class for `volume`.
    async fn configure_for_volume(&mut self, mount: Mount, volume: f64)
    -> Result<(), HardwareError>;

    /// Move the plunger to its bottom so an aspirate can follow.
    async fn prepare_for_aspirate(&mut self, mount: Mount) -> Result<(), HardwareError>;

    async fn aspirate(
        &mut self,
        mount: Mount,
        volume: f64,
        flow_rate: f64,
    ) -> Result<f64, HardwareError>;

    async fn dispense(
        &mut self,
        mount: Mount,
        volume: f64,
        flow_rate: f64,
        push_out: Option<f64>,
    ) -> Result<f64, HardwareError>;

    async fn blow_out(&mut self, mount: Mount, flow_rate: f64) -> Result<(), HardwareError>;

    async fn pick_up_tip(&mut self, mount: Mount, tip_length: f64) -> Result<(), HardwareError>;

    async fn drop_tip(&mut self, mount: Mount) -> Result<(), HardwareError>;

    /// Tip presence sensor reading; `None` when the mount has no sensor.
    async fn tip_present(&self, mount: Mount) -> Result<Option<bool>, HardwareError>;

    /// Resync motor position estimators from the encoders.
    ///
    /// Default: unsupported.
    async fn update_position_estimators(
        &mut self,
        axes: &[MotorAxis],
    ) -> Result<(), HardwareError> {
        Err(HardwareError::Unsupported(format!(
            "{} cannot update position estimators for {} axes",
            self.name(),
            axes.len()
        )))
    }
}
