//! Simulation driver implementation.
//!
//! `SimulatedHardware` implements `HardwareControl` entirely in memory. Its
//! state lives behind an `Arc<Mutex<_>>` so a [`SimulationHandle`] can inspect
//! it and arm faults while the engine owns the driver.
//!
//! Every operation is counted before anything else happens. An armed fault
//! matching the operation (and mount, when given) is consumed and returned
//! with no state change.

use async_trait::async_trait;
use lhr_common::prelude::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::SimulationConfig;
use super::gantry::Gantry;
use super::plunger::Plunger;

/// Operations the simulator counts and can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimOperation {
    Home,
    MoveTo,
    CacheInstrument,
    ConfigureForVolume,
    PrepareForAspirate,
    Aspirate,
    Dispense,
    BlowOut,
    PickUpTip,
    DropTip,
    TipPresent,
    UpdatePositionEstimators,
}

impl SimOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::MoveTo => "moveTo",
            Self::CacheInstrument => "cacheInstrument",
            Self::ConfigureForVolume => "configureForVolume",
            Self::PrepareForAspirate => "prepareForAspirate",
            Self::Aspirate => "aspirate",
            Self::Dispense => "dispense",
            Self::BlowOut => "blowOut",
            Self::PickUpTip => "pickUpTip",
            Self::DropTip => "dropTip",
            Self::TipPresent => "tipPresent",
            Self::UpdatePositionEstimators => "updatePositionEstimators",
        }
    }
}

impl fmt::Display for SimOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Fault {
    operation: SimOperation,
    /// `None` matches either mount.
    mount: Option<Mount>,
    error: HardwareError,
}

#[derive(Debug)]
struct SimState {
    gantry: Gantry,
    left: Plunger,
    right: Plunger,
    calls: HashMap<SimOperation, usize>,
    faults: Vec<Fault>,
    tip_sensor: HashMap<Mount, Option<bool>>,
}

impl SimState {
    fn new(config: &SimulationConfig) -> Self {
        Self {
            gantry: Gantry::new(config.home_position),
            left: Plunger::new(Mount::Left),
            right: Plunger::new(Mount::Right),
            calls: HashMap::new(),
            faults: Vec::new(),
            tip_sensor: HashMap::new(),
        }
    }

    fn plunger(&self, mount: Mount) -> &Plunger {
        match mount {
            Mount::Left => &self.left,
            Mount::Right => &self.right,
        }
    }

    fn plunger_mut(&mut self, mount: Mount) -> &mut Plunger {
        match mount {
            Mount::Left => &mut self.left,
            Mount::Right => &mut self.right,
        }
    }

    /// Count `operation` and fire the first armed fault that matches it.
    fn begin(&mut self, operation: SimOperation, mount: Option<Mount>) -> Result<(), HardwareError> {
        *self.calls.entry(operation).or_default() += 1;
        let hit = self.faults.iter().position(|fault| {
            fault.operation == operation
                && (fault.mount.is_none() || mount.is_none() || fault.mount == mount)
        });
        match hit {
            Some(index) => {
                let fault = self.faults.remove(index);
                warn!(%operation, ?mount, error = %fault.error, "injected fault fired");
                Err(fault.error)
            }
            None => Ok(()),
        }
    }
}

fn validate_flow_rate(flow_rate: f64) -> Result<(), HardwareError> {
    if flow_rate.is_finite() && flow_rate > 0.0 {
        Ok(())
    } else {
        Err(HardwareError::MotionFailed(format!(
            "invalid flow rate {flow_rate} µL/s"
        )))
    }
}

/// In-memory liquid-handling robot.
pub struct SimulatedHardware {
    config: SimulationConfig,
    shared: Arc<Mutex<SimState>>,
}

impl SimulatedHardware {
    pub fn new(config: SimulationConfig) -> Self {
        let shared = Arc::new(Mutex::new(SimState::new(&config)));
        Self { config, shared }
    }

    /// Handle sharing this simulator's state.
    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[async_trait]
impl HardwareControl for SimulatedHardware {
    fn name(&self) -> &'static str {
        "simulation"
    }

    async fn home(&mut self, axes: Option<&[MotorAxis]>) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::Home, None)?;
        let axes = axes.unwrap_or(&MotorAxis::ALL);
        state.gantry.home(axes);
        debug!(?axes, "simulated home");
        Ok(())
    }

    fn is_position_ok(&self, mount: Mount) -> bool {
        self.shared.lock().gantry.is_position_ok(mount)
    }

    async fn gantry_position(&self, mount: Mount) -> Result<Point, HardwareError> {
        self.shared.lock().gantry.position(mount)
    }

    async fn move_to(
        &mut self,
        mount: Mount,
        target: Point,
        speed: Option<f64>,
    ) -> Result<Point, HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::MoveTo, Some(mount))?;
        let end = state.gantry.move_to(mount, target, speed)?;
        debug!(%mount, %end, ?speed, "simulated move");
        Ok(end)
    }

    async fn cache_instrument(&mut self, mount: Mount, model: &str) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::CacheInstrument, Some(mount))?;
        state.plunger_mut(mount).cache_instrument(model)?;
        info!(%mount, model, "simulated instrument cached");
        Ok(())
    }

    async fn configure_for_volume(
        &mut self,
        mount: Mount,
        volume: f64,
    ) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::ConfigureForVolume, Some(mount))?;
        let plunger = state.plunger_mut(mount);
        plunger.configure_for_volume(volume)?;
        debug!(%mount, working_volume = ?plunger.working_volume(), "simulated volume configuration");
        Ok(())
    }

    async fn prepare_for_aspirate(&mut self, mount: Mount) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::PrepareForAspirate, Some(mount))?;
        state.plunger_mut(mount).prepare_for_aspirate()
    }

    async fn aspirate(
        &mut self,
        mount: Mount,
        volume: f64,
        flow_rate: f64,
    ) -> Result<f64, HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::Aspirate, Some(mount))?;
        validate_flow_rate(flow_rate)?;
        let drawn = state
            .plunger_mut(mount)
            .aspirate(self.config.quantize(volume))?;
        debug!(%mount, requested = volume, drawn, flow_rate, "simulated aspirate");
        Ok(drawn)
    }

    async fn dispense(
        &mut self,
        mount: Mount,
        volume: f64,
        flow_rate: f64,
        push_out: Option<f64>,
    ) -> Result<f64, HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::Dispense, Some(mount))?;
        validate_flow_rate(flow_rate)?;
        let expelled = state
            .plunger_mut(mount)
            .dispense(self.config.quantize(volume))?;
        debug!(%mount, requested = volume, expelled, flow_rate, ?push_out, "simulated dispense");
        Ok(expelled)
    }

    async fn blow_out(&mut self, mount: Mount, flow_rate: f64) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::BlowOut, Some(mount))?;
        validate_flow_rate(flow_rate)?;
        state.plunger_mut(mount).blow_out()?;
        debug!(%mount, flow_rate, "simulated blow-out");
        Ok(())
    }

    async fn pick_up_tip(&mut self, mount: Mount, tip_length: f64) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::PickUpTip, Some(mount))?;
        state.plunger_mut(mount).pick_up_tip(tip_length)?;
        debug!(%mount, tip_length, "simulated tip pick-up");
        Ok(())
    }

    async fn drop_tip(&mut self, mount: Mount) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::DropTip, Some(mount))?;
        state.plunger_mut(mount).drop_tip()?;
        debug!(%mount, "simulated tip drop");
        Ok(())
    }

    async fn tip_present(&self, mount: Mount) -> Result<Option<bool>, HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::TipPresent, Some(mount))?;
        if let Some(&forced) = state.tip_sensor.get(&mount) {
            return Ok(forced);
        }
        Ok(self
            .config
            .tip_detection
            .then(|| state.plunger(mount).has_tip()))
    }

    async fn update_position_estimators(
        &mut self,
        axes: &[MotorAxis],
    ) -> Result<(), HardwareError> {
        let mut state = self.shared.lock();
        state.begin(SimOperation::UpdatePositionEstimators, None)?;
        state.gantry.sync_from_encoders(axes);
        debug!(?axes, "simulated position estimator update");
        Ok(())
    }
}

/// Inspection and fault-injection handle for a [`SimulatedHardware`].
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    shared: Arc<Mutex<SimState>>,
}

impl SimulationHandle {
    /// How many times `operation` has been attempted, failed calls included.
    pub fn calls(&self, operation: SimOperation) -> usize {
        self.shared
            .lock()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Fail the next `operation` on `mount` with an overpressure error.
    pub fn inject_overpressure(&self, mount: Mount, operation: SimOperation) {
        self.shared.lock().faults.push(Fault {
            operation,
            mount: Some(mount),
            error: HardwareError::Overpressure {
                mount,
                detail: format!("simulated overpressure during {operation}"),
            },
        });
    }

    /// Fail the next `operation` on any mount with `error`.
    pub fn inject_fault(&self, operation: SimOperation, error: HardwareError) {
        self.shared.lock().faults.push(Fault {
            operation,
            mount: None,
            error,
        });
    }

    /// Last commanded position of `mount`, homed or not.
    pub fn position(&self, mount: Mount) -> Point {
        self.shared.lock().gantry.raw_position(mount)
    }

    /// Force the tip sensor reading for `mount`.
    pub fn set_tip_sensor(&self, mount: Mount, reading: Option<bool>) {
        self.shared.lock().tip_sensor.insert(mount, reading);
    }

    /// Volume held in the plunger on `mount` (µL).
    pub fn held_volume(&self, mount: Mount) -> f64 {
        self.shared.lock().plunger(mount).held()
    }

    /// Whether the plunger on `mount` may aspirate without preparing first.
    pub fn is_prepared(&self, mount: Mount) -> bool {
        self.shared.lock().plunger(mount).is_ready()
    }

    pub fn has_tip(&self, mount: Mount) -> bool {
        self.shared.lock().plunger(mount).has_tip()
    }

    pub fn instrument_model(&self, mount: Mount) -> Option<String> {
        self.shared.lock().plunger(mount).model().map(str::to_string)
    }
}
