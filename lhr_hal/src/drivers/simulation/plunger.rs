//! Simulated pipette plunger for one mount.
//!
//! Tracks the cached instrument, its tip and the volume held. A plunger must
//! be prepared (driven to the bottom of its travel) before it can aspirate;
//! picking up a tip prepares it, blowing out or dropping the tip does not.

use lhr_common::consts::VOLUME_EPSILON;
use lhr_common::hardware::{HardwareError, Mount};

/// Nominal maximum volume (µL) from a model string such as
/// `p300_single_v2.1` or `p1000_96_v3.6`.
pub(crate) fn max_volume_for_model(model: &str) -> Result<f64, HardwareError> {
    model
        .strip_prefix('p')
        .map(|rest| rest.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(""))
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|&volume| volume > 0)
        .map(f64::from)
        .ok_or_else(|| HardwareError::Unsupported(format!("unknown pipette model '{model}'")))
}

#[derive(Debug, Clone)]
struct Instrument {
    model: String,
    max_volume: f64,
    /// Volume the pipette is currently configured for.
    working_volume: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Plunger {
    mount: Mount,
    instrument: Option<Instrument>,
    tip_length: Option<f64>,
    held: f64,
    ready: bool,
}

impl Plunger {
    pub fn new(mount: Mount) -> Self {
        Self {
            mount,
            instrument: None,
            tip_length: None,
            held: 0.0,
            ready: false,
        }
    }

    pub fn cache_instrument(&mut self, model: &str) -> Result<(), HardwareError> {
        let max_volume = max_volume_for_model(model)?;
        self.instrument = Some(Instrument {
            model: model.to_string(),
            max_volume,
            working_volume: max_volume,
        });
        self.tip_length = None;
        self.held = 0.0;
        self.ready = false;
        Ok(())
    }

    pub fn model(&self) -> Option<&str> {
        self.instrument.as_ref().map(|i| i.model.as_str())
    }

    fn instrument(&self) -> Result<&Instrument, HardwareError> {
        self.instrument
            .as_ref()
            .ok_or(HardwareError::NoInstrument(self.mount))
    }

    fn require_tip(&self) -> Result<(), HardwareError> {
        self.instrument()?;
        match self.tip_length {
            Some(_) => Ok(()),
            None => Err(HardwareError::NoTipAttached(self.mount)),
        }
    }

    pub fn working_volume(&self) -> Option<f64> {
        self.instrument.as_ref().map(|i| i.working_volume)
    }

    pub fn has_tip(&self) -> bool {
        self.tip_length.is_some()
    }

    pub fn held(&self) -> f64 {
        self.held
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn configure_for_volume(&mut self, volume: f64) -> Result<(), HardwareError> {
        let max = self.instrument()?.max_volume;
        if !(volume.is_finite() && volume >= 0.0) || volume > max {
            return Err(HardwareError::VolumeOutOfRange {
                requested: volume,
                max,
            });
        }
        if let Some(instrument) = self.instrument.as_mut() {
            instrument.working_volume = volume;
        }
        Ok(())
    }

    /// Drive the plunger to the bottom of its travel. Whatever was still
    /// held is pushed out.
    pub fn prepare_for_aspirate(&mut self) -> Result<(), HardwareError> {
        self.instrument()?;
        self.held = 0.0;
        self.ready = true;
        Ok(())
    }

    /// Draw `volume`, already quantized by the caller. Returns the volume drawn.
    pub fn aspirate(&mut self, volume: f64) -> Result<f64, HardwareError> {
        self.require_tip()?;
        if !self.ready {
            return Err(HardwareError::MotionFailed(format!(
                "plunger on {} mount is not prepared for aspirate",
                self.mount
            )));
        }
        let room = self.instrument()?.max_volume - self.held;
        if volume > room + VOLUME_EPSILON {
            return Err(HardwareError::VolumeOutOfRange {
                requested: volume,
                max: room,
            });
        }
        self.held += volume;
        Ok(volume)
    }

    pub fn dispense(&mut self, volume: f64) -> Result<f64, HardwareError> {
        self.require_tip()?;
        if volume > self.held + VOLUME_EPSILON {
            return Err(HardwareError::VolumeOutOfRange {
                requested: volume,
                max: self.held,
            });
        }
        self.held = (self.held - volume).max(0.0);
        Ok(volume)
    }

    pub fn blow_out(&mut self) -> Result<(), HardwareError> {
        self.require_tip()?;
        self.held = 0.0;
        self.ready = false;
        Ok(())
    }

    pub fn pick_up_tip(&mut self, tip_length: f64) -> Result<(), HardwareError> {
        self.instrument()?;
        if self.tip_length.is_some() {
            return Err(HardwareError::MotionFailed(format!(
                "tip already attached on {} mount",
                self.mount
            )));
        }
        self.tip_length = Some(tip_length);
        self.held = 0.0;
        self.ready = true;
        Ok(())
    }

    pub fn drop_tip(&mut self) -> Result<(), HardwareError> {
        self.require_tip()?;
        self.tip_length = None;
        self.held = 0.0;
        self.ready = false;
        Ok(())
    }
}
