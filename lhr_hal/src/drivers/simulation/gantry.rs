//! Simulated gantry: homing state and per-mount critical point positions.

use lhr_common::hardware::{HardwareError, MotorAxis, Mount, Point};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub(crate) struct Gantry {
    home: Point,
    homed: HashSet<MotorAxis>,
    left: Point,
    right: Point,
}

impl Gantry {
    pub fn new(home: Point) -> Self {
        Self {
            home,
            homed: HashSet::new(),
            left: home,
            right: home,
        }
    }

    fn slot_mut(&mut self, mount: Mount) -> &mut Point {
        match mount {
            Mount::Left => &mut self.left,
            Mount::Right => &mut self.right,
        }
    }

    /// Home `axes`. Each homed positioning axis drives the matching
    /// coordinate of the affected mounts to the home position.
    pub fn home(&mut self, axes: &[MotorAxis]) {
        let home = self.home;
        for &axis in axes {
            self.homed.insert(axis);
            for mount in [Mount::Left, Mount::Right] {
                let point = self.slot_mut(mount);
                match axis {
                    MotorAxis::X => point.x = home.x,
                    MotorAxis::Y => point.y = home.y,
                    a if a == mount.z_axis() => point.z = home.z,
                    _ => {}
                }
            }
        }
    }

    /// Accept the encoder reading of `axes` as their true position.
    pub fn sync_from_encoders(&mut self, axes: &[MotorAxis]) {
        self.homed.extend(axes.iter().copied());
    }

    pub fn is_position_ok(&self, mount: Mount) -> bool {
        MotorAxis::positioning_axes(mount)
            .iter()
            .all(|axis| self.homed.contains(axis))
    }

    fn ensure_homed(&self, mount: Mount) -> Result<(), HardwareError> {
        if self.is_position_ok(mount) {
            return Ok(());
        }
        let missing: Vec<String> = MotorAxis::positioning_axes(mount)
            .iter()
            .filter(|axis| !self.homed.contains(*axis))
            .map(|axis| format!("{axis:?}"))
            .collect();
        Err(HardwareError::NotHomed(missing.join(", ")))
    }

    pub fn position(&self, mount: Mount) -> Result<Point, HardwareError> {
        self.ensure_homed(mount)?;
        Ok(self.raw_position(mount))
    }

    /// Last commanded position, homed or not.
    pub fn raw_position(&self, mount: Mount) -> Point {
        match mount {
            Mount::Left => self.left,
            Mount::Right => self.right,
        }
    }

    pub fn move_to(
        &mut self,
        mount: Mount,
        target: Point,
        speed: Option<f64>,
    ) -> Result<Point, HardwareError> {
        self.ensure_homed(mount)?;
        if let Some(speed) = speed {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(HardwareError::MotionFailed(format!(
                    "invalid speed {speed} mm/s"
                )));
            }
        }
        *self.slot_mut(mount) = target;
        Ok(target)
    }
}
