//! Motion-level types shared between the engine and hardware backends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Pipette mount on the gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mount {
    Left,
    Right,
}

impl Mount {
    /// Vertical axis that carries this mount.
    #[inline]
    pub const fn z_axis(self) -> MotorAxis {
        match self {
            Self::Left => MotorAxis::LeftZ,
            Self::Right => MotorAxis::RightZ,
        }
    }

    /// Plunger axis of the pipette on this mount.
    #[inline]
    pub const fn plunger_axis(self) -> MotorAxis {
        match self {
            Self::Left => MotorAxis::LeftPlunger,
            Self::Right => MotorAxis::RightPlunger,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motor axes addressable by home and position-estimator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MotorAxis {
    X,
    Y,
    LeftZ,
    RightZ,
    LeftPlunger,
    RightPlunger,
    ExtensionZ,
    ExtensionJaw,
}

impl MotorAxis {
    /// Every axis, in homing order.
    pub const ALL: [MotorAxis; 8] = [
        MotorAxis::LeftZ,
        MotorAxis::RightZ,
        MotorAxis::ExtensionZ,
        MotorAxis::X,
        MotorAxis::Y,
        MotorAxis::LeftPlunger,
        MotorAxis::RightPlunger,
        MotorAxis::ExtensionJaw,
    ];

    /// Mount whose position depends on this axis, if any.
    pub const fn mount(self) -> Option<Mount> {
        match self {
            Self::LeftZ | Self::LeftPlunger => Some(Mount::Left),
            Self::RightZ | Self::RightPlunger => Some(Mount::Right),
            _ => None,
        }
    }

    /// Axes needed to place a pipette on `mount`: X, Y and its Z.
    pub const fn positioning_axes(mount: Mount) -> [MotorAxis; 3] {
        [MotorAxis::X, MotorAxis::Y, mount.z_axis()]
    }
}

/// Cartesian point in deck coordinates (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ZERO: Point = Point::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same point with Z replaced.
    #[inline]
    pub const fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}
