//! Domain value types shared by state, commands and handlers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use lhr_common::hardware::{MotorAxis, Mount, Point};

/// Absolute position of a pipette's critical point in deck coordinates.
pub type DeckPoint = Point;

// ─── Robot & protocol version ───────────────────────────────────────

/// Robot platform the engine is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RobotType {
    #[default]
    #[serde(rename = "OT-2 Standard")]
    Ot2,
    #[serde(rename = "OT-3 Standard")]
    Flex,
}

impl fmt::Display for RobotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ot2 => "OT-2 Standard",
            Self::Flex => "OT-3 Standard",
        })
    }
}

/// Declared protocol API version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    /// First version where a requested volume of 0 means literally zero.
    pub const LITERAL_ZERO_VOLUME: ApiVersion = ApiVersion::new(2, 16);

    /// Newest version this engine understands.
    pub const LATEST: ApiVersion = ApiVersion::new(2, 20);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("API version '{s}' must look like MAJOR.MINOR"))?;
        let major = major
            .parse()
            .map_err(|_| format!("invalid major version in '{s}'"))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("invalid minor version in '{s}'"))?;
        Ok(Self::new(major, minor))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Deck slots ─────────────────────────────────────────────────────

/// Deck slot, stored in OT-2 numbering (1 = front left, 12 = back right).
///
/// Flex coordinates (`D1` … `A3`) parse onto the same grid: row letters run
/// back (`A`) to front (`D`), so `D1` is slot 1 and `A3` is slot 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeckSlot(u8);

impl DeckSlot {
    pub const COLUMNS: u8 = 3;
    pub const ROWS: u8 = 4;
    pub const COUNT: u8 = Self::COLUMNS * Self::ROWS;

    /// Slot holding the OT-2 fixed trash.
    pub const FIXED_TRASH: DeckSlot = DeckSlot(12);

    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= Self::COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based column (0 = left).
    #[inline]
    pub const fn column(self) -> u8 {
        (self.0 - 1) % Self::COLUMNS
    }

    /// Zero-based row counted from the front (0 = front).
    #[inline]
    pub const fn row(self) -> u8 {
        (self.0 - 1) / Self::COLUMNS
    }

    const fn at(row: u8, column: u8) -> Self {
        Self(row * Self::COLUMNS + column + 1)
    }

    pub const fn west(self) -> Option<Self> {
        if self.column() == 0 {
            None
        } else {
            Some(Self::at(self.row(), self.column() - 1))
        }
    }

    pub const fn east(self) -> Option<Self> {
        if self.column() + 1 >= Self::COLUMNS {
            None
        } else {
            Some(Self::at(self.row(), self.column() + 1))
        }
    }

    pub const fn north(self) -> Option<Self> {
        if self.row() + 1 >= Self::ROWS {
            None
        } else {
            Some(Self::at(self.row() + 1, self.column()))
        }
    }

    pub const fn south(self) -> Option<Self> {
        if self.row() == 0 {
            None
        } else {
            Some(Self::at(self.row() - 1, self.column()))
        }
    }

    /// Flex coordinate name, e.g. `"D1"`.
    pub fn flex_name(self) -> String {
        let row = (b'A' + (Self::ROWS - 1 - self.row())) as char;
        format!("{row}{}", self.column() + 1)
    }

    /// Name as printed on the given robot's deck.
    pub fn display_for(self, robot_type: RobotType) -> String {
        match robot_type {
            RobotType::Ot2 => self.0.to_string(),
            RobotType::Flex => self.flex_name(),
        }
    }
}

impl fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeckSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(number) = s.parse::<u8>() {
            return Self::new(number).ok_or_else(|| format!("deck slot {number} does not exist"));
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(row @ 'A'..='D'), Some(column @ '1'..='3'), None) => {
                let row = Self::ROWS - 1 - (row as u8 - b'A');
                let column = column as u8 - b'1';
                Ok(Self::at(row, column))
            }
            _ => Err(format!("'{s}' is not a deck slot name")),
        }
    }
}

impl Serialize for DeckSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeckSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Locations ──────────────────────────────────────────────────────

/// Where a piece of labware sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LabwareLocation {
    Slot { slot_name: DeckSlot },
    Module { module_id: String },
    OnLabware { labware_id: String },
    OffDeck,
}

/// Logical (not Cartesian) location of a pipette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LogicalLocation {
    Well {
        labware_id: String,
        well_name: String,
    },
    AddressableArea {
        addressable_area_name: String,
    },
}

impl LogicalLocation {
    pub fn well(labware_id: impl Into<String>, well_name: impl Into<String>) -> Self {
        Self::Well {
            labware_id: labware_id.into(),
            well_name: well_name.into(),
        }
    }
}

/// Reference point inside a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellOrigin {
    #[default]
    Top,
    Bottom,
    Center,
}

/// Offset relative to a [`WellOrigin`], in mm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WellOffset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WellLocation {
    #[serde(default)]
    pub origin: WellOrigin,
    #[serde(default)]
    pub offset: WellOffset,
}

impl WellLocation {
    pub const fn top() -> Self {
        Self {
            origin: WellOrigin::Top,
            offset: WellOffset {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        }
    }

    /// Default liquid-handling location: 1 mm above the well bottom.
    pub const fn liquid_handling_default() -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: WellOffset {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
        }
    }
}

// ─── Pipette configuration ──────────────────────────────────────────

/// Per-pipette flow rates (µL/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRates {
    pub aspirate: f64,
    pub dispense: f64,
    pub blow_out: f64,
}

/// Active nozzle layout, as a rectangle of `rows` × `columns` nozzles
/// anchored at the back-left nozzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NozzleMap {
    pub rows: u8,
    pub columns: u8,
}

impl NozzleMap {
    pub const SINGLE: NozzleMap = NozzleMap::new(1, 1);
    pub const COLUMN: NozzleMap = NozzleMap::new(8, 1);
    pub const ROW: NozzleMap = NozzleMap::new(1, 12);
    pub const FULL_96: NozzleMap = NozzleMap::new(8, 12);

    pub const fn new(rows: u8, columns: u8) -> Self {
        Self { rows, columns }
    }

    /// Full layout of a pipette with `channels` nozzles.
    pub const fn for_channels(channels: u8) -> Self {
        match channels {
            96 => Self::FULL_96,
            8 => Self::COLUMN,
            12 => Self::ROW,
            _ => Self::SINGLE,
        }
    }

    #[inline]
    pub const fn active_channels(self) -> u32 {
        self.rows as u32 * self.columns as u32
    }
}

/// Nozzle layout styles accepted by `configureNozzleLayout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NozzleLayoutStyle {
    All,
    Single,
    Column,
    Row,
}

/// Geometry of the tip currently on a pipette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipGeometry {
    pub length: f64,
    pub diameter: f64,
    pub volume: f64,
}

// ─── Modules ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleModel {
    TemperatureModuleV2,
    MagneticModuleV2,
    ThermocyclerModuleV1,
    ThermocyclerModuleV2,
    HeaterShakerModuleV1,
    MagneticBlockV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Temperature,
    Magnetic,
    Thermocycler,
    HeaterShaker,
    MagneticBlock,
}

impl ModuleModel {
    pub const fn kind(self) -> ModuleKind {
        match self {
            Self::TemperatureModuleV2 => ModuleKind::Temperature,
            Self::MagneticModuleV2 => ModuleKind::Magnetic,
            Self::ThermocyclerModuleV1 | Self::ThermocyclerModuleV2 => ModuleKind::Thermocycler,
            Self::HeaterShakerModuleV1 => ModuleKind::HeaterShaker,
            Self::MagneticBlockV1 => ModuleKind::MagneticBlock,
        }
    }

    /// Wire name, used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TemperatureModuleV2 => "temperatureModuleV2",
            Self::MagneticModuleV2 => "magneticModuleV2",
            Self::ThermocyclerModuleV1 => "thermocyclerModuleV1",
            Self::ThermocyclerModuleV2 => "thermocyclerModuleV2",
            Self::HeaterShakerModuleV1 => "heaterShakerModuleV1",
            Self::MagneticBlockV1 => "magneticBlockV1",
        }
    }

    /// Overall height of the bare module (mm).
    pub const fn overall_height(self) -> f64 {
        match self {
            Self::TemperatureModuleV2 => 84.0,
            Self::MagneticModuleV2 => 110.152,
            Self::ThermocyclerModuleV1 => 98.0,
            Self::ThermocyclerModuleV2 => 108.96,
            Self::HeaterShakerModuleV1 => 82.0,
            Self::MagneticBlockV1 => 45.0,
        }
    }

    /// Z of the labware seating surface above the slot (mm).
    pub const fn labware_offset_z(self) -> f64 {
        match self {
            Self::TemperatureModuleV2 => 9.0,
            Self::MagneticModuleV2 => 4.0,
            Self::ThermocyclerModuleV1 | Self::ThermocyclerModuleV2 => 10.7,
            Self::HeaterShakerModuleV1 => 18.95,
            Self::MagneticBlockV1 => 5.0,
        }
    }

    pub const fn is_compatible_with(self, robot_type: RobotType) -> bool {
        match self {
            Self::MagneticModuleV2 | Self::ThermocyclerModuleV1 => {
                matches!(robot_type, RobotType::Ot2)
            }
            Self::MagneticBlockV1 => matches!(robot_type, RobotType::Flex),
            _ => true,
        }
    }
}

impl fmt::Display for ModuleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
