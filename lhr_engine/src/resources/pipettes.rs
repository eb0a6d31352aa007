//! Built-in pipette definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{FlowRates, NozzleMap, RobotType};

/// Pipette load names understood by `loadPipette`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipetteName {
    P20SingleGen2,
    P300SingleGen2,
    P300MultiGen2,
    P1000SingleGen2,
    P50SingleFlex,
    P1000SingleFlex,
    P1000MultiFlex,
    #[serde(rename = "p1000_96")]
    P1000_96,
}

impl fmt::Display for PipetteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.definition().model)
    }
}

impl PipetteName {
    pub fn definition(self) -> &'static PipetteDefinition {
        match self {
            Self::P20SingleGen2 => &P20_SINGLE_GEN2,
            Self::P300SingleGen2 => &P300_SINGLE_GEN2,
            Self::P300MultiGen2 => &P300_MULTI_GEN2,
            Self::P1000SingleGen2 => &P1000_SINGLE_GEN2,
            Self::P50SingleFlex => &P50_SINGLE_FLEX,
            Self::P1000SingleFlex => &P1000_SINGLE_FLEX,
            Self::P1000MultiFlex => &P1000_MULTI_FLEX,
            Self::P1000_96 => &P1000_96,
        }
    }
}

/// Liquid class a pipette can switch into via `configureForVolume`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidClassConfig {
    pub name: &'static str,
    pub min_volume: f64,
    pub max_volume: f64,
    pub flow_rates: FlowRates,
}

/// Static description of a pipette model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipetteDefinition {
    pub model: &'static str,
    pub display_name: &'static str,
    pub channels: u8,
    pub robot_type: RobotType,
    pub default_class: LiquidClassConfig,
    /// Optional low-volume class selected for small target volumes.
    pub low_volume_class: Option<LiquidClassConfig>,
}

/// Configuration of a loaded pipette for a given liquid class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteConfig {
    pub model: String,
    pub display_name: String,
    pub channels: u8,
    pub liquid_class: String,
    pub min_volume: f64,
    pub max_volume: f64,
    pub flow_rates: FlowRates,
    pub nozzle_map: NozzleMap,
}

impl PipetteDefinition {
    /// Configuration for the liquid class that handles `volume`.
    ///
    /// The low-volume class is picked when it exists and `volume` fits in it.
    pub fn config_for_volume(&self, volume: Option<f64>) -> PipetteConfig {
        let class = match (self.low_volume_class, volume) {
            (Some(low), Some(v)) if v <= low.max_volume => low,
            _ => self.default_class,
        };
        PipetteConfig {
            model: self.model.to_string(),
            display_name: self.display_name.to_string(),
            channels: self.channels,
            liquid_class: class.name.to_string(),
            min_volume: class.min_volume,
            max_volume: class.max_volume,
            flow_rates: class.flow_rates,
            nozzle_map: NozzleMap::for_channels(self.channels),
        }
    }
}

const fn class(
    name: &'static str,
    min_volume: f64,
    max_volume: f64,
    aspirate: f64,
    dispense: f64,
    blow_out: f64,
) -> LiquidClassConfig {
    LiquidClassConfig {
        name,
        min_volume,
        max_volume,
        flow_rates: FlowRates {
            aspirate,
            dispense,
            blow_out,
        },
    }
}

static P20_SINGLE_GEN2: PipetteDefinition = PipetteDefinition {
    model: "p20_single_v2.2",
    display_name: "P20 Single-Channel GEN2",
    channels: 1,
    robot_type: RobotType::Ot2,
    default_class: class("default", 1.0, 20.0, 7.56, 7.56, 7.56),
    low_volume_class: None,
};

static P300_SINGLE_GEN2: PipetteDefinition = PipetteDefinition {
    model: "p300_single_v2.1",
    display_name: "P300 Single-Channel GEN2",
    channels: 1,
    robot_type: RobotType::Ot2,
    default_class: class("default", 20.0, 300.0, 92.86, 92.86, 92.86),
    low_volume_class: None,
};

static P300_MULTI_GEN2: PipetteDefinition = PipetteDefinition {
    model: "p300_multi_v2.1",
    display_name: "P300 8-Channel GEN2",
    channels: 8,
    robot_type: RobotType::Ot2,
    default_class: class("default", 20.0, 300.0, 94.0, 94.0, 94.0),
    low_volume_class: None,
};

static P1000_SINGLE_GEN2: PipetteDefinition = PipetteDefinition {
    model: "p1000_single_v2.2",
    display_name: "P1000 Single-Channel GEN2",
    channels: 1,
    robot_type: RobotType::Ot2,
    default_class: class("default", 100.0, 1000.0, 274.7, 274.7, 274.7),
    low_volume_class: None,
};

static P50_SINGLE_FLEX: PipetteDefinition = PipetteDefinition {
    model: "p50_single_v3.5",
    display_name: "Flex 1-Channel 50 μL",
    channels: 1,
    robot_type: RobotType::Flex,
    default_class: class("default", 5.0, 50.0, 35.0, 57.0, 57.0),
    low_volume_class: Some(class("lowVolumeDefault", 1.0, 30.0, 26.7, 26.7, 26.7)),
};

static P1000_SINGLE_FLEX: PipetteDefinition = PipetteDefinition {
    model: "p1000_single_v3.5",
    display_name: "Flex 1-Channel 1000 μL",
    channels: 1,
    robot_type: RobotType::Flex,
    default_class: class("default", 5.0, 1000.0, 478.0, 478.0, 80.0),
    low_volume_class: None,
};

static P1000_MULTI_FLEX: PipetteDefinition = PipetteDefinition {
    model: "p1000_multi_v3.5",
    display_name: "Flex 8-Channel 1000 μL",
    channels: 8,
    robot_type: RobotType::Flex,
    default_class: class("default", 5.0, 1000.0, 478.0, 478.0, 80.0),
    low_volume_class: None,
};

static P1000_96: PipetteDefinition = PipetteDefinition {
    model: "p1000_96_v3.6",
    display_name: "Flex 96-Channel 1000 μL",
    channels: 96,
    robot_type: RobotType::Flex,
    default_class: class("default", 5.0, 1000.0, 160.0, 160.0, 80.0),
    low_volume_class: None,
};
