//! Labware definitions: built-in load names plus user-supplied definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::TipGeometry;

/// Geometry of one well, relative to the labware origin (front-left-bottom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    pub x: f64,
    pub y: f64,
    /// Z of the well bottom.
    pub z: f64,
    pub depth: f64,
    pub total_liquid_volume: f64,
    #[serde(default)]
    pub diameter: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub x_dimension: f64,
    pub y_dimension: f64,
    pub z_dimension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    pub namespace: String,
    pub load_name: String,
    pub version: u32,
    pub display_name: String,
    pub dimensions: Dimensions,
    /// Well names grouped by column, back to front.
    pub ordering: Vec<Vec<String>>,
    pub wells: BTreeMap<String, WellDefinition>,
    #[serde(default)]
    pub is_tiprack: bool,
    /// Effective tip length once seated on a nozzle.
    #[serde(default)]
    pub tip_length: Option<f64>,
    #[serde(default)]
    pub is_fixed_trash: bool,
}

impl LabwareDefinition {
    /// `namespace/load_name/version`.
    pub fn uri(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.load_name, self.version)
    }

    #[inline]
    pub fn well(&self, name: &str) -> Option<&WellDefinition> {
        self.wells.get(name)
    }

    /// (rows, columns) of the well grid.
    pub fn grid_size(&self) -> (usize, usize) {
        let rows = self.ordering.iter().map(Vec::len).max().unwrap_or(0);
        (rows, self.ordering.len())
    }

    /// (row, column) of a named well.
    pub fn well_grid_position(&self, name: &str) -> Option<(usize, usize)> {
        self.ordering.iter().enumerate().find_map(|(column, wells)| {
            wells
                .iter()
                .position(|w| w == name)
                .map(|row| (row, column))
        })
    }

    pub fn well_at(&self, row: usize, column: usize) -> Option<&str> {
        self.ordering
            .get(column)
            .and_then(|wells| wells.get(row))
            .map(String::as_str)
    }

    /// Geometry of a tip taken from this rack, if it is one.
    pub fn tip_geometry(&self) -> Option<TipGeometry> {
        if !self.is_tiprack {
            return None;
        }
        let well = self.ordering.first()?.first().and_then(|n| self.well(n))?;
        Some(TipGeometry {
            length: self.tip_length.unwrap_or(well.depth),
            diameter: well.diameter.unwrap_or_default(),
            volume: well.total_liquid_volume,
        })
    }

    /// Built-in definition for a load name.
    pub fn builtin(load_name: &str) -> Option<Self> {
        let def = match load_name {
            "opentrons_96_tiprack_20ul" => GridSpec {
                display_name: "Opentrons OT-2 96 Tip Rack 20 µL",
                height: 64.69,
                well_depth: 39.2,
                well_z: 25.49,
                well_volume: 20.0,
                diameter: 3.27,
                tip_length: Some(39.2 - 8.25),
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "opentrons_96_tiprack_300ul" => GridSpec {
                display_name: "Opentrons OT-2 96 Tip Rack 300 µL",
                height: 64.49,
                well_depth: 59.3,
                well_z: 5.39,
                well_volume: 300.0,
                diameter: 5.23,
                tip_length: Some(59.3 - 7.47),
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "opentrons_flex_96_tiprack_1000ul" => GridSpec {
                display_name: "Opentrons Flex 96 Tip Rack 1000 µL",
                height: 99.0,
                well_depth: 95.6,
                well_z: 3.4,
                well_volume: 1000.0,
                diameter: 5.47,
                tip_length: Some(95.6 - 10.5),
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "nest_96_wellplate_200ul_flat" => GridSpec {
                display_name: "NEST 96 Well Plate 200 µL Flat",
                height: 15.7,
                well_depth: 10.8,
                well_z: 4.9,
                well_volume: 200.0,
                diameter: 6.85,
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "corning_96_wellplate_360ul_flat" => GridSpec {
                display_name: "Corning 96 Well Plate 360 µL Flat",
                height: 14.22,
                well_depth: 10.67,
                well_z: 3.55,
                well_volume: 360.0,
                diameter: 6.86,
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "nest_12_reservoir_15ml" => GridSpec {
                display_name: "NEST 12 Well Reservoir 15 mL",
                rows: 1,
                columns: 12,
                a1: (14.38, 42.78),
                height: 31.4,
                well_depth: 26.85,
                well_z: 4.55,
                well_volume: 15_000.0,
                diameter: 8.2,
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "nest_1_reservoir_195ml" => GridSpec {
                display_name: "NEST 1 Well Reservoir 195 mL",
                rows: 1,
                columns: 1,
                a1: (63.88, 42.74),
                height: 31.4,
                well_depth: 25.0,
                well_z: 4.55,
                well_volume: 195_000.0,
                diameter: 106.8,
                ..GridSpec::PLATE_96
            }
            .build(load_name),
            "opentrons_1_trash_1100ml_fixed" => {
                let mut def = GridSpec {
                    display_name: "Opentrons Fixed Trash",
                    rows: 1,
                    columns: 1,
                    a1: (82.84, 80.0),
                    height: 82.0,
                    well_depth: 0.0,
                    well_z: 82.0,
                    well_volume: 1_100_000.0,
                    diameter: 0.0,
                    ..GridSpec::PLATE_96
                }
                .build(load_name);
                def.is_fixed_trash = true;
                def
            }
            _ => return None,
        };
        Some(def)
    }
}

/// Parameters of a regular rectangular well grid.
struct GridSpec {
    display_name: &'static str,
    rows: usize,
    columns: usize,
    a1: (f64, f64),
    pitch: f64,
    height: f64,
    well_depth: f64,
    well_z: f64,
    well_volume: f64,
    diameter: f64,
    tip_length: Option<f64>,
}

impl GridSpec {
    const PLATE_96: GridSpec = GridSpec {
        display_name: "",
        rows: 8,
        columns: 12,
        a1: (14.38, 74.24),
        pitch: 9.0,
        height: 0.0,
        well_depth: 0.0,
        well_z: 0.0,
        well_volume: 0.0,
        diameter: 0.0,
        tip_length: None,
    };

    fn build(self, load_name: &str) -> LabwareDefinition {
        let mut ordering = Vec::with_capacity(self.columns);
        let mut wells = BTreeMap::new();
        for column in 0..self.columns {
            let mut names = Vec::with_capacity(self.rows);
            for row in 0..self.rows {
                let name = format!("{}{}", (b'A' + row as u8) as char, column + 1);
                wells.insert(
                    name.clone(),
                    WellDefinition {
                        x: self.a1.0 + column as f64 * self.pitch,
                        y: self.a1.1 - row as f64 * self.pitch,
                        z: self.well_z,
                        depth: self.well_depth,
                        total_liquid_volume: self.well_volume,
                        diameter: Some(self.diameter),
                    },
                );
                names.push(name);
            }
            ordering.push(names);
        }
        LabwareDefinition {
            namespace: "opentrons".to_string(),
            load_name: load_name.to_string(),
            version: 1,
            display_name: self.display_name.to_string(),
            dimensions: Dimensions {
                x_dimension: 127.76,
                y_dimension: 85.48,
                z_dimension: self.height,
            },
            ordering,
            wells,
            is_tiprack: self.tip_length.is_some(),
            tip_length: self.tip_length,
            is_fixed_trash: false,
        }
    }
}
