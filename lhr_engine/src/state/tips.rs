//! Tip-rack slice: which tips are still clean.

use std::collections::{BTreeMap, BTreeSet};

use super::update::{FieldUpdate, StateUpdate};
use crate::types::NozzleMap;

/// Well grid of one loaded tip rack.
#[derive(Debug, Clone, PartialEq)]
pub struct TipRack {
    /// Well names by column, back to front.
    pub columns: Vec<Vec<String>>,
    pub used: BTreeSet<String>,
}

impl TipRack {
    fn rows(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn position(&self, well_name: &str) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(c, wells)| {
            wells.iter().position(|w| w == well_name).map(|r| (r, c))
        })
    }

    /// Wells under a nozzle rectangle anchored at (row, column), clipped to
    /// the rack.
    fn covered(&self, row: usize, column: usize, map: NozzleMap) -> Vec<&String> {
        self.columns
            .iter()
            .skip(column)
            .take(map.columns as usize)
            .flat_map(|wells| wells.iter().skip(row).take(map.rows as usize))
            .collect()
    }

    /// Whether the full rectangle fits at (row, column) and every tip in it
    /// is clean.
    fn fits_clean(&self, row: usize, column: usize, map: NozzleMap) -> bool {
        let rows = map.rows as usize;
        let columns = map.columns as usize;
        if row + rows > self.rows() || column + columns > self.columns.len() {
            return false;
        }
        let covered = self.covered(row, column, map);
        covered.len() == rows * columns && covered.iter().all(|w| !self.used.contains(*w))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TipState {
    pub racks_by_id: BTreeMap<String, TipRack>,
    pub nozzle_map_by_pipette: BTreeMap<String, NozzleMap>,
}

pub fn reduce(mut state: TipState, update: &StateUpdate) -> TipState {
    if let FieldUpdate::Set(loaded) = &update.loaded_labware {
        if loaded.definition.is_tiprack {
            state.racks_by_id.insert(
                loaded.labware_id.clone(),
                TipRack {
                    columns: loaded.definition.ordering.clone(),
                    used: BTreeSet::new(),
                },
            );
        }
    }

    if let FieldUpdate::Set(cfg) = &update.pipette_config {
        state
            .nozzle_map_by_pipette
            .insert(cfg.pipette_id.clone(), cfg.config.nozzle_map);
    }
    if let FieldUpdate::Set(nozzles) = &update.pipette_nozzle_map {
        state
            .nozzle_map_by_pipette
            .insert(nozzles.pipette_id.clone(), nozzles.nozzle_map);
    }

    if let FieldUpdate::Set(used) = &update.tips_used {
        let map = state
            .nozzle_map_by_pipette
            .get(&used.pipette_id)
            .copied()
            .unwrap_or(NozzleMap::SINGLE);
        if let Some(rack) = state.racks_by_id.get_mut(&used.labware_id) {
            if let Some((row, column)) = rack.position(&used.well_name) {
                let covered: Vec<String> = rack
                    .covered(row, column, map)
                    .into_iter()
                    .cloned()
                    .collect();
                rack.used.extend(covered);
            }
        }
    }

    if let FieldUpdate::Set(reset) = &update.tips_reset {
        if let Some(rack) = state.racks_by_id.get_mut(&reset.labware_id) {
            rack.used.clear();
        }
    }

    state
}

#[derive(Debug, Clone, Copy)]
pub struct TipView<'a> {
    state: &'a TipState,
}

impl<'a> TipView<'a> {
    pub fn new(state: &'a TipState) -> Self {
        Self { state }
    }

    #[inline]
    pub fn is_tip_rack(&self, labware_id: &str) -> bool {
        self.state.racks_by_id.contains_key(labware_id)
    }

    /// Whether the tip in `well_name` has never been picked up.
    pub fn has_clean_tip(&self, labware_id: &str, well_name: &str) -> bool {
        self.state
            .racks_by_id
            .get(labware_id)
            .is_some_and(|rack| rack.position(well_name).is_some() && !rack.used.contains(well_name))
    }

    /// First well, in column order from `starting_tip`, where a rectangle of
    /// `num_tips` tips (shaped by `nozzle_map`, if given) is entirely clean.
    pub fn get_next_tip(
        &self,
        labware_id: &str,
        num_tips: u32,
        starting_tip: Option<&str>,
        nozzle_map: Option<NozzleMap>,
    ) -> Option<String> {
        let rack = self.state.racks_by_id.get(labware_id)?;
        let map = nozzle_map.unwrap_or_else(|| {
            NozzleMap::for_channels(u8::try_from(num_tips).unwrap_or(u8::MAX))
        });
        let rows = rack.rows();
        let start = match starting_tip {
            Some(name) => {
                let (row, column) = rack.position(name)?;
                column * rows + row
            }
            None => 0,
        };

        (start..rows * rack.columns.len())
            .map(|index| (index % rows, index / rows))
            .find(|&(row, column)| rack.fits_clean(row, column, map))
            .and_then(|(row, column)| rack.columns[column].get(row).cloned())
    }
}
