//! Well slice: net liquid volume operated on each well.

use std::collections::BTreeMap;

use super::update::{FieldUpdate, StateUpdate};

/// Per labware, per well net volume; `None` means unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellState {
    pub operated_by_labware: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

pub fn reduce(mut state: WellState, update: &StateUpdate) -> WellState {
    if let FieldUpdate::Set(operated) = &update.liquid_operated {
        let wells = state
            .operated_by_labware
            .entry(operated.labware_id.clone())
            .or_default();
        for name in &operated.well_names {
            let entry = wells.entry(name.clone()).or_insert(Some(0.0));
            match operated.volume_added {
                FieldUpdate::NoChange => {}
                FieldUpdate::Clear => *entry = None,
                FieldUpdate::Set(volume) => {
                    if let Some(current) = entry.as_mut() {
                        *current += volume;
                    }
                }
            }
        }
    }
    state
}

#[derive(Debug, Clone, Copy)]
pub struct WellView<'a> {
    state: &'a WellState,
}

impl<'a> WellView<'a> {
    pub fn new(state: &'a WellState) -> Self {
        Self { state }
    }

    /// Net volume operated on a well: `Some(0.0)` if never touched, `None`
    /// if unknown.
    pub fn get_operated_volume(&self, labware_id: &str, well_name: &str) -> Option<f64> {
        self.state
            .operated_by_labware
            .get(labware_id)
            .and_then(|wells| wells.get(well_name))
            .copied()
            .unwrap_or(Some(0.0))
    }
}
