//! Pipette slice: loaded pipettes, their location, tip and fluid contents.

use std::collections::BTreeMap;

use tracing::debug;

use super::fluid_stack::FluidStack;
use super::update::{FieldUpdate, FluidKind, FluidOperation, StateUpdate};
use crate::error::StateError;
use crate::resources::{PipetteConfig, PipetteName};
use crate::types::{DeckPoint, FlowRates, LogicalLocation, Mount, NozzleMap, TipGeometry};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPipette {
    pub id: String,
    pub pipette_name: PipetteName,
    pub mount: Mount,
}

/// Logical location of the one pipette that last moved.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPipetteLocation {
    pub pipette_id: String,
    pub location: LogicalLocation,
}

/// Cartesian position of the last-moved mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentDeckPoint {
    pub mount: Mount,
    pub deck_point: DeckPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipetteState {
    pub pipettes_by_id: BTreeMap<String, LoadedPipette>,
    pub current_location: Option<CurrentPipetteLocation>,
    pub current_deck_point: Option<CurrentDeckPoint>,
    /// `None` means contents unknown.
    pub fluid_by_id: BTreeMap<String, Option<FluidStack>>,
    pub attached_tip_by_id: BTreeMap<String, Option<TipGeometry>>,
    pub config_by_id: BTreeMap<String, PipetteConfig>,
    pub nozzle_map_by_id: BTreeMap<String, NozzleMap>,
    pub movement_speed_by_id: BTreeMap<String, f64>,
}

/// Fold one update into the pipette slice.
pub fn reduce(mut state: PipetteState, update: &StateUpdate) -> PipetteState {
    if let FieldUpdate::Set(load) = &update.loaded_pipette {
        debug!(pipette_id = %load.pipette_id, mount = %load.mount, "pipette loaded");
        state.pipettes_by_id.insert(
            load.pipette_id.clone(),
            LoadedPipette {
                id: load.pipette_id.clone(),
                pipette_name: load.pipette_name,
                mount: load.mount,
            },
        );
        state.attached_tip_by_id.insert(load.pipette_id.clone(), None);
        state.movement_speed_by_id.remove(&load.pipette_id);
    }

    if let FieldUpdate::Set(cfg) = &update.pipette_config {
        state
            .nozzle_map_by_id
            .insert(cfg.pipette_id.clone(), cfg.config.nozzle_map);
        state
            .config_by_id
            .insert(cfg.pipette_id.clone(), cfg.config.clone());
    }

    if let FieldUpdate::Set(nozzles) = &update.pipette_nozzle_map {
        state
            .nozzle_map_by_id
            .insert(nozzles.pipette_id.clone(), nozzles.nozzle_map);
    }

    match &update.pipette_location {
        FieldUpdate::NoChange => {}
        FieldUpdate::Clear => {
            state.current_location = None;
            state.current_deck_point = None;
        }
        FieldUpdate::Set(loc) => {
            match &loc.new_location {
                FieldUpdate::NoChange => {}
                FieldUpdate::Clear => state.current_location = None,
                FieldUpdate::Set(location) => {
                    state.current_location = Some(CurrentPipetteLocation {
                        pipette_id: loc.pipette_id.clone(),
                        location: location.clone(),
                    });
                }
            }
            match &loc.new_deck_point {
                FieldUpdate::NoChange => {}
                FieldUpdate::Clear => state.current_deck_point = None,
                FieldUpdate::Set(point) => {
                    state.current_deck_point =
                        state
                            .pipettes_by_id
                            .get(&loc.pipette_id)
                            .map(|p| CurrentDeckPoint {
                                mount: p.mount,
                                deck_point: *point,
                            });
                }
            }
        }
    }

    if let FieldUpdate::Set(tip) = &update.pipette_tip_state {
        state
            .attached_tip_by_id
            .insert(tip.pipette_id.clone(), tip.tip_geometry);
        if tip.tip_geometry.is_none() {
            state.fluid_by_id.insert(tip.pipette_id.clone(), None);
        }
    }

    if let FieldUpdate::Set(fluid) = &update.pipette_fluid {
        let slot = state.fluid_by_id.entry(fluid.pipette_id.clone()).or_default();
        match fluid.fluid {
            FluidOperation::Aspirated { kind, volume } => {
                slot.get_or_insert_with(FluidStack::new).add(kind, volume);
            }
            FluidOperation::Ejected { volume } => {
                if let Some(stack) = slot.as_mut() {
                    stack.remove(volume);
                }
            }
            FluidOperation::Empty => *slot = Some(FluidStack::new()),
            FluidOperation::Unknown => *slot = None,
        }
    }

    if let FieldUpdate::Set(speed) = &update.pipette_movement_speed {
        match speed.speed {
            Some(value) => {
                state
                    .movement_speed_by_id
                    .insert(speed.pipette_id.clone(), value);
            }
            None => {
                state.movement_speed_by_id.remove(&speed.pipette_id);
            }
        }
    }

    state
}

/// Read-only queries over the pipette slice.
#[derive(Debug, Clone, Copy)]
pub struct PipetteView<'a> {
    state: &'a PipetteState,
}

impl<'a> PipetteView<'a> {
    pub fn new(state: &'a PipetteState) -> Self {
        Self { state }
    }

    pub fn get(&self, pipette_id: &str) -> Result<&'a LoadedPipette, StateError> {
        self.state
            .pipettes_by_id
            .get(pipette_id)
            .ok_or_else(|| StateError::PipetteNotLoaded(pipette_id.to_string()))
    }

    pub fn get_all(&self) -> impl Iterator<Item = &'a LoadedPipette> + 'a {
        self.state.pipettes_by_id.values()
    }

    pub fn get_mount(&self, pipette_id: &str) -> Result<Mount, StateError> {
        self.get(pipette_id).map(|p| p.mount)
    }

    pub fn get_by_mount(&self, mount: Mount) -> Option<&'a LoadedPipette> {
        self.state.pipettes_by_id.values().find(|p| p.mount == mount)
    }

    pub fn get_config(&self, pipette_id: &str) -> Result<&'a PipetteConfig, StateError> {
        self.state
            .config_by_id
            .get(pipette_id)
            .ok_or_else(|| StateError::PipetteNotLoaded(pipette_id.to_string()))
    }

    pub fn get_flow_rates(&self, pipette_id: &str) -> Result<FlowRates, StateError> {
        self.get_config(pipette_id).map(|c| c.flow_rates)
    }

    pub fn get_current_location(&self) -> Option<&'a CurrentPipetteLocation> {
        self.state.current_location.as_ref()
    }

    pub fn get_deck_point(&self, pipette_id: &str) -> Option<DeckPoint> {
        let mount = self.get_mount(pipette_id).ok()?;
        self.state
            .current_deck_point
            .filter(|dp| dp.mount == mount)
            .map(|dp| dp.deck_point)
    }

    pub fn get_nozzle_map(&self, pipette_id: &str) -> Result<NozzleMap, StateError> {
        self.state
            .nozzle_map_by_id
            .get(pipette_id)
            .copied()
            .ok_or_else(|| StateError::PipetteNotLoaded(pipette_id.to_string()))
    }

    pub fn get_active_channels(&self, pipette_id: &str) -> Result<u32, StateError> {
        self.get_nozzle_map(pipette_id).map(NozzleMap::active_channels)
    }

    pub fn get_attached_tip(&self, pipette_id: &str) -> Option<TipGeometry> {
        self.state
            .attached_tip_by_id
            .get(pipette_id)
            .copied()
            .flatten()
    }

    #[inline]
    pub fn has_tip(&self, pipette_id: &str) -> bool {
        self.get_attached_tip(pipette_id).is_some()
    }

    /// Fluid contents; `Ok(None)` when unknown.
    pub fn get_fluid(&self, pipette_id: &str) -> Result<Option<&'a FluidStack>, StateError> {
        self.get(pipette_id)?;
        Ok(self
            .state
            .fluid_by_id
            .get(pipette_id)
            .and_then(Option::as_ref))
    }

    /// Total volume held; `None` when unknown.
    pub fn get_aspirated_volume(&self, pipette_id: &str) -> Result<Option<f64>, StateError> {
        Ok(self.get_fluid(pipette_id)?.map(FluidStack::total_volume))
    }

    /// Liquid held; `None` when unknown.
    pub fn get_liquid_volume(&self, pipette_id: &str) -> Result<Option<f64>, StateError> {
        Ok(self
            .get_fluid(pipette_id)?
            .map(|f| f.volume_of(FluidKind::Liquid)))
    }

    /// Volume that can still be drawn up, bounded by the tip and the
    /// current liquid class. `None` when contents are unknown.
    pub fn get_available_volume(&self, pipette_id: &str) -> Result<Option<f64>, StateError> {
        let config = self.get_config(pipette_id)?;
        let tip_volume = self
            .get_attached_tip(pipette_id)
            .map_or(config.max_volume, |t| t.volume.min(config.max_volume));
        Ok(self
            .get_aspirated_volume(pipette_id)?
            .map(|held| (tip_volume - held).max(0.0)))
    }

    /// A pipette is ready to aspirate when its contents are known.
    pub fn get_ready_to_aspirate(&self, pipette_id: &str) -> Result<bool, StateError> {
        Ok(self.get_fluid(pipette_id)?.is_some())
    }

    /// Liquid that leaves the tip when `volume` is ejected; `None` when
    /// contents are unknown.
    pub fn get_liquid_dispensed_by_ejecting_volume(
        &self,
        pipette_id: &str,
        volume: f64,
    ) -> Result<Option<f64>, StateError> {
        Ok(self
            .get_fluid(pipette_id)?
            .map(|f| f.liquid_ejected_by(volume)))
    }

    pub fn get_movement_speed(&self, pipette_id: &str) -> Option<f64> {
        self.state.movement_speed_by_id.get(pipette_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::PipetteName;

    fn loaded(pipette_id: &str, mount: Mount) -> PipetteState {
        let mut update = StateUpdate::new();
        update
            .set_loaded_pipette(pipette_id, PipetteName::P300SingleGen2, mount)
            .update_pipette_config(
                pipette_id,
                PipetteName::P300SingleGen2
                    .definition()
                    .config_for_volume(None),
            );
        reduce(PipetteState::default(), &update)
    }

    fn apply(state: PipetteState, build: impl FnOnce(&mut StateUpdate)) -> PipetteState {
        let mut update = StateUpdate::new();
        build(&mut update);
        reduce(state, &update)
    }

    #[test]
    fn load_registers_pipette_without_tip() {
        let state = loaded("p1", Mount::Left);
        let view = PipetteView::new(&state);
        assert_eq!(view.get_mount("p1").unwrap(), Mount::Left);
        assert!(!view.has_tip("p1"));
        assert_eq!(view.get_active_channels("p1").unwrap(), 1);
        assert!(matches!(
            view.get("nope"),
            Err(StateError::PipetteNotLoaded(_))
        ));
    }

    #[test]
    fn location_set_clear_and_keep() {
        let state = loaded("p1", Mount::Left);
        let point = DeckPoint::new(10.0, 20.0, 30.0);
        let state = apply(state, |u| {
            u.set_pipette_location("p1", LogicalLocation::well("plate", "A1"), point);
        });
        let view = PipetteView::new(&state);
        assert_eq!(
            view.get_current_location().unwrap().location,
            LogicalLocation::well("plate", "A1")
        );
        assert_eq!(view.get_deck_point("p1"), Some(point));

        // Unrelated update keeps the location.
        let state = apply(state, |u| {
            u.set_fluid_empty("p1");
        });
        assert!(PipetteView::new(&state).get_current_location().is_some());

        let state = apply(state, |u| {
            u.set_pipette_deck_point("p1", DeckPoint::ZERO);
        });
        let view = PipetteView::new(&state);
        assert!(view.get_current_location().is_none());
        assert_eq!(view.get_deck_point("p1"), Some(DeckPoint::ZERO));

        let state = apply(state, |u| {
            u.clear_all_pipette_locations();
        });
        assert!(PipetteView::new(&state).get_deck_point("p1").is_none());
    }

    #[test]
    fn only_one_current_location() {
        let mut state = loaded("p1", Mount::Left);
        state = apply(state, |u| {
            u.set_loaded_pipette("p2", PipetteName::P20SingleGen2, Mount::Right);
        });
        state = apply(state, |u| {
            u.set_pipette_location("p1", LogicalLocation::well("plate", "A1"), DeckPoint::ZERO);
        });
        state = apply(state, |u| {
            u.set_pipette_location("p2", LogicalLocation::well("plate", "B1"), DeckPoint::ZERO);
        });
        let view = PipetteView::new(&state);
        assert_eq!(view.get_current_location().unwrap().pipette_id, "p2");
        assert_eq!(view.get_deck_point("p1"), None);
    }

    #[test]
    fn fluid_operations() {
        let state = apply(loaded("p1", Mount::Left), |u| {
            u.set_fluid_empty("p1");
        });
        let state = apply(state, |u| {
            u.set_fluid_aspirated("p1", FluidKind::Liquid, 50.0);
        });
        let state = apply(state, |u| {
            u.set_fluid_aspirated("p1", FluidKind::Liquid, 25.0);
        });
        assert_eq!(
            PipetteView::new(&state).get_aspirated_volume("p1").unwrap(),
            Some(75.0)
        );

        let state = apply(state, |u| {
            u.set_fluid_ejected("p1", 30.0);
        });
        assert_eq!(
            PipetteView::new(&state).get_liquid_volume("p1").unwrap(),
            Some(45.0)
        );

        let state = apply(state, |u| {
            u.set_fluid_unknown("p1");
        });
        let view = PipetteView::new(&state);
        assert_eq!(view.get_aspirated_volume("p1").unwrap(), None);
        assert!(!view.get_ready_to_aspirate("p1").unwrap());
    }

    #[test]
    fn aspirate_onto_unknown_starts_fresh_stack() {
        let state = apply(loaded("p1", Mount::Left), |u| {
            u.set_fluid_aspirated("p1", FluidKind::Liquid, 10.0);
        });
        assert_eq!(
            PipetteView::new(&state).get_aspirated_volume("p1").unwrap(),
            Some(10.0)
        );
    }

    #[test]
    fn dropping_tip_forgets_contents() {
        let tip = TipGeometry {
            length: 50.0,
            diameter: 5.0,
            volume: 300.0,
        };
        let state = apply(loaded("p1", Mount::Left), |u| {
            u.update_pipette_tip_state("p1", Some(tip)).set_fluid_empty("p1");
        });
        let view = PipetteView::new(&state);
        assert!(view.has_tip("p1"));
        assert_eq!(view.get_available_volume("p1").unwrap(), Some(300.0));

        let state = apply(state, |u| {
            u.update_pipette_tip_state("p1", None);
        });
        assert!(
            PipetteView::new(&state)
                .get_fluid("p1")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn movement_speed() {
        let state = apply(loaded("p1", Mount::Left), |u| {
            u.set_pipette_movement_speed("p1", Some(42.0));
        });
        assert_eq!(PipetteView::new(&state).get_movement_speed("p1"), Some(42.0));
        let state = apply(state, |u| {
            u.set_pipette_movement_speed("p1", None);
        });
        assert_eq!(PipetteView::new(&state).get_movement_speed("p1"), None);
    }
}
