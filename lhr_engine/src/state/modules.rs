//! Module slice: hardware modules placed on the deck.

use std::collections::BTreeMap;

use super::update::{FieldUpdate, StateUpdate};
use crate::error::StateError;
use crate::types::{DeckSlot, ModuleModel};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModule {
    pub id: String,
    pub model: ModuleModel,
    pub slot: DeckSlot,
    /// Thermocycler loaded in its semi (two-slot) configuration.
    pub semi_configuration: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleState {
    pub modules_by_id: BTreeMap<String, LoadedModule>,
}

pub fn reduce(mut state: ModuleState, update: &StateUpdate) -> ModuleState {
    if let FieldUpdate::Set(loaded) = &update.loaded_module {
        state.modules_by_id.insert(
            loaded.module_id.clone(),
            LoadedModule {
                id: loaded.module_id.clone(),
                model: loaded.model,
                slot: loaded.slot,
                semi_configuration: loaded.semi_configuration,
            },
        );
    }
    state
}

#[derive(Debug, Clone, Copy)]
pub struct ModuleView<'a> {
    state: &'a ModuleState,
}

impl<'a> ModuleView<'a> {
    pub fn new(state: &'a ModuleState) -> Self {
        Self { state }
    }

    pub fn get(&self, module_id: &str) -> Result<&'a LoadedModule, StateError> {
        self.state
            .modules_by_id
            .get(module_id)
            .ok_or_else(|| StateError::ModuleNotLoaded(module_id.to_string()))
    }

    pub fn get_all(&self) -> impl Iterator<Item = &'a LoadedModule> + 'a {
        self.state.modules_by_id.values()
    }

    pub fn get_location(&self, module_id: &str) -> Result<DeckSlot, StateError> {
        self.get(module_id).map(|m| m.slot)
    }

    pub fn get_overall_height(&self, module_id: &str) -> Result<f64, StateError> {
        self.get(module_id).map(|m| m.model.overall_height())
    }

    pub fn get_by_slot(&self, slot: DeckSlot) -> Option<&'a LoadedModule> {
        self.state.modules_by_id.values().find(|m| m.slot == slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::update::LoadModuleUpdate;

    #[test]
    fn load_module() {
        let mut update = StateUpdate::new();
        update.set_loaded_module(LoadModuleUpdate {
            module_id: "hs".to_string(),
            model: ModuleModel::HeaterShakerModuleV1,
            slot: DeckSlot::new(1).unwrap(),
            semi_configuration: false,
        });
        let state = reduce(ModuleState::default(), &update);
        let view = ModuleView::new(&state);

        assert_eq!(view.get_location("hs").unwrap().number(), 1);
        assert_eq!(view.get_overall_height("hs").unwrap(), 82.0);
        assert_eq!(view.get_by_slot(DeckSlot::new(1).unwrap()).unwrap().id, "hs");
        assert!(view.get_by_slot(DeckSlot::new(2).unwrap()).is_none());
        assert!(matches!(view.get("tc"), Err(StateError::ModuleNotLoaded(_))));
    }
}
