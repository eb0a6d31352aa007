//! Labware slice: loaded labware, definitions and calibration offsets.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::update::{FieldUpdate, LabwareOffset, StateUpdate};
use crate::error::StateError;
use crate::resources::LabwareDefinition;
use crate::types::{DeckPoint, DeckSlot, LabwareLocation};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLabware {
    pub id: String,
    pub load_name: String,
    pub definition_uri: String,
    pub location: LabwareLocation,
    pub offset_id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabwareState {
    pub labware_by_id: BTreeMap<String, LoadedLabware>,
    pub definitions_by_uri: BTreeMap<String, Arc<LabwareDefinition>>,
    pub offsets_by_id: BTreeMap<String, LabwareOffset>,
}

pub fn reduce(mut state: LabwareState, update: &StateUpdate) -> LabwareState {
    if let FieldUpdate::Set(definition) = &update.labware_definition {
        state
            .definitions_by_uri
            .insert(definition.uri(), Arc::clone(definition));
    }

    if let FieldUpdate::Set(offset) = &update.labware_offset {
        state.offsets_by_id.insert(offset.id.clone(), offset.clone());
    }

    if let FieldUpdate::Set(loaded) = &update.loaded_labware {
        let uri = loaded.definition.uri();
        state
            .definitions_by_uri
            .entry(uri.clone())
            .or_insert_with(|| Arc::clone(&loaded.definition));
        state.labware_by_id.insert(
            loaded.labware_id.clone(),
            LoadedLabware {
                id: loaded.labware_id.clone(),
                load_name: loaded.definition.load_name.clone(),
                definition_uri: uri,
                location: loaded.location.clone(),
                offset_id: loaded.offset_id.clone(),
                display_name: loaded.display_name.clone(),
            },
        );
    }

    if let FieldUpdate::Set(moved) = &update.labware_location {
        if let Some(labware) = state.labware_by_id.get_mut(&moved.labware_id) {
            labware.location = moved.new_location.clone();
            labware.offset_id = moved.offset_id.clone();
        }
    }

    state
}

#[derive(Debug, Clone, Copy)]
pub struct LabwareView<'a> {
    state: &'a LabwareState,
}

impl<'a> LabwareView<'a> {
    pub fn new(state: &'a LabwareState) -> Self {
        Self { state }
    }

    pub fn get(&self, labware_id: &str) -> Result<&'a LoadedLabware, StateError> {
        self.state
            .labware_by_id
            .get(labware_id)
            .ok_or_else(|| StateError::LabwareNotLoaded(labware_id.to_string()))
    }

    pub fn get_all(&self) -> impl Iterator<Item = &'a LoadedLabware> + 'a {
        self.state.labware_by_id.values()
    }

    pub fn get_definition(&self, labware_id: &str) -> Result<&'a LabwareDefinition, StateError> {
        let labware = self.get(labware_id)?;
        self.get_definition_by_uri(&labware.definition_uri)
    }

    pub fn get_definition_by_uri(&self, uri: &str) -> Result<&'a LabwareDefinition, StateError> {
        self.state
            .definitions_by_uri
            .get(uri)
            .map(Arc::as_ref)
            .ok_or_else(|| StateError::LabwareDefinitionNotFound(uri.to_string()))
    }

    /// A definition registered by URI, or a built-in load name.
    pub fn find_definition(
        &self,
        load_name: &str,
        namespace: &str,
        version: u32,
    ) -> Option<Arc<LabwareDefinition>> {
        let uri = format!("{namespace}/{load_name}/{version}");
        self.state
            .definitions_by_uri
            .get(&uri)
            .cloned()
            .or_else(|| LabwareDefinition::builtin(load_name).map(Arc::new))
            .filter(|def| def.uri() == uri)
    }

    pub fn get_location(&self, labware_id: &str) -> Result<&'a LabwareLocation, StateError> {
        self.get(labware_id).map(|l| &l.location)
    }

    pub fn get_load_name(&self, labware_id: &str) -> Result<&'a str, StateError> {
        self.get(labware_id).map(|l| l.load_name.as_str())
    }

    pub fn is_tip_rack(&self, labware_id: &str) -> Result<bool, StateError> {
        self.get_definition(labware_id).map(|d| d.is_tiprack)
    }

    pub fn is_fixed_trash(&self, labware_id: &str) -> Result<bool, StateError> {
        self.get_definition(labware_id).map(|d| d.is_fixed_trash)
    }

    /// Labware seated directly on a module.
    pub fn get_id_by_module(&self, module_id: &str) -> Option<&'a str> {
        self.state.labware_by_id.values().find_map(|l| match &l.location {
            LabwareLocation::Module { module_id: m } if m == module_id => Some(l.id.as_str()),
            _ => None,
        })
    }

    /// Labware stacked directly on another labware.
    pub fn get_id_by_labware(&self, labware_id: &str) -> Option<&'a str> {
        self.state.labware_by_id.values().find_map(|l| match &l.location {
            LabwareLocation::OnLabware { labware_id: p } if p == labware_id => Some(l.id.as_str()),
            _ => None,
        })
    }

    /// Labware sitting directly in a deck slot.
    pub fn get_by_slot(&self, slot: DeckSlot) -> Option<&'a LoadedLabware> {
        self.state.labware_by_id.values().find(|l| {
            matches!(l.location, LabwareLocation::Slot { slot_name } if slot_name == slot)
        })
    }

    pub fn get_offset(&self, offset_id: &str) -> Option<&'a LabwareOffset> {
        self.state.offsets_by_id.get(offset_id)
    }

    /// Most recent offset registered for this definition and location.
    pub fn find_applicable_offset(
        &self,
        definition_uri: &str,
        location: &LabwareLocation,
    ) -> Option<&'a LabwareOffset> {
        self.state
            .offsets_by_id
            .values()
            .filter(|o| o.definition_uri == definition_uri && &o.location == location)
            .max_by_key(|o| o.created_at)
    }

    /// Offset vector applied to a loaded labware.
    pub fn get_offset_vector(&self, labware_id: &str) -> Result<DeckPoint, StateError> {
        let labware = self.get(labware_id)?;
        Ok(labware
            .offset_id
            .as_deref()
            .and_then(|id| self.get_offset(id))
            .map_or(DeckPoint::ZERO, |o| o.vector))
    }
}
