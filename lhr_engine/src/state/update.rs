//! The per-command state delta.
//!
//! A command never mutates state. It returns a [`StateUpdate`] describing what
//! changed, and the engine folds that into the store after the command
//! finishes. Every field is a [`FieldUpdate`], so "leave alone" and "forget"
//! are different values.

use std::sync::Arc;

use crate::resources::{LabwareDefinition, PipetteConfig, PipetteName};
use crate::types::{
    DeckPoint, DeckSlot, LabwareLocation, LogicalLocation, ModuleModel, Mount, NozzleMap,
    TipGeometry,
};

/// Three-state field update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    /// No opinion: keep whatever the store holds.
    NoChange,
    /// Reset to the known-empty / unknown state.
    Clear,
    /// Replace with a new value.
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::NoChange
    }
}

impl<T> FieldUpdate<T> {
    #[inline]
    pub const fn is_no_change(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    #[inline]
    pub const fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Fold into an optional slot: `Set` replaces, `Clear` empties.
    pub fn apply_to(&self, slot: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            Self::NoChange => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value.clone()),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

// ─── Pipettes ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PipetteLocationUpdate {
    pub pipette_id: String,
    pub new_location: FieldUpdate<LogicalLocation>,
    pub new_deck_point: FieldUpdate<DeckPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadPipetteUpdate {
    pub pipette_id: String,
    pub pipette_name: PipetteName,
    pub mount: Mount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipetteConfigUpdate {
    pub pipette_id: String,
    pub config: PipetteConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipetteNozzleMapUpdate {
    pub pipette_id: String,
    pub nozzle_map: NozzleMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipetteTipStateUpdate {
    pub pipette_id: String,
    /// `None` means no tip attached.
    pub tip_geometry: Option<TipGeometry>,
}

/// Kind of fluid segment held in a tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FluidKind {
    Liquid,
    Air,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FluidOperation {
    /// Push a segment onto the stack.
    Aspirated { kind: FluidKind, volume: f64 },
    /// Pop `volume` from the top.
    Ejected { volume: f64 },
    /// Contents are known to be empty.
    Empty,
    /// Contents are no longer known.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipetteFluidUpdate {
    pub pipette_id: String,
    pub fluid: FluidOperation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipetteSpeedUpdate {
    pub pipette_id: String,
    pub speed: Option<f64>,
}

// ─── Labware & modules ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLabwareUpdate {
    pub labware_id: String,
    pub definition: Arc<LabwareDefinition>,
    pub location: LabwareLocation,
    pub offset_id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabwareLocationUpdate {
    pub labware_id: String,
    pub new_location: LabwareLocation,
    pub offset_id: Option<String>,
}

/// Calibration offset applied to labware matching a definition and location.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareOffset {
    pub id: String,
    pub definition_uri: String,
    pub location: LabwareLocation,
    pub vector: DeckPoint,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadModuleUpdate {
    pub module_id: String,
    pub model: ModuleModel,
    pub slot: DeckSlot,
    pub semi_configuration: bool,
}

// ─── Tips & liquid ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TipsUsedUpdate {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TipsResetUpdate {
    pub labware_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidOperatedUpdate {
    pub labware_id: String,
    pub well_names: Vec<String>,
    /// Net volume added to each well; `Clear` marks the wells unknown.
    pub volume_added: FieldUpdate<f64>,
}

/// Everything one command changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateUpdate {
    /// `Clear` clears every pipette's location.
    pub pipette_location: FieldUpdate<PipetteLocationUpdate>,
    pub loaded_pipette: FieldUpdate<LoadPipetteUpdate>,
    pub pipette_config: FieldUpdate<PipetteConfigUpdate>,
    pub pipette_nozzle_map: FieldUpdate<PipetteNozzleMapUpdate>,
    pub pipette_tip_state: FieldUpdate<PipetteTipStateUpdate>,
    pub pipette_fluid: FieldUpdate<PipetteFluidUpdate>,
    pub pipette_movement_speed: FieldUpdate<PipetteSpeedUpdate>,
    pub loaded_labware: FieldUpdate<LoadedLabwareUpdate>,
    pub labware_location: FieldUpdate<LabwareLocationUpdate>,
    pub labware_offset: FieldUpdate<LabwareOffset>,
    pub labware_definition: FieldUpdate<Arc<LabwareDefinition>>,
    pub loaded_module: FieldUpdate<LoadModuleUpdate>,
    pub addressable_area_used: FieldUpdate<String>,
    pub tips_used: FieldUpdate<TipsUsedUpdate>,
    pub tips_reset: FieldUpdate<TipsResetUpdate>,
    pub liquid_operated: FieldUpdate<LiquidOperatedUpdate>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field carries an opinion.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // ─── Pipette location ───────────────────────────────────────────

    pub fn set_pipette_location(
        &mut self,
        pipette_id: impl Into<String>,
        location: LogicalLocation,
        deck_point: DeckPoint,
    ) -> &mut Self {
        self.pipette_location = FieldUpdate::Set(PipetteLocationUpdate {
            pipette_id: pipette_id.into(),
            new_location: FieldUpdate::Set(location),
            new_deck_point: FieldUpdate::Set(deck_point),
        });
        self
    }

    /// Pipette is at `deck_point` but not in any logical location.
    pub fn set_pipette_deck_point(
        &mut self,
        pipette_id: impl Into<String>,
        deck_point: DeckPoint,
    ) -> &mut Self {
        self.pipette_location = FieldUpdate::Set(PipetteLocationUpdate {
            pipette_id: pipette_id.into(),
            new_location: FieldUpdate::Clear,
            new_deck_point: FieldUpdate::Set(deck_point),
        });
        self
    }

    pub fn clear_all_pipette_locations(&mut self) -> &mut Self {
        self.pipette_location = FieldUpdate::Clear;
        self
    }

    // ─── Pipette lifecycle & config ─────────────────────────────────

    pub fn set_loaded_pipette(
        &mut self,
        pipette_id: impl Into<String>,
        pipette_name: PipetteName,
        mount: Mount,
    ) -> &mut Self {
        self.loaded_pipette = FieldUpdate::Set(LoadPipetteUpdate {
            pipette_id: pipette_id.into(),
            pipette_name,
            mount,
        });
        self
    }

    pub fn update_pipette_config(
        &mut self,
        pipette_id: impl Into<String>,
        config: PipetteConfig,
    ) -> &mut Self {
        self.pipette_config = FieldUpdate::Set(PipetteConfigUpdate {
            pipette_id: pipette_id.into(),
            config,
        });
        self
    }

    pub fn update_pipette_nozzle_map(
        &mut self,
        pipette_id: impl Into<String>,
        nozzle_map: NozzleMap,
    ) -> &mut Self {
        self.pipette_nozzle_map = FieldUpdate::Set(PipetteNozzleMapUpdate {
            pipette_id: pipette_id.into(),
            nozzle_map,
        });
        self
    }

    pub fn update_pipette_tip_state(
        &mut self,
        pipette_id: impl Into<String>,
        tip_geometry: Option<TipGeometry>,
    ) -> &mut Self {
        self.pipette_tip_state = FieldUpdate::Set(PipetteTipStateUpdate {
            pipette_id: pipette_id.into(),
            tip_geometry,
        });
        self
    }

    pub fn set_pipette_movement_speed(
        &mut self,
        pipette_id: impl Into<String>,
        speed: Option<f64>,
    ) -> &mut Self {
        self.pipette_movement_speed = FieldUpdate::Set(PipetteSpeedUpdate {
            pipette_id: pipette_id.into(),
            speed,
        });
        self
    }

    // ─── Fluid ──────────────────────────────────────────────────────

    fn set_fluid(&mut self, pipette_id: impl Into<String>, fluid: FluidOperation) -> &mut Self {
        self.pipette_fluid = FieldUpdate::Set(PipetteFluidUpdate {
            pipette_id: pipette_id.into(),
            fluid,
        });
        self
    }

    pub fn set_fluid_aspirated(
        &mut self,
        pipette_id: impl Into<String>,
        kind: FluidKind,
        volume: f64,
    ) -> &mut Self {
        self.set_fluid(pipette_id, FluidOperation::Aspirated { kind, volume })
    }

    pub fn set_fluid_ejected(&mut self, pipette_id: impl Into<String>, volume: f64) -> &mut Self {
        self.set_fluid(pipette_id, FluidOperation::Ejected { volume })
    }

    pub fn set_fluid_empty(&mut self, pipette_id: impl Into<String>) -> &mut Self {
        self.set_fluid(pipette_id, FluidOperation::Empty)
    }

    pub fn set_fluid_unknown(&mut self, pipette_id: impl Into<String>) -> &mut Self {
        self.set_fluid(pipette_id, FluidOperation::Unknown)
    }

    // ─── Labware, modules, areas ────────────────────────────────────

    pub fn set_loaded_labware(&mut self, update: LoadedLabwareUpdate) -> &mut Self {
        self.loaded_labware = FieldUpdate::Set(update);
        self
    }

    pub fn set_labware_location(
        &mut self,
        labware_id: impl Into<String>,
        new_location: LabwareLocation,
        offset_id: Option<String>,
    ) -> &mut Self {
        self.labware_location = FieldUpdate::Set(LabwareLocationUpdate {
            labware_id: labware_id.into(),
            new_location,
            offset_id,
        });
        self
    }

    pub fn add_labware_offset(&mut self, offset: LabwareOffset) -> &mut Self {
        self.labware_offset = FieldUpdate::Set(offset);
        self
    }

    pub fn add_labware_definition(&mut self, definition: Arc<LabwareDefinition>) -> &mut Self {
        self.labware_definition = FieldUpdate::Set(definition);
        self
    }

    pub fn set_loaded_module(&mut self, update: LoadModuleUpdate) -> &mut Self {
        self.loaded_module = FieldUpdate::Set(update);
        self
    }

    pub fn mark_addressable_area_used(&mut self, area_name: impl Into<String>) -> &mut Self {
        self.addressable_area_used = FieldUpdate::Set(area_name.into());
        self
    }

    // ─── Tips ───────────────────────────────────────────────────────

    pub fn mark_tips_used(
        &mut self,
        pipette_id: impl Into<String>,
        labware_id: impl Into<String>,
        well_name: impl Into<String>,
    ) -> &mut Self {
        self.tips_used = FieldUpdate::Set(TipsUsedUpdate {
            pipette_id: pipette_id.into(),
            labware_id: labware_id.into(),
            well_name: well_name.into(),
        });
        self
    }

    pub fn reset_tips(&mut self, labware_id: impl Into<String>) -> &mut Self {
        self.tips_reset = FieldUpdate::Set(TipsResetUpdate {
            labware_id: labware_id.into(),
        });
        self
    }

    // ─── Well liquid ────────────────────────────────────────────────

    pub fn set_liquid_operated(
        &mut self,
        labware_id: impl Into<String>,
        well_names: Vec<String>,
        volume_added: Option<f64>,
    ) -> &mut Self {
        self.liquid_operated = FieldUpdate::Set(LiquidOperatedUpdate {
            labware_id: labware_id.into(),
            well_names,
            volume_added: volume_added.into(),
        });
        self
    }
}
