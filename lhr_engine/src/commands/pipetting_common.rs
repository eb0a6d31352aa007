//! Liquid bookkeeping and overpressure handling shared by the pipetting
//! commands.

use lhr_common::hardware::HardwareError;
use tracing::warn;

use super::CommandContext;
use crate::error::{CommandError, DefinedError};
use crate::state::{FluidKind, StateUpdate};
use crate::types::{DeckPoint, LogicalLocation};

/// Wells a pipette is operating on, resolved before any hardware action.
#[derive(Debug, Clone)]
pub(super) struct LiquidTarget {
    pub labware_id: String,
    pub wells: Vec<String>,
    pub nozzles_per_well: u32,
}

impl LiquidTarget {
    pub fn resolve(
        ctx: &CommandContext<'_>,
        pipette_id: &str,
        labware_id: &str,
        well_name: &str,
    ) -> Result<Self, CommandError> {
        let nozzle_map = ctx.state.pipettes().get_nozzle_map(pipette_id)?;
        let geometry = ctx.state.geometry();
        Ok(Self {
            labware_id: labware_id.to_string(),
            wells: geometry.get_covered_wells(labware_id, well_name, nozzle_map)?,
            nozzles_per_well: geometry.get_nozzles_per_well(labware_id, nozzle_map)?,
        })
    }

    /// The well this pipette last moved to, if its last move was into a
    /// well.
    pub fn current(ctx: &CommandContext<'_>, pipette_id: &str) -> Result<Option<Self>, CommandError> {
        match ctx.state.pipettes().get_current_location() {
            Some(current) if current.pipette_id == pipette_id => match &current.location {
                LogicalLocation::Well {
                    labware_id,
                    well_name,
                } => Self::resolve(ctx, pipette_id, labware_id, well_name).map(Some),
                LogicalLocation::AddressableArea { .. } => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn record(&self, update: &mut StateUpdate, volume_added: Option<f64>) {
        update.set_liquid_operated(
            self.labware_id.clone(),
            self.wells.clone(),
            volume_added.map(|v| v * f64::from(self.nozzles_per_well)),
        );
    }
}

pub(super) fn record_aspirate(
    update: &mut StateUpdate,
    pipette_id: &str,
    target: Option<&LiquidTarget>,
    volume: f64,
) {
    if let Some(target) = target {
        target.record(update, Some(-volume));
    }
    update.set_fluid_aspirated(pipette_id, FluidKind::Liquid, volume);
}

/// Fluid leaving the tip; only its liquid part reaches the well.
pub(super) fn record_dispense(
    ctx: &CommandContext<'_>,
    update: &mut StateUpdate,
    pipette_id: &str,
    target: Option<&LiquidTarget>,
    volume: f64,
) -> Result<(), CommandError> {
    if let Some(target) = target {
        let liquid = ctx
            .state
            .pipettes()
            .get_liquid_dispensed_by_ejecting_volume(pipette_id, volume)?;
        target.record(update, liquid);
    }
    update.set_fluid_ejected(pipette_id, volume);
    Ok(())
}

/// Hardware cause when `error` is a plunger overpressure.
pub(super) fn as_overpressure(error: &CommandError) -> Option<&HardwareError> {
    match error {
        CommandError::Hardware(cause) if cause.is_overpressure() => Some(cause),
        _ => None,
    }
}

/// Build the defined error for an overpressure. Pipette contents become
/// unknown, as does the liquid in `target`.
pub(super) fn overpressure(
    ctx: &CommandContext<'_>,
    mut update: StateUpdate,
    pipette_id: &str,
    target: Option<&LiquidTarget>,
    cause: &HardwareError,
    retry_location: DeckPoint,
) -> (DefinedError, StateUpdate) {
    warn!(pipette_id, %retry_location, error = %cause, "overpressure");
    if let Some(target) = target {
        target.record(&mut update, None);
    }
    update.set_fluid_unknown(pipette_id);
    (
        DefinedError::overpressure(ctx.model_utils, cause, retry_location),
        update,
    )
}
