//! Loading pipettes, labware and modules.

use std::sync::Arc;

use tracing::{debug, info};

use super::CommandContext;
use crate::deck_conflict;
use crate::error::{CommandError, StateError};
use crate::resources::{LabwareDefinition, PipetteConfig, PipetteName};
use crate::types::{DeckSlot, LabwareLocation, ModuleKind, ModuleModel, Mount};

/// Slot every thermocycler occupies (OT-2 7, Flex B1).
pub const THERMOCYCLER_SLOT: u8 = 7;

#[derive(Debug, Clone)]
pub struct LoadedPipetteData {
    pub pipette_id: String,
    pub config: PipetteConfig,
}

#[derive(Debug, Clone)]
pub struct LoadedLabwareData {
    pub labware_id: String,
    pub definition: Arc<LabwareDefinition>,
    pub offset_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReloadedLabwareData {
    pub location: LabwareLocation,
    pub offset_id: Option<String>,
}

pub async fn load_pipette(
    ctx: &mut CommandContext<'_>,
    pipette_name: PipetteName,
    mount: Mount,
    pipette_id: Option<String>,
) -> Result<LoadedPipetteData, CommandError> {
    let definition = pipette_name.definition();
    let robot_type = ctx.config.robot_type();
    if definition.robot_type != robot_type {
        return Err(CommandError::InvalidSpecificationForRobotType {
            name: definition.model.to_string(),
            robot_type,
        });
    }

    ctx.hardware.cache_instrument(mount, definition.model).await?;
    let pipette_id = pipette_id.unwrap_or_else(|| ctx.model_utils.generate_id());
    info!(%pipette_id, model = definition.model, %mount, "pipette loaded");
    Ok(LoadedPipetteData {
        pipette_id,
        config: definition.config_for_volume(None),
    })
}

/// Switch a pipette's liquid class. The active nozzle layout is kept.
pub async fn configure_for_volume(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    volume: f64,
) -> Result<PipetteConfig, CommandError> {
    let pipette = ctx.state.pipettes().get(pipette_id)?;
    let definition = pipette.pipette_name.definition();
    if !volume.is_finite() || volume < 0.0 || volume > definition.default_class.max_volume {
        return Err(CommandError::InvalidParams(format!(
            "volume {volume} is outside 0..={} for {}",
            definition.default_class.max_volume, definition.model
        )));
    }

    ctx.hardware
        .configure_for_volume(pipette.mount, volume)
        .await?;
    let mut config = definition.config_for_volume(Some(volume));
    config.nozzle_map = ctx.state.pipettes().get_nozzle_map(pipette_id)?;
    debug!(pipette_id, liquid_class = %config.liquid_class, "pipette configured for volume");
    Ok(config)
}

fn validate_labware_location(
    ctx: &CommandContext<'_>,
    location: &LabwareLocation,
) -> Result<(), CommandError> {
    match location {
        LabwareLocation::Module { module_id } => {
            ctx.state.modules().get(module_id)?;
        }
        LabwareLocation::OnLabware { labware_id } => {
            ctx.state.labware().get(labware_id)?;
        }
        LabwareLocation::Slot { .. } | LabwareLocation::OffDeck => {}
    }
    Ok(())
}

/// Resolve a labware definition and check its placement.
pub fn load_labware(
    ctx: &CommandContext<'_>,
    load_name: &str,
    namespace: &str,
    version: u32,
    location: &LabwareLocation,
    labware_id: Option<String>,
) -> Result<LoadedLabwareData, CommandError> {
    let definition = ctx
        .state
        .labware()
        .find_definition(load_name, namespace, version)
        .ok_or_else(|| {
            StateError::LabwareDefinitionNotFound(format!("{namespace}/{load_name}/{version}"))
        })?;
    validate_labware_location(ctx, location)?;
    deck_conflict::check_labware_candidate(ctx.state, None, &definition, location)?;

    let offset_id = ctx
        .state
        .labware()
        .find_applicable_offset(&definition.uri(), location)
        .map(|o| o.id.clone());
    let labware_id = labware_id.unwrap_or_else(|| ctx.model_utils.generate_id());
    info!(%labware_id, uri = %definition.uri(), ?location, "labware loaded");
    Ok(LoadedLabwareData {
        labware_id,
        definition,
        offset_id,
    })
}

/// Re-resolve the calibration offset of labware already on the deck.
pub fn reload_labware(
    ctx: &CommandContext<'_>,
    labware_id: &str,
) -> Result<ReloadedLabwareData, CommandError> {
    let labware = ctx.state.labware().get(labware_id)?;
    let definition = ctx.state.labware().get_definition(labware_id)?;
    deck_conflict::check_labware_candidate(
        ctx.state,
        Some(labware_id),
        definition,
        &labware.location,
    )?;
    let offset_id = ctx
        .state
        .labware()
        .find_applicable_offset(&labware.definition_uri, &labware.location)
        .map(|o| o.id.clone());
    debug!(labware_id, ?offset_id, "labware reloaded");
    Ok(ReloadedLabwareData {
        location: labware.location.clone(),
        offset_id,
    })
}

pub fn load_module(
    ctx: &CommandContext<'_>,
    model: ModuleModel,
    slot: DeckSlot,
    module_id: Option<String>,
) -> Result<String, CommandError> {
    let robot_type = ctx.config.robot_type();
    if !model.is_compatible_with(robot_type) {
        return Err(CommandError::InvalidSpecificationForRobotType {
            name: model.as_str().to_string(),
            robot_type,
        });
    }
    if model.kind() == ModuleKind::Thermocycler && slot.number() != THERMOCYCLER_SLOT {
        return Err(CommandError::InvalidParams(format!(
            "a thermocycler can only be loaded in slot {}",
            DeckSlot::new(THERMOCYCLER_SLOT)
                .map_or_else(String::new, |s| s.display_for(robot_type))
        )));
    }
    deck_conflict::check_module_candidate(ctx.state, model, slot, false)?;

    let module_id = module_id.unwrap_or_else(|| ctx.model_utils.generate_id());
    info!(%module_id, %model, slot = %slot.display_for(robot_type), "module loaded");
    Ok(module_id)
}
