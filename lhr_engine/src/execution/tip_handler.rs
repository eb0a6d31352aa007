//! Tip pick-up, drop and presence checks.

use tracing::{debug, warn};

use super::CommandContext;
use crate::error::CommandError;
use crate::types::TipGeometry;

/// Tip geometry a pick-up from `labware_id` would attach.
pub fn tip_geometry_for(
    ctx: &CommandContext<'_>,
    labware_id: &str,
) -> Result<TipGeometry, CommandError> {
    ctx.state
        .labware()
        .get_definition(labware_id)?
        .tip_geometry()
        .ok_or_else(|| CommandError::LabwareIsNotTipRack(labware_id.to_string()))
}

pub async fn pick_up_tip(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    tip: TipGeometry,
) -> Result<(), CommandError> {
    let mount = ctx.mount(pipette_id)?;
    debug!(pipette_id, tip_length = tip.length, "picking up tip");
    Ok(ctx.hardware.pick_up_tip(mount, tip.length).await?)
}

pub async fn drop_tip(ctx: &mut CommandContext<'_>, pipette_id: &str) -> Result<(), CommandError> {
    let mount = ctx.mount(pipette_id)?;
    debug!(pipette_id, "dropping tip");
    Ok(ctx.hardware.drop_tip(mount).await?)
}

/// Whether the tip sensor agrees with `expected`. Mounts without a sensor
/// always agree.
pub async fn verify_tip_presence(
    ctx: &CommandContext<'_>,
    pipette_id: &str,
    expected: bool,
) -> Result<bool, CommandError> {
    let mount = ctx.mount(pipette_id)?;
    match ctx.hardware.tip_present(mount).await? {
        Some(present) if present != expected => {
            warn!(pipette_id, expected, present, "tip sensor disagrees");
            Ok(false)
        }
        _ => Ok(true),
    }
}
