//! Gantry motion.

use tracing::debug;

use super::CommandContext;
use crate::error::CommandError;
use crate::types::{DeckPoint, MotorAxis, Mount, WellLocation, WellOffset};

/// Move a pipette to a location inside a well. Returns the realised
/// position.
pub async fn move_to_well(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    labware_id: &str,
    well_name: &str,
    location: &WellLocation,
    speed: Option<f64>,
) -> Result<DeckPoint, CommandError> {
    let target = ctx
        .state
        .geometry()
        .get_well_position(labware_id, well_name, location)?;
    move_pipette(ctx, pipette_id, target, speed).await
}

pub async fn move_to_coordinates(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    target: DeckPoint,
    speed: Option<f64>,
) -> Result<DeckPoint, CommandError> {
    move_pipette(ctx, pipette_id, target, speed).await
}

/// Move to an addressable area's reference point plus `offset`.
pub async fn move_to_addressable_area(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    area_name: &str,
    offset: WellOffset,
    speed: Option<f64>,
) -> Result<DeckPoint, CommandError> {
    let base = ctx
        .state
        .geometry()
        .get_addressable_area_position(area_name)?;
    let target = base + DeckPoint::new(offset.x, offset.y, offset.z);
    move_pipette(ctx, pipette_id, target, speed).await
}

/// Reject a movement speed that is not a positive number.
pub fn validate_speed(speed: Option<f64>) -> Result<(), CommandError> {
    match speed {
        Some(speed) if !(speed.is_finite() && speed > 0.0) => Err(CommandError::InvalidParams(
            format!("speed must be a positive number of mm/s, got {speed}"),
        )),
        _ => Ok(()),
    }
}

async fn move_pipette(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    target: DeckPoint,
    speed: Option<f64>,
) -> Result<DeckPoint, CommandError> {
    let mount = ctx.mount(pipette_id)?;
    let speed = speed.or_else(|| ctx.state.pipettes().get_movement_speed(pipette_id));
    validate_speed(speed)?;
    debug!(pipette_id, %mount, %target, ?speed, "moving pipette");
    Ok(ctx.hardware.move_to(mount, target, speed).await?)
}

/// Current position of a pipette's critical point.
pub async fn current_position(
    ctx: &CommandContext<'_>,
    pipette_id: &str,
) -> Result<DeckPoint, CommandError> {
    let mount = ctx.mount(pipette_id)?;
    Ok(ctx.hardware.gantry_position(mount).await?)
}

pub async fn home(
    ctx: &mut CommandContext<'_>,
    axes: Option<&[MotorAxis]>,
) -> Result<(), CommandError> {
    debug!(?axes, "homing");
    Ok(ctx.hardware.home(axes).await?)
}

#[inline]
pub fn is_position_ok(ctx: &CommandContext<'_>, mount: Mount) -> bool {
    ctx.hardware.is_position_ok(mount)
}
