//! Plunger operations and the checks that guard them.

use lhr_common::consts::VOLUME_EPSILON;
use tracing::debug;

use super::CommandContext;
use crate::error::CommandError;
use crate::state::StateView;
use crate::types::TipGeometry;

pub fn validate_tip_attached(
    state: &StateView,
    pipette_id: &str,
) -> Result<TipGeometry, CommandError> {
    state.pipettes().get(pipette_id)?;
    state
        .pipettes()
        .get_attached_tip(pipette_id)
        .ok_or_else(|| CommandError::TipNotAttached(pipette_id.to_string()))
}

pub fn is_ready_to_aspirate(state: &StateView, pipette_id: &str) -> Result<bool, CommandError> {
    Ok(state.pipettes().get_ready_to_aspirate(pipette_id)?)
}

fn validate_volume(volume: f64) -> Result<(), CommandError> {
    if volume.is_finite() && volume >= 0.0 {
        Ok(())
    } else {
        Err(CommandError::InvalidParams(format!(
            "volume must be a non-negative number, got {volume}"
        )))
    }
}

/// Reject a caller-supplied flow rate that is not a positive number.
pub fn validate_flow_rate(flow_rate: Option<f64>) -> Result<(), CommandError> {
    match flow_rate {
        Some(rate) if !(rate.is_finite() && rate > 0.0) => Err(CommandError::InvalidParams(
            format!("flow rate must be a positive number of µL/s, got {rate}"),
        )),
        _ => Ok(()),
    }
}

/// Volume the tip can hold with the current liquid class.
fn capacity(state: &StateView, pipette_id: &str) -> Result<f64, CommandError> {
    let tip = validate_tip_attached(state, pipette_id)?;
    let config = state.pipettes().get_config(pipette_id)?;
    Ok(tip.volume.min(config.max_volume))
}

/// Reject an aspirate larger than the room left in the tip. Unknown
/// contents are checked against an empty tip, since the plunger is reset
/// before such an aspirate.
pub fn validate_aspirate_volume(
    state: &StateView,
    pipette_id: &str,
    volume: f64,
) -> Result<(), CommandError> {
    validate_volume(volume)?;
    let available = match state.pipettes().get_available_volume(pipette_id)? {
        Some(available) => available,
        None => capacity(state, pipette_id)?,
    };
    if volume > available + VOLUME_EPSILON {
        return Err(CommandError::InvalidAspirateVolume {
            requested: volume,
            available,
        });
    }
    Ok(())
}

pub fn validate_dispense_volume(
    state: &StateView,
    pipette_id: &str,
    volume: f64,
) -> Result<(), CommandError> {
    validate_volume(volume)?;
    if let Some(held) = state.pipettes().get_aspirated_volume(pipette_id)? {
        if volume > held + VOLUME_EPSILON {
            return Err(CommandError::InvalidDispenseVolume {
                requested: volume,
                held,
            });
        }
    }
    Ok(())
}

/// Apply the legacy zero-volume rule: before API 2.16 a requested volume of
/// zero means the whole available volume.
pub fn resolve_aspirate_volume(
    ctx: &CommandContext<'_>,
    pipette_id: &str,
    requested: f64,
) -> Result<f64, CommandError> {
    if requested != 0.0 || !ctx.config.zero_means_full_volume() {
        return Ok(requested);
    }
    ctx.state
        .pipettes()
        .get_available_volume(pipette_id)?
        .ok_or_else(|| CommandError::UnknownPipetteVolume(pipette_id.to_string()))
}

/// Dispense counterpart of [`resolve_aspirate_volume`]: zero means
/// everything held.
pub fn resolve_dispense_volume(
    ctx: &CommandContext<'_>,
    pipette_id: &str,
    requested: f64,
) -> Result<f64, CommandError> {
    if requested != 0.0 || !ctx.config.zero_means_full_volume() {
        return Ok(requested);
    }
    ctx.state
        .pipettes()
        .get_aspirated_volume(pipette_id)?
        .ok_or_else(|| CommandError::UnknownPipetteVolume(pipette_id.to_string()))
}

pub async fn prepare_for_aspirate(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
) -> Result<(), CommandError> {
    let mount = ctx.mount(pipette_id)?;
    debug!(pipette_id, "preparing plunger for aspirate");
    Ok(ctx.hardware.prepare_for_aspirate(mount).await?)
}

/// Aspirate at the current position. Returns the volume the plunger
/// actually drew.
pub async fn aspirate_in_place(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    volume: f64,
    flow_rate: Option<f64>,
) -> Result<f64, CommandError> {
    validate_flow_rate(flow_rate)?;
    validate_aspirate_volume(ctx.state, pipette_id, volume)?;
    let mount = ctx.mount(pipette_id)?;
    let flow_rate = match flow_rate {
        Some(rate) => rate,
        None => ctx.state.pipettes().get_flow_rates(pipette_id)?.aspirate,
    };
    debug!(pipette_id, volume, flow_rate, "aspirating");
    Ok(ctx.hardware.aspirate(mount, volume, flow_rate).await?)
}

pub async fn dispense_in_place(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    volume: f64,
    flow_rate: Option<f64>,
    push_out: Option<f64>,
) -> Result<f64, CommandError> {
    validate_flow_rate(flow_rate)?;
    validate_tip_attached(ctx.state, pipette_id)?;
    validate_dispense_volume(ctx.state, pipette_id, volume)?;
    let mount = ctx.mount(pipette_id)?;
    let flow_rate = match flow_rate {
        Some(rate) => rate,
        None => ctx.state.pipettes().get_flow_rates(pipette_id)?.dispense,
    };
    debug!(pipette_id, volume, flow_rate, ?push_out, "dispensing");
    Ok(ctx
        .hardware
        .dispense(mount, volume, flow_rate, push_out)
        .await?)
}

pub async fn blow_out_in_place(
    ctx: &mut CommandContext<'_>,
    pipette_id: &str,
    flow_rate: Option<f64>,
) -> Result<(), CommandError> {
    validate_flow_rate(flow_rate)?;
    validate_tip_attached(ctx.state, pipette_id)?;
    let mount = ctx.mount(pipette_id)?;
    let flow_rate = match flow_rate {
        Some(rate) => rate,
        None => ctx.state.pipettes().get_flow_rates(pipette_id)?.blow_out,
    };
    debug!(pipette_id, flow_rate, "blowing out");
    Ok(ctx.hardware.blow_out(mount, flow_rate).await?)
}
