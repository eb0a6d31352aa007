//! `aspirate`: move into a well and draw liquid.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{LiquidTarget, as_overpressure, overpressure, record_aspirate};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;
use crate::types::{DeckPoint, LogicalLocation, WellLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspirateParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default = "WellLocation::liquid_handling_default")]
    pub well_location: WellLocation,
    /// µL. Zero means "all available" before API 2.16.
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspirateResult {
    pub volume: f64,
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AspirateImplementation;

#[async_trait]
impl CommandImplementation for AspirateImplementation {
    type Params = AspirateParams;
    type Result = AspirateResult;

    async fn execute(
        &self,
        params: &AspirateParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<AspirateResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;
        pipetting::validate_flow_rate(params.flow_rate)?;
        let ready = pipetting::is_ready_to_aspirate(ctx.state, pipette_id)?;
        let volume = pipetting::resolve_aspirate_volume(ctx, pipette_id, params.volume)?;
        pipetting::validate_aspirate_volume(ctx.state, pipette_id, volume)?;
        let target = LiquidTarget::resolve(ctx, pipette_id, &params.labware_id, &params.well_name)?;

        // Unknown contents: reset the plunger above the well first.
        if !ready {
            movement::move_to_well(
                ctx,
                pipette_id,
                &params.labware_id,
                &params.well_name,
                &WellLocation::top(),
                None,
            )
            .await?;
            pipetting::prepare_for_aspirate(ctx, pipette_id).await?;
        }

        let position = movement::move_to_well(
            ctx,
            pipette_id,
            &params.labware_id,
            &params.well_name,
            &params.well_location,
            None,
        )
        .await?;
        let mut update = StateUpdate::new();
        update.set_pipette_location(
            pipette_id,
            LogicalLocation::well(&params.labware_id, &params.well_name),
            position,
        );

        match pipetting::aspirate_in_place(ctx, pipette_id, volume, params.flow_rate).await {
            Ok(aspirated) => {
                record_aspirate(&mut update, pipette_id, Some(&target), aspirated);
                Ok(Executed::success(
                    AspirateResult {
                        volume: aspirated,
                        position,
                    },
                    update,
                ))
            }
            Err(err) => match as_overpressure(&err) {
                Some(cause) => {
                    let (error, update) =
                        overpressure(ctx, update, pipette_id, Some(&target), cause, position);
                    Ok(Executed::defined_error(error, update))
                }
                None => Err(err),
            },
        }
    }
}
