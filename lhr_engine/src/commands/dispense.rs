//! `dispense`: move into a well and push liquid out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{LiquidTarget, as_overpressure, overpressure, record_dispense};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;
use crate::types::{DeckPoint, LogicalLocation, WellLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default = "WellLocation::liquid_handling_default")]
    pub well_location: WellLocation,
    /// µL. Zero means "everything held" before API 2.16.
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
    /// Extra plunger travel past the bottom, in µL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_out: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenseResult {
    pub volume: f64,
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispenseImplementation;

#[async_trait]
impl CommandImplementation for DispenseImplementation {
    type Params = DispenseParams;
    type Result = DispenseResult;

    async fn execute(
        &self,
        params: &DispenseParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<DispenseResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;
        pipetting::validate_flow_rate(params.flow_rate)?;
        let volume = pipetting::resolve_dispense_volume(ctx, pipette_id, params.volume)?;
        pipetting::validate_dispense_volume(ctx.state, pipette_id, volume)?;
        let target = LiquidTarget::resolve(ctx, pipette_id, &params.labware_id, &params.well_name)?;

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

        match pipetting::dispense_in_place(ctx, pipette_id, volume, params.flow_rate, params.push_out)
            .await
        {
            Ok(dispensed) => {
                record_dispense(ctx, &mut update, pipette_id, Some(&target), dispensed)?;
                Ok(Executed::success(
                    DispenseResult {
                        volume: dispensed,
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
