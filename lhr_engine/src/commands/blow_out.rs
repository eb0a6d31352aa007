//! `blowout`: move to a well and expel everything left in the tip.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{as_overpressure, overpressure};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;
use crate::types::{DeckPoint, LogicalLocation, WellLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default = "WellLocation::top")]
    pub well_location: WellLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlowOutResult {
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlowOutImplementation;

#[async_trait]
impl CommandImplementation for BlowOutImplementation {
    type Params = BlowOutParams;
    type Result = BlowOutResult;

    async fn execute(
        &self,
        params: &BlowOutParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<BlowOutResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;
        pipetting::validate_flow_rate(params.flow_rate)?;

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

        match pipetting::blow_out_in_place(ctx, pipette_id, params.flow_rate).await {
            Ok(()) => {
                // The plunger is past its bottom; contents no longer tracked.
                update.set_fluid_unknown(pipette_id);
                Ok(Executed::success(BlowOutResult { position }, update))
            }
            Err(err) => match as_overpressure(&err) {
                Some(cause) => {
                    let (error, update) = overpressure(ctx, update, pipette_id, None, cause, position);
                    Ok(Executed::defined_error(error, update))
                }
                None => Err(err),
            },
        }
    }
}
