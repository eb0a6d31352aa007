//! `blowOutInPlace`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{as_overpressure, overpressure};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutInPlaceParams {
    pub pipette_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlowOutInPlaceResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlowOutInPlaceImplementation;

#[async_trait]
impl CommandImplementation for BlowOutInPlaceImplementation {
    type Params = BlowOutInPlaceParams;
    type Result = BlowOutInPlaceResult;

    async fn execute(
        &self,
        params: &BlowOutInPlaceParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<BlowOutInPlaceResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;
        pipetting::validate_flow_rate(params.flow_rate)?;
        let position = movement::current_position(ctx, pipette_id).await?;

        let mut update = StateUpdate::new();
        match pipetting::blow_out_in_place(ctx, pipette_id, params.flow_rate).await {
            Ok(()) => {
                update.set_fluid_unknown(pipette_id);
                Ok(Executed::success(BlowOutInPlaceResult {}, update))
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
