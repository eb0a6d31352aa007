//! `dispenseInPlace`: push liquid out without moving.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{LiquidTarget, as_overpressure, overpressure, record_dispense};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseInPlaceParams {
    pub pipette_id: String,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_out: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenseInPlaceResult {
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispenseInPlaceImplementation;

#[async_trait]
impl CommandImplementation for DispenseInPlaceImplementation {
    type Params = DispenseInPlaceParams;
    type Result = DispenseInPlaceResult;

    async fn execute(
        &self,
        params: &DispenseInPlaceParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<DispenseInPlaceResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;
        pipetting::validate_flow_rate(params.flow_rate)?;
        let volume = pipetting::resolve_dispense_volume(ctx, pipette_id, params.volume)?;
        let target = LiquidTarget::current(ctx, pipette_id)?;
        let position = movement::current_position(ctx, pipette_id).await?;

        let mut update = StateUpdate::new();
        match pipetting::dispense_in_place(ctx, pipette_id, volume, params.flow_rate, params.push_out)
            .await
        {
            Ok(dispensed) => {
                record_dispense(ctx, &mut update, pipette_id, target.as_ref(), dispensed)?;
                Ok(Executed::success(
                    DispenseInPlaceResult { volume: dispensed },
                    update,
                ))
            }
            Err(err) => match as_overpressure(&err) {
                Some(cause) => {
                    let (error, update) =
                        overpressure(ctx, update, pipette_id, target.as_ref(), cause, position);
                    Ok(Executed::defined_error(error, update))
                }
                None => Err(err),
            },
        }
    }
}
