//! `prepareToAspirate`: bring the plunger to its bottom so contents are
//! known again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{as_overpressure, overpressure};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareToAspirateParams {
    pub pipette_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrepareToAspirateResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareToAspirateImplementation;

#[async_trait]
impl CommandImplementation for PrepareToAspirateImplementation {
    type Params = PrepareToAspirateParams;
    type Result = PrepareToAspirateResult;

    async fn execute(
        &self,
        params: &PrepareToAspirateParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<PrepareToAspirateResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        let position = movement::current_position(ctx, pipette_id).await?;

        let mut update = StateUpdate::new();
        match pipetting::prepare_for_aspirate(ctx, pipette_id).await {
            Ok(()) => {
                update.set_fluid_empty(pipette_id);
                Ok(Executed::success(PrepareToAspirateResult {}, update))
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
