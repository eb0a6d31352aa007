//! `dropTip`: move to a well (usually a trash) and eject the tip.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting, tip_handler};
use crate::state::StateUpdate;
use crate::types::{DeckPoint, LogicalLocation, WellLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default = "WellLocation::top")]
    pub well_location: WellLocation,
    /// Home the plunger after dropping. Accepted for compatibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_after: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTipResult {
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DropTipImplementation;

#[async_trait]
impl CommandImplementation for DropTipImplementation {
    type Params = DropTipParams;
    type Result = DropTipResult;

    async fn execute(
        &self,
        params: &DropTipParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<DropTipResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;

        let position = movement::move_to_well(
            ctx,
            pipette_id,
            &params.labware_id,
            &params.well_name,
            &params.well_location,
            None,
        )
        .await?;
        tip_handler::drop_tip(ctx, pipette_id).await?;

        let mut update = StateUpdate::new();
        update
            .set_pipette_location(
                pipette_id,
                LogicalLocation::well(&params.labware_id, &params.well_name),
                position,
            )
            .update_pipette_tip_state(pipette_id, None);
        Ok(Executed::success(DropTipResult { position }, update))
    }
}
