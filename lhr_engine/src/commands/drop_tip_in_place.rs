//! `dropTipInPlace`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{pipetting, tip_handler};
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipInPlaceParams {
    pub pipette_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_after: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DropTipInPlaceResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct DropTipInPlaceImplementation;

#[async_trait]
impl CommandImplementation for DropTipInPlaceImplementation {
    type Params = DropTipInPlaceParams;
    type Result = DropTipInPlaceResult;

    async fn execute(
        &self,
        params: &DropTipInPlaceParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<DropTipInPlaceResult>, CommandError> {
        pipetting::validate_tip_attached(ctx.state, &params.pipette_id)?;
        tip_handler::drop_tip(ctx, &params.pipette_id).await?;

        let mut update = StateUpdate::new();
        update.update_pipette_tip_state(&params.pipette_id, None);
        Ok(Executed::success(DropTipInPlaceResult {}, update))
    }
}
