//! `resetTips`: mark every tip in a rack clean again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTipsParams {
    pub labware_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResetTipsResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResetTipsImplementation;

#[async_trait]
impl CommandImplementation for ResetTipsImplementation {
    type Params = ResetTipsParams;
    type Result = ResetTipsResult;

    async fn execute(
        &self,
        params: &ResetTipsParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<ResetTipsResult>, CommandError> {
        if !ctx.state.labware().is_tip_rack(&params.labware_id)? {
            return Err(CommandError::LabwareIsNotTipRack(params.labware_id.clone()));
        }
        let mut update = StateUpdate::new();
        update.reset_tips(&params.labware_id);
        Ok(Executed::success(ResetTipsResult {}, update))
    }
}
