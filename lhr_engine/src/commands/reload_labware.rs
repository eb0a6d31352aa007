//! `reloadLabware`: re-resolve the calibration offset of labware already on
//! the deck.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::equipment;
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadLabwareParams {
    pub labware_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadLabwareResult {
    pub labware_id: String,
    pub offset_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReloadLabwareImplementation;

#[async_trait]
impl CommandImplementation for ReloadLabwareImplementation {
    type Params = ReloadLabwareParams;
    type Result = ReloadLabwareResult;

    async fn execute(
        &self,
        params: &ReloadLabwareParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<ReloadLabwareResult>, CommandError> {
        let reloaded = equipment::reload_labware(ctx, &params.labware_id)?;
        let mut update = StateUpdate::new();
        update.set_labware_location(
            &params.labware_id,
            reloaded.location,
            reloaded.offset_id.clone(),
        );
        Ok(Executed::success(
            ReloadLabwareResult {
                labware_id: params.labware_id.clone(),
                offset_id: reloaded.offset_id,
            },
            update,
        ))
    }
}
