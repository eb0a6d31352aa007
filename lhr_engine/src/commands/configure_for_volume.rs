//! `configureForVolume`: switch a pipette's liquid class ahead of a
//! transfer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::equipment;
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureForVolumeParams {
    pub pipette_id: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigureForVolumeResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureForVolumeImplementation;

#[async_trait]
impl CommandImplementation for ConfigureForVolumeImplementation {
    type Params = ConfigureForVolumeParams;
    type Result = ConfigureForVolumeResult;

    async fn execute(
        &self,
        params: &ConfigureForVolumeParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<ConfigureForVolumeResult>, CommandError> {
        let config = equipment::configure_for_volume(ctx, &params.pipette_id, params.volume).await?;
        let mut update = StateUpdate::new();
        update.update_pipette_config(&params.pipette_id, config);
        Ok(Executed::success(ConfigureForVolumeResult {}, update))
    }
}
