//! `loadPipette`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::equipment;
use crate::resources::PipetteName;
use crate::state::StateUpdate;
use crate::types::Mount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPipetteParams {
    pub pipette_name: PipetteName,
    pub mount: Mount,
    /// Id to assign; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipette_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPipetteResult {
    pub pipette_id: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadPipetteImplementation;

#[async_trait]
impl CommandImplementation for LoadPipetteImplementation {
    type Params = LoadPipetteParams;
    type Result = LoadPipetteResult;

    async fn execute(
        &self,
        params: &LoadPipetteParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<LoadPipetteResult>, CommandError> {
        let loaded = equipment::load_pipette(
            ctx,
            params.pipette_name,
            params.mount,
            params.pipette_id.clone(),
        )
        .await?;

        let mut update = StateUpdate::new();
        update
            .set_loaded_pipette(&loaded.pipette_id, params.pipette_name, params.mount)
            .update_pipette_config(&loaded.pipette_id, loaded.config)
            .set_fluid_unknown(&loaded.pipette_id);
        Ok(Executed::success(
            LoadPipetteResult {
                pipette_id: loaded.pipette_id,
            },
            update,
        ))
    }
}
