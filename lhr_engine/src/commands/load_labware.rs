//! `loadLabware`: place a labware on the deck, a module or another labware.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::equipment;
use crate::state::StateUpdate;
use crate::state::update::LoadedLabwareUpdate;
use crate::types::LabwareLocation;

fn default_namespace() -> String {
    "opentrons".to_string()
}

const fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLabwareParams {
    pub location: LabwareLocation,
    pub load_name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labware_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLabwareResult {
    pub labware_id: String,
    pub definition_uri: String,
    pub offset_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadLabwareImplementation;

#[async_trait]
impl CommandImplementation for LoadLabwareImplementation {
    type Params = LoadLabwareParams;
    type Result = LoadLabwareResult;

    async fn execute(
        &self,
        params: &LoadLabwareParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<LoadLabwareResult>, CommandError> {
        let loaded = equipment::load_labware(
            ctx,
            &params.load_name,
            &params.namespace,
            params.version,
            &params.location,
            params.labware_id.clone(),
        )?;
        let result = LoadLabwareResult {
            labware_id: loaded.labware_id.clone(),
            definition_uri: loaded.definition.uri(),
            offset_id: loaded.offset_id.clone(),
        };

        let mut update = StateUpdate::new();
        update.set_loaded_labware(LoadedLabwareUpdate {
            labware_id: loaded.labware_id,
            definition: loaded.definition,
            location: params.location.clone(),
            offset_id: loaded.offset_id,
            display_name: params.display_name.clone(),
        });
        Ok(Executed::success(result, update))
    }
}
