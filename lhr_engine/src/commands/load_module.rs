//! `loadModule`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::equipment;
use crate::state::StateUpdate;
use crate::state::update::LoadModuleUpdate;
use crate::types::{DeckSlot, ModuleModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleLocation {
    pub slot_name: DeckSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadModuleParams {
    pub model: ModuleModel,
    pub location: ModuleLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadModuleResult {
    pub module_id: String,
    pub model: ModuleModel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadModuleImplementation;

#[async_trait]
impl CommandImplementation for LoadModuleImplementation {
    type Params = LoadModuleParams;
    type Result = LoadModuleResult;

    async fn execute(
        &self,
        params: &LoadModuleParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<LoadModuleResult>, CommandError> {
        let slot = params.location.slot_name;
        let module_id =
            equipment::load_module(ctx, params.model, slot, params.module_id.clone())?;

        let mut update = StateUpdate::new();
        update.set_loaded_module(LoadModuleUpdate {
            module_id: module_id.clone(),
            model: params.model,
            slot,
            semi_configuration: false,
        });
        Ok(Executed::success(
            LoadModuleResult {
                module_id,
                model: params.model,
            },
            update,
        ))
    }
}
