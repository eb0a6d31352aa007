//! `configureNozzleLayout`: restrict a multi-channel pipette to a subset
//! of its nozzles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::state::StateUpdate;
use crate::types::{NozzleLayoutStyle, NozzleMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NozzleConfigurationParams {
    pub style: NozzleLayoutStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureNozzleLayoutParams {
    pub pipette_id: String,
    pub configuration_params: NozzleConfigurationParams,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigureNozzleLayoutResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureNozzleLayoutImplementation;

/// Nozzle rectangle for `style` on a pipette with `channels` nozzles.
fn layout_for(style: NozzleLayoutStyle, channels: u8) -> Option<NozzleMap> {
    let full = NozzleMap::for_channels(channels);
    let map = match style {
        NozzleLayoutStyle::All => full,
        NozzleLayoutStyle::Single => NozzleMap::SINGLE,
        NozzleLayoutStyle::Column if full.rows >= NozzleMap::COLUMN.rows => {
            NozzleMap::new(full.rows, 1)
        }
        NozzleLayoutStyle::Row if full.columns >= NozzleMap::ROW.columns => {
            NozzleMap::new(1, full.columns)
        }
        NozzleLayoutStyle::Column | NozzleLayoutStyle::Row => return None,
    };
    Some(map)
}

#[async_trait]
impl CommandImplementation for ConfigureNozzleLayoutImplementation {
    type Params = ConfigureNozzleLayoutParams;
    type Result = ConfigureNozzleLayoutResult;

    async fn execute(
        &self,
        params: &ConfigureNozzleLayoutParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<ConfigureNozzleLayoutResult>, CommandError> {
        let channels = ctx.state.pipettes().get_config(&params.pipette_id)?.channels;
        let style = params.configuration_params.style;
        let map = layout_for(style, channels).ok_or_else(|| {
            CommandError::InvalidParams(format!(
                "nozzle layout {style:?} is not available on a {channels}-channel pipette"
            ))
        })?;
        debug!(pipette_id = %params.pipette_id, ?style, rows = map.rows, columns = map.columns, "nozzle layout configured");

        let mut update = StateUpdate::new();
        update.update_pipette_nozzle_map(&params.pipette_id, map);
        Ok(Executed::success(ConfigureNozzleLayoutResult {}, update))
    }
}
