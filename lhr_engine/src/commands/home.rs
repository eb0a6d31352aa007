//! `home`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::movement;
use crate::state::StateUpdate;
use crate::types::{MotorAxis, Mount};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeParams {
    /// Axes to home; every axis when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<Vec<MotorAxis>>,
    /// Skip homing when this mount's position is already trusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_if_mount_position_ok: Option<Mount>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HomeResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct HomeImplementation;

#[async_trait]
impl CommandImplementation for HomeImplementation {
    type Params = HomeParams;
    type Result = HomeResult;

    async fn execute(
        &self,
        params: &HomeParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<HomeResult>, CommandError> {
        let skip = params
            .skip_if_mount_position_ok
            .is_some_and(|mount| movement::is_position_ok(ctx, mount));
        if skip {
            debug!(mount = ?params.skip_if_mount_position_ok, "position ok, home skipped");
        } else {
            movement::home(ctx, params.axes.as_deref()).await?;
        }

        // Logical locations are meaningless after a home, skipped or not.
        let mut update = StateUpdate::new();
        update.clear_all_pipette_locations();
        Ok(Executed::success(HomeResult {}, update))
    }
}
