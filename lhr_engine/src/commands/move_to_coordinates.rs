//! `moveToCoordinates`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::movement;
use crate::state::StateUpdate;
use crate::types::DeckPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCoordinatesParams {
    pub pipette_id: String,
    pub coordinates: DeckPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Accepted for compatibility; arc planning belongs to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_z_height: Option<f64>,
    #[serde(default)]
    pub force_direct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToCoordinatesResult {
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveToCoordinatesImplementation;

#[async_trait]
impl CommandImplementation for MoveToCoordinatesImplementation {
    type Params = MoveToCoordinatesParams;
    type Result = MoveToCoordinatesResult;

    async fn execute(
        &self,
        params: &MoveToCoordinatesParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<MoveToCoordinatesResult>, CommandError> {
        let position =
            movement::move_to_coordinates(ctx, &params.pipette_id, params.coordinates, params.speed)
                .await?;
        let mut update = StateUpdate::new();
        update.set_pipette_deck_point(&params.pipette_id, position);
        Ok(Executed::success(MoveToCoordinatesResult { position }, update))
    }
}
