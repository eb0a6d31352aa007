//! `moveToAddressableArea`: move above a named deck area such as a trash
//! bin.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::deck_conflict;
use crate::error::CommandError;
use crate::execution::movement;
use crate::state::StateUpdate;
use crate::types::{DeckPoint, LogicalLocation, WellOffset};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaParams {
    pub pipette_id: String,
    pub addressable_area_name: String,
    #[serde(default)]
    pub offset: WellOffset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToAddressableAreaResult {
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveToAddressableAreaImplementation;

#[async_trait]
impl CommandImplementation for MoveToAddressableAreaImplementation {
    type Params = MoveToAddressableAreaParams;
    type Result = MoveToAddressableAreaResult;

    async fn execute(
        &self,
        params: &MoveToAddressableAreaParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<MoveToAddressableAreaResult>, CommandError> {
        let area = params.addressable_area_name.as_str();
        // First use of a trash bin places it on the deck.
        deck_conflict::check_trash_bin_candidate(ctx.state, area)?;
        let position = movement::move_to_addressable_area(
            ctx,
            &params.pipette_id,
            area,
            params.offset,
            params.speed,
        )
        .await?;

        let mut update = StateUpdate::new();
        update
            .set_pipette_location(
                &params.pipette_id,
                LogicalLocation::AddressableArea {
                    addressable_area_name: area.to_string(),
                },
                position,
            )
            .mark_addressable_area_used(area);
        Ok(Executed::success(
            MoveToAddressableAreaResult { position },
            update,
        ))
    }
}
