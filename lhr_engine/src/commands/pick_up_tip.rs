//! `pickUpTip`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::{CommandError, DefinedError};
use crate::execution::{movement, tip_handler};
use crate::state::StateUpdate;
use crate::types::{DeckPoint, LogicalLocation, WellLocation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipParams {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default = "WellLocation::top")]
    pub well_location: WellLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipResult {
    pub tip_volume: f64,
    pub tip_length: f64,
    pub tip_diameter: f64,
    pub position: DeckPoint,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PickUpTipImplementation;

#[async_trait]
impl CommandImplementation for PickUpTipImplementation {
    type Params = PickUpTipParams;
    type Result = PickUpTipResult;

    async fn execute(
        &self,
        params: &PickUpTipParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<PickUpTipResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        let labware_id = params.labware_id.as_str();
        let well_name = params.well_name.as_str();

        ctx.state.pipettes().get(pipette_id)?;
        if ctx.state.pipettes().has_tip(pipette_id) {
            return Err(CommandError::TipAlreadyAttached(pipette_id.to_string()));
        }
        let tip = tip_handler::tip_geometry_for(ctx, labware_id)?;
        ctx.state.geometry().ensure_well_exists(labware_id, well_name)?;
        if !ctx.state.tips().has_clean_tip(labware_id, well_name) {
            warn!(pipette_id, labware_id, well_name, "picking up a tip that was already used");
        }

        let position = movement::move_to_well(
            ctx,
            pipette_id,
            labware_id,
            well_name,
            &params.well_location,
            None,
        )
        .await?;
        let mut update = StateUpdate::new();
        update
            .set_pipette_location(
                pipette_id,
                LogicalLocation::well(labware_id, well_name),
                position,
            )
            .mark_tips_used(pipette_id, labware_id, well_name);

        tip_handler::pick_up_tip(ctx, pipette_id, tip).await?;

        if !tip_handler::verify_tip_presence(ctx, pipette_id, true).await? {
            update.set_fluid_unknown(pipette_id);
            let error = DefinedError::tip_physically_missing(
                ctx.model_utils,
                &format!("No tip detected on {pipette_id} after pick-up from {labware_id} {well_name}"),
            );
            return Ok(Executed::defined_error(error, update));
        }

        update
            .update_pipette_tip_state(pipette_id, Some(tip))
            .set_fluid_empty(pipette_id);
        Ok(Executed::success(
            PickUpTipResult {
                tip_volume: tip.volume,
                tip_length: tip.length,
                tip_diameter: tip.diameter,
                position,
            },
            update,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::types::Mount;

    fn params(labware_id: &str, well_name: &str) -> PickUpTipParams {
        PickUpTipParams {
            pipette_id: "p1".to_string(),
            labware_id: labware_id.to_string(),
            well_name: well_name.to_string(),
            well_location: WellLocation::top(),
        }
    }

    #[tokio::test]
    async fn attaches_tip_and_consumes_well() {
        let mut h = Harness::ot2().with_pipette_and_plate().await;
        let Executed::Success(data) = h
            .run_and_commit(PickUpTipImplementation, &params("tips", "A1"))
            .await
            .unwrap()
        else {
            panic!("expected success");
        };
        assert_eq!(data.public.tip_volume, 300.0);

        let view = h.view();
        assert!(view.pipettes().has_tip("p1"));
        assert_eq!(view.pipettes().get_aspirated_volume("p1").unwrap(), Some(0.0));
        assert!(!view.tips().has_clean_tip("tips", "A1"));
        assert_eq!(
            view.tips().get_next_tip("tips", 1, None, None).as_deref(),
            Some("B1")
        );
        assert_eq!(view.pipettes().get_deck_point("p1"), Some(data.public.position));
    }

    #[tokio::test]
    async fn plate_is_not_a_tip_rack() {
        let mut h = Harness::ot2().with_pipette_and_plate().await;
        let err = h
            .run(PickUpTipImplementation, &params("plate", "A1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::LabwareIsNotTipRack(_)));
    }

    #[tokio::test]
    async fn second_tip_is_rejected() {
        let mut h = Harness::ot2().with_tip_and_plate().await;
        let err = h
            .run(PickUpTipImplementation, &params("tips", "B1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::TipAlreadyAttached(_)));
    }

    #[tokio::test]
    async fn missing_tip_is_a_defined_error() {
        let mut h = Harness::ot2().with_pipette_and_plate().await;
        h.handle.set_tip_sensor(Mount::Left, Some(false));

        let Executed::DefinedError(data) = h
            .run_and_commit(PickUpTipImplementation, &params("tips", "C3"))
            .await
            .unwrap()
        else {
            panic!("expected defined error");
        };
        assert!(matches!(data.public, DefinedError::TipPhysicallyMissing(_)));

        let view = h.view();
        assert!(!view.pipettes().has_tip("p1"));
        assert!(!view.tips().has_clean_tip("tips", "C3"));
        assert_eq!(
            view.pipettes().get_current_location().unwrap().location,
            LogicalLocation::well("tips", "C3")
        );
    }
}
