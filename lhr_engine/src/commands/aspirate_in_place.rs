//! `aspirateInPlace`: draw liquid without moving.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pipetting_common::{LiquidTarget, as_overpressure, overpressure, record_aspirate};
use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::execution::{movement, pipetting};
use crate::state::StateUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspirateInPlaceParams {
    pub pipette_id: String,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspirateInPlaceResult {
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AspirateInPlaceImplementation;

#[async_trait]
impl CommandImplementation for AspirateInPlaceImplementation {
    type Params = AspirateInPlaceParams;
    type Result = AspirateInPlaceResult;

    async fn execute(
        &self,
        params: &AspirateInPlaceParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<AspirateInPlaceResult>, CommandError> {
        let pipette_id = params.pipette_id.as_str();
        pipetting::validate_tip_attached(ctx.state, pipette_id)?;
        pipetting::validate_flow_rate(params.flow_rate)?;
        if !pipetting::is_ready_to_aspirate(ctx.state, pipette_id)? {
            return Err(CommandError::PipetteNotReadyToAspirate(
                pipette_id.to_string(),
            ));
        }
        let volume = pipetting::resolve_aspirate_volume(ctx, pipette_id, params.volume)?;
        let target = LiquidTarget::current(ctx, pipette_id)?;
        let position = movement::current_position(ctx, pipette_id).await?;

        let mut update = StateUpdate::new();
        match pipetting::aspirate_in_place(ctx, pipette_id, volume, params.flow_rate).await {
            Ok(aspirated) => {
                record_aspirate(&mut update, pipette_id, target.as_ref(), aspirated);
                Ok(Executed::success(
                    AspirateInPlaceResult { volume: aspirated },
                    update,
                ))
            }
            Err(err) => match as_overpressure(&err) {
                Some(cause) => {
                    let (error, update) =
                        overpressure(ctx, update, pipette_id, target.as_ref(), cause, position);
                    Ok(Executed::defined_error(error, update))
                }
                None => Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::aspirate::{AspirateImplementation, AspirateParams};
    use crate::testing::Harness;
    use crate::types::WellLocation;

    fn params(volume: f64) -> AspirateInPlaceParams {
        AspirateInPlaceParams {
            pipette_id: "p1".to_string(),
            volume,
            flow_rate: Some(5.0),
        }
    }

    #[tokio::test]
    async fn not_ready_after_contents_become_unknown() {
        let mut h = Harness::ot2().with_tip_and_plate().await;
        let mut unknown = StateUpdate::new();
        unknown.set_fluid_unknown("p1");
        h.commit(&unknown);

        let err = h
            .run(AspirateInPlaceImplementation, &params(10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::PipetteNotReadyToAspirate(_)));
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn tracks_liquid_in_the_current_well() {
        let mut h = Harness::ot2().with_tip_and_plate().await;
        h.run_and_commit(
            AspirateImplementation,
            &AspirateParams {
                pipette_id: "p1".to_string(),
                labware_id: "plate".to_string(),
                well_name: "B2".to_string(),
                well_location: WellLocation::liquid_handling_default(),
                volume: 10.0,
                flow_rate: None,
            },
        )
        .await
        .unwrap();

        let executed = h
            .run_and_commit(AspirateInPlaceImplementation, &params(15.0))
            .await
            .unwrap();
        assert!(matches!(executed, Executed::Success(_)));
        let view = h.view();
        assert_eq!(view.pipettes().get_aspirated_volume("p1").unwrap(), Some(25.0));
        assert_eq!(view.wells().get_operated_volume("plate", "B2"), Some(-25.0));
    }
}
