//! `unsafe/updatePositionEstimators`: resync motor position estimates from
//! the encoders. Flex only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandImplementation, Executed};
use crate::error::CommandError;
use crate::state::StateUpdate;
use crate::types::{MotorAxis, RobotType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePositionEstimatorsParams {
    pub axes: Vec<MotorAxis>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdatePositionEstimatorsResult {}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdatePositionEstimatorsImplementation;

#[async_trait]
impl CommandImplementation for UpdatePositionEstimatorsImplementation {
    type Params = UpdatePositionEstimatorsParams;
    type Result = UpdatePositionEstimatorsResult;

    async fn execute(
        &self,
        params: &UpdatePositionEstimatorsParams,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<UpdatePositionEstimatorsResult>, CommandError> {
        if ctx.config.robot_type() == RobotType::Ot2 {
            return Err(CommandError::HardwareNotSupported(
                "position estimators can only be updated on a Flex".to_string(),
            ));
        }
        ctx.hardware.update_position_estimators(&params.axes).await?;
        Ok(Executed::success(
            UpdatePositionEstimatorsResult {},
            StateUpdate::new(),
        ))
    }
}
