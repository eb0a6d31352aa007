//! Recoverable errors with recovery metadata.
//!
//! A defined error is returned as a value together with a state update; the
//! engine marks the command failed but still commits the update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::occurrence::ErrorOccurrence;
use crate::resources::ModelUtils;
use crate::types::DeckPoint;
use lhr_common::hardware::HardwareError;

/// The plunger hit an overpressure while moving liquid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverpressureError {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub wrapped_errors: Vec<ErrorOccurrence>,
    /// Gantry position when the error occurred.
    pub retry_location: DeckPoint,
}

/// A pick-up finished but the tip sensor sees no tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipPhysicallyMissingError {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub wrapped_errors: Vec<ErrorOccurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "errorType", rename_all = "camelCase")]
pub enum DefinedError {
    Overpressure(OverpressureError),
    TipPhysicallyMissing(TipPhysicallyMissingError),
}

impl DefinedError {
    pub fn overpressure(
        utils: &dyn ModelUtils,
        cause: &HardwareError,
        retry_location: DeckPoint,
    ) -> Self {
        Self::Overpressure(OverpressureError {
            id: utils.generate_id(),
            created_at: utils.get_timestamp(),
            wrapped_errors: vec![ErrorOccurrence::from_hardware(utils, cause)],
            retry_location,
        })
    }

    pub fn tip_physically_missing(utils: &dyn ModelUtils, detail: &str) -> Self {
        Self::TipPhysicallyMissing(TipPhysicallyMissingError {
            id: utils.generate_id(),
            created_at: utils.get_timestamp(),
            wrapped_errors: vec![ErrorOccurrence::new(
                utils,
                "TipNotDetected",
                "3000",
                detail,
            )],
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Overpressure(e) => &e.id,
            Self::TipPhysicallyMissing(e) => &e.id,
        }
    }

    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Overpressure(_) => "overpressure",
            Self::TipPhysicallyMissing(_) => "tipPhysicallyMissing",
        }
    }

    /// Flatten into the generic error record stored on the command.
    pub fn to_occurrence(&self) -> ErrorOccurrence {
        match self {
            Self::Overpressure(e) => {
                let p = e.retry_location;
                ErrorOccurrence {
                    id: e.id.clone(),
                    created_at: e.created_at,
                    error_type: self.error_type().to_string(),
                    error_code: "3006".to_string(),
                    detail: "overpressure error".to_string(),
                    wrapped_errors: e.wrapped_errors.clone(),
                    error_info: Default::default(),
                }
                .with_info("retryLocation", json!([p.x, p.y, p.z]))
            }
            Self::TipPhysicallyMissing(e) => ErrorOccurrence {
                id: e.id.clone(),
                created_at: e.created_at,
                error_type: self.error_type().to_string(),
                error_code: "3000".to_string(),
                detail: "No tip detected.".to_string(),
                wrapped_errors: e.wrapped_errors.clone(),
                error_info: Default::default(),
            },
        }
    }
}
