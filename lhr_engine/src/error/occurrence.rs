//! Serialisable record of an error, as reported in command results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;

use super::CommandError;
use crate::resources::ModelUtils;
use lhr_common::hardware::HardwareError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOccurrence {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub error_type: String,
    pub error_code: String,
    pub detail: String,
    #[serde(default)]
    pub wrapped_errors: Vec<ErrorOccurrence>,
    #[serde(default)]
    pub error_info: BTreeMap<String, Value>,
}

impl ErrorOccurrence {
    pub fn new(
        utils: &dyn ModelUtils,
        error_type: impl Into<String>,
        error_code: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: utils.generate_id(),
            created_at: utils.get_timestamp(),
            error_type: error_type.into(),
            error_code: error_code.into(),
            detail: detail.into(),
            wrapped_errors: Vec::new(),
            error_info: BTreeMap::new(),
        }
    }

    pub fn with_info(mut self, key: impl Into<String>, value: Value) -> Self {
        self.error_info.insert(key.into(), value);
        self
    }

    /// Record for a hardware failure.
    pub fn from_hardware(utils: &dyn ModelUtils, error: &HardwareError) -> Self {
        Self::new(utils, error.kind(), error.error_code(), error.to_string())
    }

    /// Record for a command failure. Each `source()` in the chain becomes a
    /// nested wrapped error.
    pub fn from_command_error(utils: &dyn ModelUtils, error: &CommandError) -> Self {
        let mut occurrence = Self::new(
            utils,
            error.error_type(),
            error.error_code(),
            error.to_string(),
        );
        occurrence.wrapped_errors = wrap_sources(utils, error.source());
        occurrence
    }
}

fn wrap_sources(
    utils: &dyn ModelUtils,
    source: Option<&(dyn Error + 'static)>,
) -> Vec<ErrorOccurrence> {
    let Some(source) = source else {
        return Vec::new();
    };
    let mut occurrence = match source.downcast_ref::<HardwareError>() {
        Some(hw) => ErrorOccurrence::from_hardware(utils, hw),
        None => ErrorOccurrence::new(utils, "GeneralError", "4000", source.to_string()),
    };
    occurrence.wrapped_errors = wrap_sources(utils, source.source());
    vec![occurrence]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::SequentialModelUtils;
    use lhr_common::hardware::Mount;

    #[test]
    fn hardware_chain_is_wrapped() {
        let utils = SequentialModelUtils::new("err");
        let error = CommandError::Hardware(HardwareError::NoTipAttached(Mount::Right));
        let occurrence = ErrorOccurrence::from_command_error(&utils, &error);

        assert_eq!(occurrence.error_type, "HardwareError");
        assert_eq!(occurrence.wrapped_errors.len(), 1);
        let inner = &occurrence.wrapped_errors[0];
        assert_eq!(inner.error_type, "TipNotAttached");
        assert_eq!(inner.error_code, "3000");
        assert!(inner.detail.contains("right"));
        assert!(inner.wrapped_errors.is_empty());
    }

    #[test]
    fn serialises_camel_case() {
        let utils = SequentialModelUtils::new("err");
        let occurrence = ErrorOccurrence::new(&utils, "X", "4000", "detail")
            .with_info("retryLocation", serde_json::json!([1.0, 2.0, 3.0]));
        let json = serde_json::to_value(&occurrence).unwrap();
        assert_eq!(json["errorType"], "X");
        assert_eq!(json["errorInfo"]["retryLocation"][2], 3.0);
        assert!(json["wrappedErrors"].as_array().unwrap().is_empty());
    }
}
