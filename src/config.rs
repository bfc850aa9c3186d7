//! Model loading configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output feature every sleep model must expose
pub const DEFAULT_OUTPUT_FEATURE: &str = "actual_sleep";

/// Settings applied when a model artifact is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfiguration {
    /// Location of the model artifact on disk
    pub artifact_path: Option<PathBuf>,
    /// Name of the model output holding the required sleep duration
    pub output_feature: String,
}

impl Default for ModelConfiguration {
    fn default() -> Self {
        Self {
            artifact_path: None,
            output_feature: DEFAULT_OUTPUT_FEATURE.to_string(),
        }
    }
}

impl ModelConfiguration {
    /// Configuration pointing at an artifact file
    pub fn with_artifact_path(path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parse configuration from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
