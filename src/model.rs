//! Sleep models
//!
//! A sleep model maps the three encoded features (wake-up seconds, sleep goal,
//! coffee cups) to the sleep the user actually needs. The [`SleepModel`] trait
//! is the seam the estimator depends on; [`LinearSleepModel`] is the bundled
//! implementation backed by a JSON regression artifact.
//!
//! Artifact format:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "SleepCalculator",
//!   "output": "actual_sleep",
//!   "output_unit": "hours",
//!   "intercept": 1.2,
//!   "coefficients": { "wake": 0.00002, "estimated_sleep": 0.75, "coffee": 0.1 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::ModelConfiguration;
use crate::types::{FeatureVector, SleepPrediction};

/// Artifact format versions this crate can read
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Feature names, in the order the model consumes them
pub const FEATURE_WAKE: &str = "wake";
pub const FEATURE_ESTIMATED_SLEEP: &str = "estimated_sleep";
pub const FEATURE_COFFEE: &str = "coffee";
pub const FEATURE_NAMES: [&str; 3] = [FEATURE_WAKE, FEATURE_ESTIMATED_SLEEP, FEATURE_COFFEE];

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Detailed model failures.
///
/// These never reach end users; the estimator logs them and reports a
/// generic [`crate::ComputeError`].
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("No model artifact configured")]
    MissingArtifact,

    #[error("Cannot read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported artifact format version: {0}")]
    UnsupportedFormat(u32),

    #[error("Missing coefficient for feature: {0}")]
    MissingCoefficient(String),

    #[error("Unknown feature in artifact: {0}")]
    UnknownFeature(String),

    #[error("Non-finite parameter: {0}")]
    NonFinite(String),

    #[error("Model output '{found}' does not match configured output '{expected}'")]
    OutputMismatch { expected: String, found: String },

    #[error("Invalid feature value: {0}")]
    InvalidFeature(String),

    #[error("Model failure: {0}")]
    Internal(String),
}

/// Interface for fitted sleep models
pub trait SleepModel: Send + Sync {
    /// Predict required sleep for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<SleepPrediction, ModelError>;

    /// Model name, for logs and reports
    fn name(&self) -> &str;
}

/// Unit the artifact's output is expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Hours,
    Seconds,
}

impl DurationUnit {
    fn to_hours(self, value: f64) -> f64 {
        match self {
            DurationUnit::Hours => value,
            DurationUnit::Seconds => value / SECONDS_PER_HOUR,
        }
    }
}

/// On-disk representation of a linear sleep model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    pub format_version: u32,
    pub name: String,
    pub output: String,
    #[serde(default)]
    pub output_unit: DurationUnit,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

/// Linear regression over the three sleep features
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSleepModel {
    name: String,
    output: String,
    output_unit: DurationUnit,
    intercept: f64,
    wake: f64,
    estimated_sleep: f64,
    coffee: f64,
}

impl LinearSleepModel {
    /// Load the artifact named by the configuration
    pub fn load(config: &ModelConfiguration) -> Result<Self, ModelError> {
        let path = config
            .artifact_path
            .as_deref()
            .ok_or(ModelError::MissingArtifact)?;
        Self::from_path(path, config)
    }

    /// Load an artifact file
    pub fn from_path(path: &Path, config: &ModelConfiguration) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json, config)
    }

    /// Parse and validate an artifact
    pub fn from_json(json: &str, config: &ModelConfiguration) -> Result<Self, ModelError> {
        let artifact: LinearModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact, config)
    }

    pub fn from_artifact(
        artifact: LinearModelArtifact,
        config: &ModelConfiguration,
    ) -> Result<Self, ModelError> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat(artifact.format_version));
        }

        if artifact.output != config.output_feature {
            return Err(ModelError::OutputMismatch {
                expected: config.output_feature.clone(),
                found: artifact.output,
            });
        }

        if let Some(unknown) = artifact
            .coefficients
            .keys()
            .find(|name| !FEATURE_NAMES.contains(&name.as_str()))
        {
            return Err(ModelError::UnknownFeature(unknown.clone()));
        }

        if !artifact.intercept.is_finite() {
            return Err(ModelError::NonFinite("intercept".to_string()));
        }

        let coefficient = |name: &str| -> Result<f64, ModelError> {
            let value = artifact
                .coefficients
                .get(name)
                .copied()
                .ok_or_else(|| ModelError::MissingCoefficient(name.to_string()))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ModelError::NonFinite(name.to_string()))
            }
        };

        let model = Self {
            wake: coefficient(FEATURE_WAKE)?,
            estimated_sleep: coefficient(FEATURE_ESTIMATED_SLEEP)?,
            coffee: coefficient(FEATURE_COFFEE)?,
            name: artifact.name,
            output: artifact.output,
            output_unit: artifact.output_unit,
            intercept: artifact.intercept,
        };

        debug!(model = %model.name, unit = ?model.output_unit, "loaded linear sleep model");
        Ok(model)
    }

    /// Artifact describing this model
    pub fn to_artifact(&self) -> LinearModelArtifact {
        let coefficients = BTreeMap::from([
            (FEATURE_WAKE.to_string(), self.wake),
            (FEATURE_ESTIMATED_SLEEP.to_string(), self.estimated_sleep),
            (FEATURE_COFFEE.to_string(), self.coffee),
        ]);

        LinearModelArtifact {
            format_version: SUPPORTED_FORMAT_VERSION,
            name: self.name.clone(),
            output: self.output.clone(),
            output_unit: self.output_unit,
            intercept: self.intercept,
            coefficients,
        }
    }
}

impl SleepModel for LinearSleepModel {
    fn predict(&self, features: &FeatureVector) -> Result<SleepPrediction, ModelError> {
        validate_features(features)?;

        let raw = self.intercept
            + self.wake * features.wake_seconds
            + self.estimated_sleep * features.sleep_amount
            + self.coffee * features.coffee_amount;
        let hours = self.output_unit.to_hours(raw);

        if !hours.is_finite() {
            return Err(ModelError::Internal("prediction is not finite".to_string()));
        }
        if hours < 0.0 {
            return Err(ModelError::Internal(format!(
                "predicted negative sleep duration: {hours}"
            )));
        }

        Ok(SleepPrediction {
            actual_sleep: hours,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn validate_features(features: &FeatureVector) -> Result<(), ModelError> {
    if !features.wake_seconds.is_finite()
        || !(0.0..SECONDS_PER_DAY).contains(&features.wake_seconds)
    {
        return Err(ModelError::InvalidFeature(format!(
            "{FEATURE_WAKE}={}",
            features.wake_seconds
        )));
    }
    if !features.sleep_amount.is_finite() || features.sleep_amount <= 0.0 {
        return Err(ModelError::InvalidFeature(format!(
            "{FEATURE_ESTIMATED_SLEEP}={}",
            features.sleep_amount
        )));
    }
    if !features.coffee_amount.is_finite() || features.coffee_amount < 0.0 {
        return Err(ModelError::InvalidFeature(format!(
            "{FEATURE_COFFEE}={}",
            features.coffee_amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_artifact_json() -> &'static str {
        r#"{
            "format_version": 1,
            "name": "SleepCalculator",
            "output": "actual_sleep",
            "output_unit": "hours",
            "intercept": 1.0,
            "coefficients": {
                "wake": 0.0001,
                "estimated_sleep": 0.75,
                "coffee": 0.1
            }
        }"#
    }

    fn features() -> FeatureVector {
        FeatureVector {
            wake_seconds: 25_200.0,
            sleep_amount: 8.0,
            coffee_amount: 2.0,
        }
    }

    #[test]
    fn test_load_and_predict() {
        let model =
            LinearSleepModel::from_json(sample_artifact_json(), &ModelConfiguration::default())
                .unwrap();
        assert_eq!(model.name(), "SleepCalculator");

        let prediction = model.predict(&features()).unwrap();
        // 1.0 + 0.0001 * 25200 + 0.75 * 8 + 0.1 * 2 = 9.72
        assert!((prediction.actual_sleep - 9.72).abs() < 1e-9);
    }

    #[test]
    fn test_seconds_output_converted_to_hours() {
        let json = r#"{
            "format_version": 1,
            "name": "SleepCalculatorSeconds",
            "output": "actual_sleep",
            "output_unit": "seconds",
            "intercept": 0.0,
            "coefficients": { "wake": 0.0, "estimated_sleep": 3600.0, "coffee": -900.0 }
        }"#;
        let model = LinearSleepModel::from_json(json, &ModelConfiguration::default()).unwrap();

        let prediction = model.predict(&features()).unwrap();
        // 8h - 2 * 15min
        assert!((prediction.actual_sleep - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_unit_defaults_to_hours() {
        let json = r#"{
            "format_version": 1,
            "name": "m",
            "output": "actual_sleep",
            "intercept": 7.0,
            "coefficients": { "wake": 0.0, "estimated_sleep": 0.0, "coffee": 0.0 }
        }"#;
        let model = LinearSleepModel::from_json(json, &ModelConfiguration::default()).unwrap();
        assert_eq!(model.predict(&features()).unwrap().actual_sleep, 7.0);
    }

    #[test]
    fn test_invalid_json() {
        let result = LinearSleepModel::from_json("not json", &ModelConfiguration::default());
        assert!(matches!(result, Err(ModelError::Json(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let json = sample_artifact_json().replace("\"format_version\": 1", "\"format_version\": 2");
        let result = LinearSleepModel::from_json(&json, &ModelConfiguration::default());
        assert!(matches!(result, Err(ModelError::UnsupportedFormat(2))));
    }

    #[test]
    fn test_missing_coefficient() {
        let json = sample_artifact_json().replace("\"coffee\": 0.1", "\"unused\": 0.1");
        let result = LinearSleepModel::from_json(&json, &ModelConfiguration::default());
        assert!(matches!(result, Err(ModelError::UnknownFeature(name)) if name == "unused"));

        let mut value: serde_json::Value = serde_json::from_str(sample_artifact_json()).unwrap();
        value["coefficients"]
            .as_object_mut()
            .unwrap()
            .remove("coffee");
        let result =
            LinearSleepModel::from_json(&value.to_string(), &ModelConfiguration::default());
        assert!(matches!(result, Err(ModelError::MissingCoefficient(name)) if name == "coffee"));
    }

    #[test]
    fn test_output_mismatch() {
        let config = ModelConfiguration {
            output_feature: "bedtime".to_string(),
            ..ModelConfiguration::default()
        };
        let result = LinearSleepModel::from_json(sample_artifact_json(), &config);
        assert!(matches!(result, Err(ModelError::OutputMismatch { .. })));
    }

    #[test]
    fn test_load_without_path() {
        let result = LinearSleepModel::load(&ModelConfiguration::default());
        assert!(matches!(result, Err(ModelError::MissingArtifact)));
    }

    #[test]
    fn test_load_missing_file() {
        let config = ModelConfiguration::with_artifact_path("/nonexistent/sleep_model.json");
        let result = LinearSleepModel::load(&config);
        assert!(matches!(result, Err(ModelError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sleep_model.json");
        fs::write(&path, sample_artifact_json()).unwrap();

        let model = LinearSleepModel::load(&ModelConfiguration::with_artifact_path(&path)).unwrap();
        assert_eq!(model.name(), "SleepCalculator");
    }

    #[test]
    fn test_invalid_features_rejected() {
        let model =
            LinearSleepModel::from_json(sample_artifact_json(), &ModelConfiguration::default())
                .unwrap();

        let mut bad = features();
        bad.wake_seconds = 90_000.0;
        assert!(matches!(model.predict(&bad), Err(ModelError::InvalidFeature(_))));

        let mut bad = features();
        bad.sleep_amount = f64::NAN;
        assert!(matches!(model.predict(&bad), Err(ModelError::InvalidFeature(_))));

        let mut bad = features();
        bad.coffee_amount = -1.0;
        assert!(matches!(model.predict(&bad), Err(ModelError::InvalidFeature(_))));
    }

    #[test]
    fn test_negative_prediction_is_internal_error() {
        let json = sample_artifact_json().replace("\"intercept\": 1.0", "\"intercept\": -100.0");
        let model = LinearSleepModel::from_json(&json, &ModelConfiguration::default()).unwrap();
        assert!(matches!(model.predict(&features()), Err(ModelError::Internal(_))));
    }

    #[test]
    fn test_artifact_round_trip() {
        let model =
            LinearSleepModel::from_json(sample_artifact_json(), &ModelConfiguration::default())
                .unwrap();
        let reloaded =
            LinearSleepModel::from_artifact(model.to_artifact(), &ModelConfiguration::default())
                .unwrap();
        assert_eq!(model, reloaded);
    }
}
