//! Bedtime estimation
//!
//! The estimator owns a loaded [`SleepModel`], asks it how much sleep the user
//! really needs, and walks back from the wake-up time by that amount.
//!
//! Every failure is collapsed into [`ComputeError::ModelLoad`] or
//! [`ComputeError::Prediction`]. The underlying cause is logged here and not
//! passed on.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::ModelConfiguration;
use crate::error::ComputeError;
use crate::features::FeatureEncoder;
use crate::model::{LinearSleepModel, ModelError, SleepModel};
use crate::types::{Bedtime, CoffeeAmount, FeatureVector, SleepAmount, TimeComponents};

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;

/// Turns model predictions into bedtimes
#[derive(Debug, Clone)]
pub struct BedtimeEstimator<M = LinearSleepModel> {
    model: M,
}

impl BedtimeEstimator<LinearSleepModel> {
    /// Load the configured model artifact
    pub fn load(config: &ModelConfiguration) -> Result<Self, ComputeError> {
        LinearSleepModel::load(config)
            .map(Self::new)
            .map_err(model_load_failed)
    }

    /// Build an estimator from artifact JSON
    pub fn from_json(json: &str, config: &ModelConfiguration) -> Result<Self, ComputeError> {
        LinearSleepModel::from_json(json, config)
            .map(Self::new)
            .map_err(model_load_failed)
    }
}

impl<M: SleepModel> BedtimeEstimator<M> {
    /// Wrap an already loaded model
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Estimate a bedtime from encoded features.
    ///
    /// `bedtime = wake_up - predicted sleep`. The result may fall on the
    /// previous day; only its clock time is meaningful.
    pub fn estimate(
        &self,
        wake_up: NaiveDateTime,
        features: &FeatureVector,
    ) -> Result<Bedtime, ComputeError> {
        let prediction = self.model.predict(features).map_err(|e| {
            warn!(model = self.model.name(), error = %e, "sleep model prediction failed");
            ComputeError::Prediction
        })?;

        let hours = prediction.actual_sleep;
        let at = subtract_hours(wake_up, hours).ok_or_else(|| {
            warn!(
                model = self.model.name(),
                predicted_sleep_hours = hours,
                "predicted sleep cannot be subtracted from wake-up time"
            );
            ComputeError::Prediction
        })?;

        debug!(
            model = self.model.name(),
            %wake_up,
            predicted_sleep_hours = hours,
            bedtime = %at,
            "estimated bedtime"
        );

        Ok(Bedtime {
            at,
            predicted_sleep_hours: hours,
        })
    }

    /// Encode raw inputs and estimate in one step
    pub fn calculate(
        &self,
        wake_up: NaiveDateTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
    ) -> Result<Bedtime, ComputeError> {
        let features = FeatureEncoder::encode(
            &TimeComponents::from_time(&wake_up),
            sleep_amount,
            coffee_amount,
        );
        self.estimate(wake_up, &features)
    }
}

fn model_load_failed(error: ModelError) -> ComputeError {
    warn!(error = %error, "sleep model could not be loaded");
    ComputeError::ModelLoad
}

fn subtract_hours(wake_up: NaiveDateTime, hours: f64) -> Option<NaiveDateTime> {
    let nanos = (hours * NANOS_PER_HOUR).round();
    if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    wake_up.checked_sub_signed(Duration::nanoseconds(nanos as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_ERROR_MESSAGE;
    use crate::types::SleepPrediction;
    use chrono::{NaiveDate, NaiveTime, Timelike};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    /// Always predicts the same duration
    struct FixedModel(f64);

    impl SleepModel for FixedModel {
        fn predict(&self, _features: &FeatureVector) -> Result<SleepPrediction, ModelError> {
            Ok(SleepPrediction {
                actual_sleep: self.0,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Always fails with the given message
    struct FailingModel(&'static str);

    impl SleepModel for FailingModel {
        fn predict(&self, _features: &FeatureVector) -> Result<SleepPrediction, ModelError> {
            Err(ModelError::Internal(self.0.to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Predicts the requested sleep minus a quarter hour per cup
    struct CoffeeModel;

    impl SleepModel for CoffeeModel {
        fn predict(&self, features: &FeatureVector) -> Result<SleepPrediction, ModelError> {
            Ok(SleepPrediction {
                actual_sleep: features.sleep_amount - 0.25 * features.coffee_amount,
            })
        }

        fn name(&self) -> &str {
            "coffee"
        }
    }

    fn wake_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn sleep(hours: f64) -> SleepAmount {
        SleepAmount::new(hours).unwrap()
    }

    fn coffee(cups: u32) -> CoffeeAmount {
        CoffeeAmount::new(cups).unwrap()
    }

    #[test]
    fn test_seven_am_with_seven_and_a_half_hours() {
        let estimator = BedtimeEstimator::new(FixedModel(7.5));
        let bedtime = estimator.calculate(wake_at(7, 0), sleep(8.0), coffee(2)).unwrap();

        assert_eq!(bedtime.time(), NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        assert_eq!(bedtime.at.date(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(bedtime.predicted_sleep_hours, 7.5);
        assert_eq!(bedtime.format_short(), "11:30 PM");
    }

    #[test]
    fn test_midnight_wraparound() {
        let estimator = BedtimeEstimator::new(FixedModel(8.0));
        let bedtime = estimator.calculate(wake_at(0, 30), sleep(8.0), coffee(1)).unwrap();

        assert_eq!(bedtime.hour(), 16);
        assert_eq!(bedtime.minute(), 30);
    }

    #[test]
    fn test_bedtime_is_wake_minus_prediction() {
        for predicted in [4.0, 6.3, 7.25, 9.999, 11.75, 13.1] {
            let estimator = BedtimeEstimator::new(FixedModel(predicted));
            let wake = wake_at(6, 45);
            let bedtime = estimator.calculate(wake, sleep(8.0), coffee(3)).unwrap();

            let elapsed = (wake - bedtime.at).num_nanoseconds().unwrap() as f64 / NANOS_PER_HOUR;
            assert!(
                (elapsed - predicted).abs() < 1e-9,
                "predicted {predicted}, elapsed {elapsed}"
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let estimator = BedtimeEstimator::new(CoffeeModel);
        let first = estimator.calculate(wake_at(7, 15), sleep(9.5), coffee(4)).unwrap();

        for _ in 0..10 {
            let again = estimator.calculate(wake_at(7, 15), sleep(9.5), coffee(4)).unwrap();
            assert_eq!(again, first);
        }
        // 9.5h - 1h
        assert_eq!(first.format_24h(), "22:45");
    }

    #[test]
    fn test_boundary_inputs() {
        let estimator = BedtimeEstimator::new(CoffeeModel);
        for (hours, cups) in [(4.0, 1), (4.0, 20), (12.0, 1), (12.0, 20)] {
            assert!(estimator.calculate(wake_at(7, 0), sleep(hours), coffee(cups)).is_ok());
        }
    }

    #[test]
    fn test_prediction_failure_is_collapsed() {
        let estimator = BedtimeEstimator::new(FailingModel("tensor shape mismatch in layer 3"));
        let err = estimator
            .calculate(wake_at(7, 0), sleep(8.0), coffee(2))
            .unwrap_err();

        assert_eq!(err, ComputeError::Prediction);
        assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
        assert!(!err.to_string().contains("tensor"));
    }

    #[test]
    fn test_failure_does_not_affect_later_calls() {
        let failing = BedtimeEstimator::new(FailingModel("boom"));
        assert!(failing.calculate(wake_at(7, 0), sleep(8.0), coffee(2)).is_err());
        assert!(failing.calculate(wake_at(7, 0), sleep(8.0), coffee(2)).is_err());

        let estimator = BedtimeEstimator::new(FixedModel(8.0));
        let features = FeatureVector {
            wake_seconds: f64::NAN,
            sleep_amount: 8.0,
            coffee_amount: 1.0,
        };
        // Stub ignores the features, so even odd input succeeds
        assert!(estimator.estimate(wake_at(7, 0), &features).is_ok());
    }

    #[test]
    fn test_non_finite_prediction_is_prediction_error() {
        let estimator = BedtimeEstimator::new(FixedModel(f64::INFINITY));
        let err = estimator
            .calculate(wake_at(7, 0), sleep(8.0), coffee(2))
            .unwrap_err();
        assert_eq!(err, ComputeError::Prediction);
    }

    #[test]
    fn test_load_missing_artifact() {
        let config = ModelConfiguration::with_artifact_path("/nonexistent/sleep_model.json");
        let err = BedtimeEstimator::load(&config).unwrap_err();
        assert_eq!(err, ComputeError::ModelLoad);
        assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_load_corrupt_artifact() {
        let err = BedtimeEstimator::from_json("{\"format_version\": 1", &ModelConfiguration::default())
            .unwrap_err();
        assert_eq!(err, ComputeError::ModelLoad);
    }

    #[test]
    fn test_linear_model_estimate() {
        let json = r#"{
            "format_version": 1,
            "name": "SleepCalculator",
            "output": "actual_sleep",
            "intercept": 0.0,
            "coefficients": { "wake": 0.0, "estimated_sleep": 1.0, "coffee": -0.25 }
        }"#;
        let estimator = BedtimeEstimator::from_json(json, &ModelConfiguration::default()).unwrap();
        let bedtime = estimator.calculate(wake_at(7, 0), sleep(8.0), coffee(2)).unwrap();

        assert_eq!(bedtime.format_24h(), "23:30");
    }

    #[test]
    fn test_shared_across_threads() {
        let estimator = Arc::new(BedtimeEstimator::new(CoffeeModel));

        let handles: Vec<_> = (1..=4)
            .map(|cups| {
                let estimator = Arc::clone(&estimator);
                thread::spawn(move || {
                    estimator
                        .calculate(wake_at(6, 0), sleep(8.0), coffee(cups))
                        .unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let bedtime = handle.join().unwrap();
            let expected_minutes = (22 * 60) + 15 * (i as u32 + 1);
            assert_eq!(
                bedtime.at.time().num_seconds_from_midnight() / 60,
                expected_minutes
            );
        }
    }
}
