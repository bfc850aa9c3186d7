//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Rest.
//! It orchestrates the full flow from raw inputs to a JSON bedtime report.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::config::ModelConfiguration;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::estimator::BedtimeEstimator;
use crate::features::FeatureEncoder;
use crate::model::{LinearSleepModel, SleepModel};
use crate::types::{BedtimeReport, CoffeeAmount, SleepAmount, TimeComponents};

/// Compute a bedtime report from a model artifact and raw inputs.
///
/// # Arguments
/// * `model_json` - Linear sleep model artifact JSON
/// * `wake_up` - Wake-up clock time ("HH:MM")
/// * `sleep_amount` - Desired sleep in hours (4-12, quarter-hour steps)
/// * `coffee_amount` - Cups of coffee per day (1-20)
///
/// # Returns
/// Bedtime report JSON
///
/// # Example
/// ```ignore
/// let report = calculate_bedtime(model_json, "07:00".to_string(), 8.0, 2)?;
/// ```
pub fn calculate_bedtime(
    model_json: String,
    wake_up: String,
    sleep_amount: f64,
    coffee_amount: u32,
) -> Result<String, ComputeError> {
    let processor = RestProcessor::from_json(&model_json, &ModelConfiguration::default())?;
    processor.process(&wake_up, sleep_amount, coffee_amount)
}

/// Processor holding one loaded model for repeated calculations.
///
/// The model is read-only once loaded, so a processor can serve any number
/// of requests.
pub struct RestProcessor<M = LinearSleepModel> {
    estimator: BedtimeEstimator<M>,
    encoder: ReportEncoder,
}

impl RestProcessor<LinearSleepModel> {
    /// Load the configured model artifact
    pub fn load(config: &ModelConfiguration) -> Result<Self, ComputeError> {
        Ok(Self::with_estimator(BedtimeEstimator::load(config)?))
    }

    /// Build a processor from artifact JSON
    pub fn from_json(json: &str, config: &ModelConfiguration) -> Result<Self, ComputeError> {
        Ok(Self::with_estimator(BedtimeEstimator::from_json(json, config)?))
    }
}

impl<M: SleepModel> RestProcessor<M> {
    pub fn with_estimator(estimator: BedtimeEstimator<M>) -> Self {
        Self {
            estimator,
            encoder: ReportEncoder::new(),
        }
    }

    pub fn estimator(&self) -> &BedtimeEstimator<M> {
        &self.estimator
    }

    /// Validate raw inputs and return report JSON.
    ///
    /// The wake-up time is anchored to today's local date.
    pub fn process(
        &self,
        wake_up: &str,
        sleep_amount: f64,
        coffee_amount: u32,
    ) -> Result<String, ComputeError> {
        let report = self.report(
            Local::now().date_naive(),
            &TimeComponents::parse(wake_up),
            SleepAmount::new(sleep_amount)?,
            CoffeeAmount::new(coffee_amount)?,
        )?;

        serde_json::to_string_pretty(&report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Compute a report for a wake-up time on the given date
    pub fn report(
        &self,
        date: NaiveDate,
        wake_up: &TimeComponents,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
    ) -> Result<BedtimeReport, ComputeError> {
        let wake_up_at = NaiveDateTime::new(date, wake_up.to_naive_time());
        let features = FeatureEncoder::encode(wake_up, sleep_amount, coffee_amount);
        let bedtime = self.estimator.estimate(wake_up_at, &features)?;

        Ok(self.encoder.encode(
            self.estimator.model().name(),
            wake_up_at,
            sleep_amount,
            coffee_amount,
            &bedtime,
        ))
    }
}
