//! Report encoding
//!
//! This module encodes a computed bedtime into a JSON report payload.
//! Every report carries producer metadata so results can be traced back to
//! the library build and processor instance that produced them.

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::types::{
    Bedtime, BedtimeReport, CoffeeAmount, ReportInputs, ReportProducer, SleepAmount,
};
use crate::{PRODUCER_NAME, REST_VERSION};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder for producing bedtime payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a bedtime and the inputs it was computed from
    pub fn encode(
        &self,
        model_name: &str,
        wake_up: NaiveDateTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
        bedtime: &Bedtime,
    ) -> BedtimeReport {
        BedtimeReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: REST_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            model_name: model_name.to_string(),
            inputs: ReportInputs {
                wake_up: wake_up.format("%H:%M").to_string(),
                sleep_amount_hours: sleep_amount.hours(),
                coffee_cups: coffee_amount.cups(),
            },
            predicted_sleep_hours: bedtime.predicted_sleep_hours,
            bedtime: bedtime.format_24h(),
            bedtime_at: bedtime.at,
            bedtime_display: bedtime.format_short(),
            computed_at_utc: Utc::now().to_rfc3339(),
        }
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(
        &self,
        model_name: &str,
        wake_up: NaiveDateTime,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
        bedtime: &Bedtime,
    ) -> Result<String, serde_json::Error> {
        let report = self.encode(model_name, wake_up, sleep_amount, coffee_amount, bedtime);
        serde_json::to_string_pretty(&report)
    }
}
