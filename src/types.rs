//! Core types for the Synheart Rest pipeline
//!
//! This module defines the data structures that flow through each stage of a
//! bedtime estimate: validated user inputs, the model feature vector, the
//! resulting bedtime, and the JSON report.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Smallest accepted sleep goal (hours)
pub const MIN_SLEEP_HOURS: f64 = 4.0;
/// Largest accepted sleep goal (hours)
pub const MAX_SLEEP_HOURS: f64 = 12.0;
/// Sleep goals are expressed in quarter hours
pub const SLEEP_STEP_HOURS: f64 = 0.25;
/// Fewest accepted cups of coffee per day
pub const MIN_COFFEE_CUPS: u32 = 1;
/// Most accepted cups of coffee per day
pub const MAX_COFFEE_CUPS: u32 = 20;

/// Hour and minute of a wake-up time.
///
/// Components are optional because they may come from lenient text input;
/// a missing component counts as 0 when features are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeComponents {
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl TimeComponents {
    /// Extract hour and minute from any clock value
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hour: Some(time.hour()),
            minute: Some(time.minute()),
        }
    }

    /// Parse `"HH:MM"` (or just `"HH"`) leniently.
    ///
    /// A part that is not a number, or is out of range, is left undefined
    /// instead of failing the whole parse.
    pub fn parse(input: &str) -> Self {
        let mut parts = input.trim().splitn(2, ':');
        let hour = parts
            .next()
            .and_then(|h| h.trim().parse::<u32>().ok())
            .filter(|h| *h < 24);
        let minute = parts
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .filter(|m| *m < 60);

        Self { hour, minute }
    }

    /// True when both components are present and in range
    pub fn is_complete(&self) -> bool {
        self.valid_hour().is_some() && self.valid_minute().is_some()
    }

    /// Hour, or 0 when missing or not below 24
    pub fn hour_or_zero(&self) -> u32 {
        self.valid_hour().unwrap_or(0)
    }

    /// Minute, or 0 when missing or not below 60
    pub fn minute_or_zero(&self) -> u32 {
        self.valid_minute().unwrap_or(0)
    }

    /// Clock time with undefined components set to 0
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour_or_zero(), self.minute_or_zero(), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    fn valid_hour(&self) -> Option<u32> {
        self.hour.filter(|h| *h < 24)
    }

    fn valid_minute(&self) -> Option<u32> {
        self.minute.filter(|m| *m < 60)
    }
}

/// Desired amount of sleep in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SleepAmount(f64);

impl SleepAmount {
    /// Validate a sleep goal: 4 to 12 hours in quarter-hour steps
    pub fn new(hours: f64) -> Result<Self, ComputeError> {
        if !hours.is_finite() || !(MIN_SLEEP_HOURS..=MAX_SLEEP_HOURS).contains(&hours) {
            return Err(ComputeError::InvalidInput(format!(
                "sleep amount must be between {MIN_SLEEP_HOURS} and {MAX_SLEEP_HOURS} hours, got {hours}"
            )));
        }
        if (hours / SLEEP_STEP_HOURS).fract() != 0.0 {
            return Err(ComputeError::InvalidInput(format!(
                "sleep amount must be a multiple of {SLEEP_STEP_HOURS} hours, got {hours}"
            )));
        }
        Ok(Self(hours))
    }

    pub fn hours(&self) -> f64 {
        self.0
    }
}

impl Default for SleepAmount {
    fn default() -> Self {
        Self(8.0)
    }
}

impl TryFrom<f64> for SleepAmount {
    type Error = ComputeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SleepAmount> for f64 {
    fn from(value: SleepAmount) -> Self {
        value.0
    }
}

/// Daily coffee intake in cups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CoffeeAmount(u32);

impl CoffeeAmount {
    /// Validate a coffee count: 1 to 20 cups
    pub fn new(cups: u32) -> Result<Self, ComputeError> {
        if !(MIN_COFFEE_CUPS..=MAX_COFFEE_CUPS).contains(&cups) {
            return Err(ComputeError::InvalidInput(format!(
                "coffee amount must be between {MIN_COFFEE_CUPS} and {MAX_COFFEE_CUPS} cups, got {cups}"
            )));
        }
        Ok(Self(cups))
    }

    pub fn cups(&self) -> u32 {
        self.0
    }

    /// Human label, e.g. "1 cup" or "3 cups"
    pub fn label(&self) -> String {
        if self.0 == 1 {
            "1 cup".to_string()
        } else {
            format!("{} cups", self.0)
        }
    }
}

impl Default for CoffeeAmount {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for CoffeeAmount {
    type Error = ComputeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CoffeeAmount> for u32 {
    fn from(value: CoffeeAmount) -> Self {
        value.0
    }
}

/// Numeric model input, one per estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Wake-up time as seconds since midnight
    pub wake_seconds: f64,
    /// Desired sleep (hours)
    pub sleep_amount: f64,
    /// Coffee cups per day
    pub coffee_amount: f64,
}

/// Named output of a sleep model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepPrediction {
    /// Predicted required sleep (hours)
    pub actual_sleep: f64,
}

/// A computed bedtime.
///
/// Only the clock time is meaningful; the date is whatever falls out of
/// subtracting the predicted sleep from the wake-up timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bedtime {
    pub at: NaiveDateTime,
    /// Sleep duration the model predicted (hours)
    pub predicted_sleep_hours: f64,
}

impl Bedtime {
    pub fn time(&self) -> NaiveTime {
        self.at.time()
    }

    pub fn hour(&self) -> u32 {
        self.at.hour()
    }

    pub fn minute(&self) -> u32 {
        self.at.minute()
    }

    /// 24-hour clock, e.g. "23:30"
    pub fn format_24h(&self) -> String {
        self.at.format("%H:%M").to_string()
    }

    /// Short 12-hour clock for display, e.g. "11:30 PM"
    pub fn format_short(&self) -> String {
        self.at.format("%-I:%M %p").to_string()
    }
}

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Inputs echoed back in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInputs {
    /// Wake-up clock time ("HH:MM")
    pub wake_up: String,
    pub sleep_amount_hours: f64,
    pub coffee_cups: u32,
}

/// Complete bedtime report payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedtimeReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub model_name: String,
    pub inputs: ReportInputs,
    pub predicted_sleep_hours: f64,
    /// Bedtime clock time ("HH:MM")
    pub bedtime: String,
    /// Full bedtime timestamp; the date may be the day before wake-up
    pub bedtime_at: NaiveDateTime,
    /// Bedtime formatted for display ("11:30 PM")
    pub bedtime_display: String,
    pub computed_at_utc: String,
}
