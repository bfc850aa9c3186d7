//! Feature encoding
//!
//! This module converts user-facing inputs into the numeric feature vector
//! consumed by a sleep model:
//! - Wake-up time as seconds since midnight
//! - Sleep goal in hours
//! - Coffee intake in cups

use tracing::warn;

use crate::types::{CoffeeAmount, FeatureVector, SleepAmount, TimeComponents};

const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Feature encoder for building model inputs
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Encode validated inputs into a feature vector
    pub fn encode(
        wake_up: &TimeComponents,
        sleep_amount: SleepAmount,
        coffee_amount: CoffeeAmount,
    ) -> FeatureVector {
        FeatureVector {
            wake_seconds: wake_seconds(wake_up),
            sleep_amount: sleep_amount.hours(),
            coffee_amount: f64::from(coffee_amount.cups()),
        }
    }
}

/// Seconds since midnight. Undefined components count as 0.
fn wake_seconds(wake_up: &TimeComponents) -> f64 {
    if !wake_up.is_complete() {
        warn!(
            hour = ?wake_up.hour,
            minute = ?wake_up.minute,
            "wake-up time has missing or out-of-range components, treating them as 0"
        );
    }

    let hour = f64::from(wake_up.hour_or_zero());
    let minute = f64::from(wake_up.minute_or_zero());
    hour * SECONDS_PER_HOUR + minute * SECONDS_PER_MINUTE
}
