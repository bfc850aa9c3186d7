//! User-facing outcome of a bedtime calculation

use serde::{Deserialize, Serialize};

use crate::error::{ComputeError, GENERIC_ERROR_MESSAGE};
use crate::types::Bedtime;

pub const SUCCESS_TITLE: &str = "Your ideal bedtime is...";
pub const ERROR_TITLE: &str = "Error";

/// Title and message to show after a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedtimeAlert {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl BedtimeAlert {
    pub fn success(bedtime: &Bedtime) -> Self {
        Self::success_with_message(bedtime.format_short())
    }

    /// Success alert for an already formatted bedtime
    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            title: SUCCESS_TITLE.to_string(),
            message: message.into(),
            is_error: false,
        }
    }

    /// Every error kind shows the same generic message
    pub fn failure(_error: &ComputeError) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            message: GENERIC_ERROR_MESSAGE.to_string(),
            is_error: true,
        }
    }

    pub fn from_result(result: &Result<Bedtime, ComputeError>) -> Self {
        match result {
            Ok(bedtime) => Self::success(bedtime),
            Err(e) => Self::failure(e),
        }
    }
}
