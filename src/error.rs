//! Error types for Synheart Rest

use thiserror::Error;

/// Message shown to the user for every estimation failure
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, there was a problem calculating your bedtime.";

/// Errors that can occur during bedtime computation
///
/// `ModelLoad` and `Prediction` intentionally carry no detail: the cause is
/// logged where it happens and the caller only ever sees the generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    #[error("{}", GENERIC_ERROR_MESSAGE)]
    ModelLoad,

    #[error("{}", GENERIC_ERROR_MESSAGE)]
    Prediction,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl ComputeError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            ComputeError::ModelLoad => "MODEL_LOAD_ERROR",
            ComputeError::Prediction => "PREDICTION_ERROR",
            ComputeError::InvalidInput(_) => "INVALID_INPUT",
            ComputeError::EncodingError(_) => "ENCODING_ERROR",
        }
    }
}
