//! Synheart Rest - On-device bedtime estimation
//!
//! Rest estimates when to go to bed from a desired wake-up time, a sleep goal
//! and daily coffee intake, using a pre-fitted regression model:
//! feature encoding → model prediction → bedtime = wake-up − predicted sleep.
//!
//! ## Modules
//!
//! - **Features**: Encode user inputs into the model's feature vector
//! - **Estimator**: Run the model and derive a bedtime
//! - **Pipeline**: Raw inputs to JSON reports, stateless or with a loaded processor

pub mod alert;
pub mod config;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use alert::BedtimeAlert;
pub use config::ModelConfiguration;
pub use error::{ComputeError, GENERIC_ERROR_MESSAGE};
pub use estimator::BedtimeEstimator;
pub use features::FeatureEncoder;
pub use model::{LinearSleepModel, ModelError, SleepModel};
pub use pipeline::{calculate_bedtime, RestProcessor};
pub use types::{Bedtime, CoffeeAmount, FeatureVector, SleepAmount, TimeComponents};

/// Rest version embedded in all reports
pub const REST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-rest";
