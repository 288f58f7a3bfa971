//! Error types for controller construction.

use std::time::Duration;

use thiserror::Error;

/// Errors raised when validating controller configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A broadcast interval is below the supported floor.
    #[error("{name} of {actual:?} is below the minimum of {minimum:?}")]
    IntervalTooShort {
        name: &'static str,
        actual: Duration,
        minimum: Duration,
    },

    /// The controller cannot serve the neutral coalition.
    #[error("controller coalition must be red or blue")]
    NeutralCoalition,

    /// A threat radius must be a positive distance.
    #[error("threat radius for {class} must be positive, got {radius_nm}")]
    InvalidThreatRadius { class: String, radius_nm: f64 },
}
