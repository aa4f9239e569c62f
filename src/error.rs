//! Error types for configuration and problem construction.

use thiserror::Error;

/// Errors raised when building engines, detectors, arms, or problems.
///
/// Numerical edge cases inside the detectors are not errors: they are mapped
/// to "no detection" (or to a `+∞` threshold) by explicit clamps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A numeric parameter is outside its valid domain.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The detection window cannot fit inside the horizon.
    #[error("window size {window} must be smaller than the horizon {horizon}")]
    WindowExceedsHorizon { window: usize, horizon: usize },

    /// An explicit distance vector does not have one entry per player.
    #[error("distance vector has {actual} entries, expected one per player ({expected})")]
    DistanceLengthMismatch { expected: usize, actual: usize },

    /// A piecewise-stationary problem is malformed.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),
}

/// Result type alias for fallible constructors.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject anything that is not a finite number strictly inside `(lo, hi)`.
pub(crate) fn check_open_interval(name: &'static str, value: f64, lo: f64, hi: f64) -> Result<f64> {
    if value.is_finite() && value > lo && value < hi {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must lie in the open interval",
        })
    }
}

/// Reject anything that is not a finite, strictly positive number.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}

/// Reject a user-supplied threshold that is NaN or negative.
///
/// `+∞` is accepted and means "never alarm".
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<f64> {
    if value.is_nan() || value < 0.0 {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be >= 0 (use +inf to disable alarms)",
        })
    } else {
        Ok(value)
    }
}
