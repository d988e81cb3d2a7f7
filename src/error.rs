//! Construction-time error types.
//!
//! Everything that can go wrong is rejected while a race is being set up.
//! The per-tick simulation path is total and never returns these.

use thiserror::Error;

/// A race could not be configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A race needs at least one level to be winnable.
    #[error("race must have at least one level")]
    ZeroLevels,

    /// A tuning value is negative, zero where it must be positive, or not finite.
    #[error("`{name}` = {value} is outside its valid range {range}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        range: &'static str,
    },

    /// The drivable and border masks must cover the same area.
    #[error("track mask `{mask}` is {got:?}, expected {expected:?}")]
    MaskSizeMismatch {
        mask: &'static str,
        got: (u32, u32),
        expected: (u32, u32),
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used by constructors.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reject values that are negative or not finite.
pub(crate) fn non_negative(name: &'static str, value: f32) -> ConfigResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            range: "[0, ∞)",
        })
    }
}

/// Reject values that are not strictly positive and finite.
pub(crate) fn positive(name: &'static str, value: f32) -> ConfigResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            range: "(0, ∞)",
        })
    }
}
