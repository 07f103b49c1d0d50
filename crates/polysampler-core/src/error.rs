//! Error types for polysampler-core.

use thiserror::Error;

/// Result type alias for polysampler-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in polysampler-core.
///
/// Only control-path operations return these. The render path degrades
/// silently instead (unmapped note, exhausted pool).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Sample descriptor declares no frames.
    #[error("Sample has zero frames")]
    ZeroFrameCount,

    /// Only mono and stereo sample data is supported.
    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannelCount(u32),

    /// Sample data slice is shorter than `channels * frames`.
    #[error("Sample data too short: expected {expected} values, got {actual}")]
    DataTooShort { expected: usize, actual: usize },

    /// Sample rate is not a finite positive number.
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
