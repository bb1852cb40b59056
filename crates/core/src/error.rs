//! Error types for the flowfield core.

use thiserror::Error;

/// Errors produced by sketch construction, configuration and output.
///
/// The per-frame simulation itself never fails; these cover the edges
/// around it (bad dimensions, bad parameters, bad names, file I/O).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or their product overflowed).
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A parameter value was present but outside its valid domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A palette name did not match any known palette mode.
    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    /// A key script entry could not be parsed.
    #[error("invalid key event: {0}")]
    InvalidKeyEvent(String),

    /// Writing or reading an output file failed.
    #[error("I/O error: {0}")]
    Io(String),
}
