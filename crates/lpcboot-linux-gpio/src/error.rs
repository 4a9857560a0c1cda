//! Error types for the Linux GPIO backend

use thiserror::Error;

/// Linux GPIO specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request the output lines
    #[error("Failed to request lines {offsets:?} on '{device}': {source}")]
    LineRequestFailed {
        device: String,
        offsets: Vec<u32>,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to set GPIO line value
    #[error("Failed to set line {offset}: {source}")]
    SetValueFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Write to a line that is not part of the current request
    #[error("Line {0} has not been requested")]
    NotRequested(u32),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
