//! Error types for lpcboot-core

use crate::pin::Pin;
use thiserror::Error;

/// Error type handed back by [`GpioLines`](crate::GpioLines) backends
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The GPIO lines could not be claimed (busy, no permission, no device)
    #[error("GPIO lines unavailable: {0}")]
    ResourceUnavailable(#[source] BackendError),

    /// A write was attempted outside of claim/release
    #[error("{0} line written while the controller is not claimed")]
    NotClaimed(Pin),

    /// The backend rejected a write on a claimed line
    #[error("Failed to drive {pin} line: {source}")]
    WriteFailed {
        pin: Pin,
        #[source]
        source: BackendError,
    },

    /// An external program could not be started
    #[error("Failed to start '{program}': {source}")]
    ChildProcess {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Header position that is not wired to a GPIO line
    #[error("Header pin {0} is not a GPIO line")]
    UnknownPin(u32),

    /// Malformed or inconsistent option string
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Result type for lpcboot-core operations
pub type Result<T> = std::result::Result<T, Error>;
