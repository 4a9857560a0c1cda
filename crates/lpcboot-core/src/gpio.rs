//! GPIO backend trait
//!
//! A backend gives the controller raw output-line access on one GPIO chip.
//! It never sees logical pin states: the active-low translation has already
//! happened by the time a [`Level`] reaches it.

use crate::error::BackendError;
use crate::pin::Level;

/// Output-line access to a GPIO controller
pub trait GpioLines {
    /// Short description used in log messages (e.g. the chip path)
    fn describe(&self) -> String;

    /// Request exclusive ownership of `offsets` as outputs driven at `initial`
    ///
    /// Fails if the lines are held by another consumer, the caller lacks
    /// permission, or the chip does not exist.
    fn claim(&mut self, offsets: &[u32], initial: Level) -> Result<(), BackendError>;

    /// Drive one previously claimed line
    fn write(&mut self, offset: u32, level: Level) -> Result<(), BackendError>;

    /// Give the claimed lines back, leaving them floating
    ///
    /// Called at most once per successful `claim`.
    fn release(&mut self);
}

impl<G: GpioLines + ?Sized> GpioLines for Box<G> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn claim(&mut self, offsets: &[u32], initial: Level) -> Result<(), BackendError> {
        (**self).claim(offsets, initial)
    }

    fn write(&mut self, offset: u32, level: Level) -> Result<(), BackendError> {
        (**self).write(offset, level)
    }

    fn release(&mut self) {
        (**self).release()
    }
}
