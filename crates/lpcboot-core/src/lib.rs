//! lpcboot-core - Reset/bootstrap line sequencing for LPC210x targets
//!
//! This crate holds everything the `lpc-gpio` and `lpc-program` tools share:
//!
//! - [`pin`] - the two control lines, their active-low states and how header
//!   positions resolve to GPIO line offsets
//! - [`gpio`] - the [`GpioLines`] trait that hardware backends implement
//! - [`controller`] - [`PinController`], the scoped owner of both lines
//! - [`manual`] - flag-driven one-shot line control
//! - [`sequence`] - the timed in-system-programming entry/exit sequence
//!
//! # Active-low lines
//!
//! Both RESET and BOOTSTRAP are active-low. Callers always speak in terms of
//! [`PinState::Active`] / [`PinState::Inactive`]; the conversion to a physical
//! [`Level`] happens in exactly one place, [`PinState::level`].
//!
//! # Example
//!
//! ```no_run
//! use lpcboot_core::{ManualActions, PinMap};
//! # fn open() -> Box<dyn lpcboot_core::GpioLines> { unimplemented!() }
//!
//! let actions = ManualActions {
//!     reset_activate: true,
//!     ..Default::default()
//! };
//! lpcboot_core::run_manual(open(), &PinMap::default(), &actions)?;
//! # Ok::<(), lpcboot_core::Error>(())
//! ```

pub mod controller;
pub mod delay;
pub mod error;
pub mod gpio;
pub mod manual;
pub mod options;
pub mod pin;
pub mod process;
pub mod sequence;

#[cfg(test)]
mod testutil;

pub use controller::PinController;
pub use delay::{Delay, StdDelay};
pub use error::{BackendError, Error, Result};
pub use gpio::GpioLines;
pub use manual::{run_manual, ManualActions};
pub use pin::{Level, Numbering, Pin, PinMap, PinState};
pub use process::{ProcessRunner, SystemRunner};
pub use sequence::{ExitPolicy, ProgramSequence, SequenceConfig, SequenceOutcome, Step};
