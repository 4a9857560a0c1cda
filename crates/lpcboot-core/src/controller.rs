//! Scoped ownership of the RESET and BOOTSTRAP lines
//!
//! A [`PinController`] resolves its pin numbers when it is built and claims
//! the lines on [`PinController::claim`]. Writes are only accepted between
//! claim and release. If the controller goes out of scope while still
//! claimed (including on an early `?` return) the lines are released, so the
//! target is never left held in reset or bootstrap by a failed run.
//!
//! [`PinController::leave_claimed`] is the one way out that skips the
//! release, for callers that deliberately keep the last driven levels.

use crate::error::{Error, Result};
use crate::gpio::GpioLines;
use crate::pin::{Pin, PinMap, PinState};

/// Owner of both control lines for one process invocation
pub struct PinController<G: GpioLines> {
    gpio: G,
    offsets: [u32; 2],
    claimed: bool,
}

impl<G: GpioLines> PinController<G> {
    /// Bind a backend to a pin map without touching the hardware
    ///
    /// Pin numbers are resolved here, once, so every later write goes to
    /// the same line for the lifetime of the controller.
    pub fn new(gpio: G, pins: &PinMap) -> Result<Self> {
        let offsets = pins.resolve()?;
        log::debug!(
            "pins: RESET={} BOOTSTRAP={} ({:?} numbering) -> lines {} and {}",
            pins.reset,
            pins.bootstrap,
            pins.numbering,
            offsets[Pin::Reset as usize],
            offsets[Pin::Bootstrap as usize]
        );

        Ok(Self {
            gpio,
            offsets,
            claimed: false,
        })
    }

    /// Build a controller and claim its lines in one step
    pub fn open(gpio: G, pins: &PinMap) -> Result<Self> {
        let mut controller = Self::new(gpio, pins)?;
        controller.claim()?;
        Ok(controller)
    }

    /// Claim both lines as outputs, both driven [`PinState::Inactive`]
    ///
    /// Claiming an already claimed controller is a no-op.
    pub fn claim(&mut self) -> Result<()> {
        if self.claimed {
            return Ok(());
        }

        self.gpio
            .claim(&self.offsets, PinState::Inactive.level())
            .map_err(Error::ResourceUnavailable)?;
        self.claimed = true;

        log::info!(
            "Claimed RESET (line {}) and BOOTSTRAP (line {}) on {}",
            self.offsets[Pin::Reset as usize],
            self.offsets[Pin::Bootstrap as usize],
            self.gpio.describe()
        );
        Ok(())
    }

    /// Drive `pin` to `state`
    pub fn set(&mut self, pin: Pin, state: PinState) -> Result<()> {
        if !self.claimed {
            return Err(Error::NotClaimed(pin));
        }

        let level = state.level();
        log::debug!("{} -> {:?} ({:?})", pin, state, level);
        self.gpio
            .write(self.offsets[pin as usize], level)
            .map_err(|source| Error::WriteFailed { pin, source })
    }

    /// Release both lines; does nothing if they are not claimed
    pub fn release(&mut self) {
        if !self.claimed {
            return;
        }

        self.gpio.release();
        self.claimed = false;
        log::info!("Released GPIO lines on {}", self.gpio.describe());
    }

    /// Whether the lines are currently claimed
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Resolved line offset of `pin`
    pub fn offset(&self, pin: Pin) -> u32 {
        self.offsets[pin as usize]
    }

    /// Drop the controller without releasing the lines
    ///
    /// The backend is dropped without [`GpioLines::release`], so the lines are
    /// not floated. On the GPIO character device the kernel frees the line
    /// request as soon as the backend's handle is closed; on Raspberry Pi the
    /// lines then keep their last driven levels.
    pub fn leave_claimed(mut self) {
        if self.claimed {
            log::debug!("Leaving GPIO lines claimed");
        }
        self.claimed = false;
    }
}

impl<G: GpioLines> Drop for PinController<G> {
    fn drop(&mut self) {
        if self.claimed {
            log::debug!("PinController dropped while claimed, releasing lines");
            self.release();
        }
    }
}
