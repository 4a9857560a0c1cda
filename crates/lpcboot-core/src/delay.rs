//! Settle delays

use std::time::Duration;

/// Blocking delay between line transitions
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
