//! lpcboot-linux-gpio - Linux GPIO character device backend
//!
//! This crate drives the RESET and BOOTSTRAP lines through the Linux GPIO
//! character device interface (gpiocdev), the replacement for the deprecated
//! sysfs interface.
//!
//! # Example
//!
//! ```no_run
//! use lpcboot_core::{PinController, PinMap, Pin, PinState};
//! use lpcboot_linux_gpio::{LinuxGpio, LinuxGpioConfig};
//!
//! let gpio = LinuxGpio::new(LinuxGpioConfig::new("/dev/gpiochip0"));
//! let mut controller = PinController::open(gpio, &PinMap::default())?;
//! controller.set(Pin::Reset, PinState::Active)?;
//! controller.release();
//! # Ok::<(), lpcboot_core::Error>(())
//! ```
//!
//! # Usage with the lpcboot tools
//!
//! ```bash
//! # Default: /dev/gpiochip0, header pins 16 (RESET) and 18 (BOOTSTRAP)
//! lpc-gpio -g linux_gpio -r
//!
//! # Other chip, raw line offsets
//! lpc-gpio -g linux_gpio:gpiochip=1,numbering=offset,reset=5,bootstrap=6 -r
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpio, LinuxGpioConfig};
pub use error::{LinuxGpioError, Result};

/// Open the Linux GPIO backend from parsed option pairs
pub fn open_linux_gpio(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn lpcboot_core::GpioLines>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    Ok(Box::new(LinuxGpio::new(config)))
}
