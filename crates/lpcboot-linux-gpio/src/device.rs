//! Linux GPIO character device backend
//!
//! Lines are requested from `/dev/gpiochipN` through gpiocdev. The request is
//! only made on [`GpioLines::claim`], so a busy line surfaces as a claim
//! failure rather than an open failure.
//!
//! Levels are written raw: `Level::High` maps to `Value::Active` on a line
//! requested without the active-low flag. The active-low translation of the
//! RESET and BOOTSTRAP signals is done by lpcboot-core before a level gets
//! here.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use lpcboot_core::{BackendError, GpioLines, Level};

/// Default GPIO chip (the 40-pin header on Raspberry Pi boards)
pub const DEFAULT_DEVICE: &str = "/dev/gpiochip0";

/// Consumer label shown by `gpioinfo` while the lines are held
pub const DEFAULT_CONSUMER: &str = "lpcboot";

/// Configuration for the Linux GPIO backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// Consumer label for the line request
    pub consumer: String,
}

impl Default for LinuxGpioConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            consumer: DEFAULT_CONSUMER.to_string(),
        }
    }
}

impl LinuxGpioConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }
}

fn to_value(level: Level) -> Value {
    match level {
        Level::High => Value::Active,
        Level::Low => Value::Inactive,
    }
}

/// Output lines on one Linux GPIO chip
pub struct LinuxGpio {
    config: LinuxGpioConfig,
    /// Active line request, present between claim and release
    request: Option<Request>,
    offsets: Vec<Offset>,
}

impl LinuxGpio {
    pub fn new(config: LinuxGpioConfig) -> Self {
        log::debug!("linux_gpio: using {}", config.device);
        Self {
            config,
            request: None,
            offsets: Vec::new(),
        }
    }

    fn request_lines(&self, offsets: &[Offset], initial: Level) -> Result<Request> {
        let mut req_config = Config::default();
        req_config.with_lines(offsets).as_output(to_value(initial));

        Request::from_config(req_config)
            .on_chip(&self.config.device)
            .with_consumer(self.config.consumer.as_str())
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                device: self.config.device.clone(),
                offsets: offsets.to_vec(),
                source,
            })
    }

    fn set(&self, offset: Offset, level: Level) -> Result<()> {
        let request = self
            .request
            .as_ref()
            .filter(|_| self.offsets.contains(&offset))
            .ok_or(LinuxGpioError::NotRequested(offset))?;

        request
            .set_value(offset, to_value(level))
            .map_err(|source| LinuxGpioError::SetValueFailed { offset, source })
    }
}

impl GpioLines for LinuxGpio {
    fn describe(&self) -> String {
        self.config.device.clone()
    }

    fn claim(&mut self, offsets: &[u32], initial: Level) -> std::result::Result<(), BackendError> {
        let request = self.request_lines(offsets, initial)?;
        log::debug!(
            "linux_gpio: requested lines {:?} on {} as {}",
            offsets,
            self.config.device,
            self.config.consumer
        );
        self.request = Some(request);
        self.offsets = offsets.to_vec();
        Ok(())
    }

    fn write(&mut self, offset: u32, level: Level) -> std::result::Result<(), BackendError> {
        Ok(self.set(offset, level)?)
    }

    fn release(&mut self) {
        let Some(request) = self.request.take() else {
            return;
        };

        // Float the lines before handing them back, like RPi.GPIO's cleanup
        let mut cfg = Config::default();
        cfg.with_lines(&self.offsets).as_input();
        if let Err(e) = request.reconfigure(&cfg) {
            log::warn!("linux_gpio: failed to switch lines to input: {}", e);
        }

        drop(request);
        self.offsets.clear();
    }
}

fn invalid(msg: impl Into<String>) -> LinuxGpioError {
    LinuxGpioError::InvalidParameter(msg.into())
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (default `/dev/gpiochip0`)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `consumer=NAME` - consumer label for the line request (default `lpcboot`)
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioConfig> {
    let mut config = LinuxGpioConfig::default();
    let mut device: Option<String> = None;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                device = Some(value.to_string());
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| invalid(format!("Invalid gpiochip value: {}", value)))?,
                );
            }
            "consumer" => {
                if value.is_empty() {
                    return Err(invalid("consumer must not be empty"));
                }
                config.consumer = value.to_string();
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    match (device, gpiochip) {
        (Some(_), Some(_)) => {
            return Err(invalid("Only one of 'dev' or 'gpiochip' can be specified"));
        }
        (Some(dev), None) if dev.is_empty() => {
            return Err(invalid("dev must not be empty"));
        }
        (Some(dev), None) => config.device = dev,
        (None, Some(n)) => config.device = format!("/dev/gpiochip{}", n),
        (None, None) => {}
    }

    Ok(config)
}
