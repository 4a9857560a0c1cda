//! lpcboot-dummy - In-memory GPIO backend
//!
//! This crate provides a GPIO backend that only remembers line levels and
//! logs every change. It's useful for trying out the tools and the program
//! sequence on a machine with no target attached.

use lpcboot_core::{BackendError, GpioLines, Level};
use std::collections::BTreeMap;

/// Configuration for the dummy backend
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    /// Refuse every claim, as if another process held the lines
    pub busy: bool,
}

/// Dummy GPIO backend
#[derive(Debug, Default)]
pub struct DummyGpio {
    config: DummyConfig,
    /// Levels of the currently claimed lines
    lines: BTreeMap<u32, Level>,
    claimed: bool,
    writes: usize,
    releases: usize,
}

impl DummyGpio {
    /// Create a new dummy backend with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Current level of a claimed line
    pub fn level(&self, offset: u32) -> Option<Level> {
        self.lines.get(&offset).copied()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Number of successful writes since creation
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of releases since creation
    pub fn releases(&self) -> usize {
        self.releases
    }
}

impl GpioLines for DummyGpio {
    fn describe(&self) -> String {
        "dummy".to_string()
    }

    fn claim(&mut self, offsets: &[u32], initial: Level) -> Result<(), BackendError> {
        if self.config.busy {
            return Err("dummy: lines are busy".into());
        }
        if self.claimed {
            return Err("dummy: lines already claimed".into());
        }

        self.lines = offsets.iter().map(|&offset| (offset, initial)).collect();
        self.claimed = true;
        log::info!("dummy: claimed lines {:?} at {:?}", offsets, initial);
        Ok(())
    }

    fn write(&mut self, offset: u32, level: Level) -> Result<(), BackendError> {
        if !self.claimed {
            return Err(format!("dummy: line {} is not claimed", offset).into());
        }
        let Some(current) = self.lines.get_mut(&offset) else {
            return Err(format!("dummy: line {} is not claimed", offset).into());
        };

        *current = level;
        self.writes += 1;
        log::info!("dummy: line {} -> {:?}", offset, level);
        Ok(())
    }

    fn release(&mut self) {
        if !self.claimed {
            return;
        }
        self.lines.clear();
        self.claimed = false;
        self.releases += 1;
        log::info!("dummy: released lines");
    }
}

/// Parse dummy backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `busy=1` - fail every claim
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "busy" => {
                config.busy = match *value {
                    "1" | "true" | "yes" => true,
                    "0" | "false" | "no" => false,
                    _ => return Err(format!("Invalid busy value: {}", value)),
                };
            }
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }

    Ok(config)
}
