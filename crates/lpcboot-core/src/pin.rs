//! Control lines, logical states and pin numbering
//!
//! The target board wires two active-low signals to the host header:
//!
//! | Signal    | Header pin | BCM line |
//! |-----------|------------|----------|
//! | RESET     | 16         | 23       |
//! | BOOTSTRAP | 18         | 24       |
//!
//! Pins are configured by header position ([`Numbering::Board`]) so the same
//! wiring works regardless of which SoC sits behind the header. The GPIO
//! character device only understands line offsets, so board positions are
//! resolved once, when a [`PinMap`] is turned into offsets.

use crate::error::{Error, Result};
use core::fmt;
use core::str::FromStr;

/// Physical level of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Logical state of an active-low control line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    /// Asserted (driven low)
    Active,
    /// Deasserted (driven high)
    Inactive,
}

impl PinState {
    /// Physical level that expresses this state on an active-low line
    pub const fn level(self) -> Level {
        match self {
            PinState::Active => Level::Low,
            PinState::Inactive => Level::High,
        }
    }
}

/// One of the two control lines wired to the target
///
/// The discriminant doubles as the index into resolved offset arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    Reset = 0,
    Bootstrap = 1,
}

impl Pin {
    /// Both control lines, in claim order
    pub const ALL: [Pin; 2] = [Pin::Reset, Pin::Bootstrap];

    /// Header position the line is wired to on the reference hat
    pub const fn default_position(self) -> u32 {
        match self {
            Pin::Reset => 16,
            Pin::Bootstrap => 18,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Pin::Reset => "RESET",
            Pin::Bootstrap => "BOOTSTRAP",
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How configured pin numbers are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    /// Physical position on the 40-pin header
    #[default]
    Board,
    /// Raw line offset on the GPIO chip
    Offset,
}

impl FromStr for Numbering {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "board" => Ok(Numbering::Board),
            "offset" | "bcm" => Ok(Numbering::Offset),
            _ => Err(Error::InvalidOption(format!(
                "numbering must be 'board' or 'offset', got '{}'",
                s
            ))),
        }
    }
}

/// Raspberry Pi 40-pin header: position -> BCM line offset
///
/// Index 0 is unused; power and ground positions map to `None`.
const HEADER_40PIN: [Option<u32>; 41] = [
    None,     // (unused)
    None,     // 1: 3V3
    None,     // 2: 5V
    Some(2),  // 3
    None,     // 4: 5V
    Some(3),  // 5
    None,     // 6: GND
    Some(4),  // 7
    Some(14), // 8
    None,     // 9: GND
    Some(15), // 10
    Some(17), // 11
    Some(18), // 12
    Some(27), // 13
    None,     // 14: GND
    Some(22), // 15
    Some(23), // 16
    None,     // 17: 3V3
    Some(24), // 18
    Some(10), // 19
    None,     // 20: GND
    Some(9),  // 21
    Some(25), // 22
    Some(11), // 23
    Some(8),  // 24
    None,     // 25: GND
    Some(7),  // 26
    Some(0),  // 27
    Some(1),  // 28
    Some(5),  // 29
    None,     // 30: GND
    Some(6),  // 31
    Some(12), // 32
    Some(13), // 33
    None,     // 34: GND
    Some(19), // 35
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    None,     // 39: GND
    Some(21), // 40
];

/// Translate a header position to its GPIO line offset
pub fn board_to_offset(position: u32) -> Option<u32> {
    HEADER_40PIN.get(position as usize).copied().flatten()
}

/// Pin numbers for RESET and BOOTSTRAP under one numbering scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub numbering: Numbering,
    pub reset: u32,
    pub bootstrap: u32,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            numbering: Numbering::Board,
            reset: Pin::Reset.default_position(),
            bootstrap: Pin::Bootstrap.default_position(),
        }
    }
}

impl PinMap {
    /// Configured number of a pin, in this map's numbering
    pub fn number(&self, pin: Pin) -> u32 {
        match pin {
            Pin::Reset => self.reset,
            Pin::Bootstrap => self.bootstrap,
        }
    }

    /// Resolve both pins to GPIO line offsets, indexed by `Pin as usize`
    pub fn resolve(&self) -> Result<[u32; 2]> {
        let mut offsets = [0u32; 2];
        for pin in Pin::ALL {
            let number = self.number(pin);
            offsets[pin as usize] = match self.numbering {
                Numbering::Board => board_to_offset(number).ok_or(Error::UnknownPin(number))?,
                Numbering::Offset => number,
            };
        }

        if offsets[Pin::Reset as usize] == offsets[Pin::Bootstrap as usize] {
            return Err(Error::InvalidOption(format!(
                "RESET and BOOTSTRAP both resolve to line {}",
                offsets[0]
            )));
        }

        Ok(offsets)
    }

    /// Pull pin options out of a backend option list
    ///
    /// Recognised keys are `numbering`, `reset` and `bootstrap`. Every other
    /// pair is returned untouched so the backend can interpret it.
    pub fn parse_options<'a>(
        options: &[(&'a str, &'a str)],
    ) -> Result<(Self, Vec<(&'a str, &'a str)>)> {
        let mut map = PinMap::default();
        let mut rest = Vec::new();

        for &(key, value) in options {
            match key {
                "numbering" => map.numbering = value.parse()?,
                "reset" => map.reset = parse_number(key, value)?,
                "bootstrap" => map.bootstrap = parse_number(key, value)?,
                _ => rest.push((key, value)),
            }
        }

        Ok((map, rest))
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::InvalidOption(format!("Invalid {} value: {}", key, value)))
}
