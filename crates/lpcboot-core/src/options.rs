//! `key=value` option strings
//!
//! Backends and the program sequence are configured with short strings in
//! the form `name:key1=value1,key2=value2` (backend) or `key=value,...`
//! (sequence), passed on the command line or through the environment.

use crate::error::{Error, Result};

/// Split `key1=value1,key2=value2` into pairs, preserving order
///
/// Empty input and empty segments (e.g. a trailing comma) yield no pairs.
pub fn parse_options(s: &str) -> Result<Vec<(&str, &str)>> {
    let mut options = Vec::new();

    for opt in s.split(',').map(str::trim).filter(|opt| !opt.is_empty()) {
        match opt.split_once('=') {
            Some((key, value)) if !key.is_empty() => options.push((key.trim(), value.trim())),
            _ => {
                return Err(Error::InvalidOption(format!(
                    "Invalid parameter format: '{}' (expected key=value)",
                    opt
                )))
            }
        }
    }

    Ok(options)
}

/// Split `name:key=value,...` into the name and its options
pub fn parse_named_options(s: &str) -> Result<(&str, Vec<(&str, &str)>)> {
    let (name, opts) = s.split_once(':').unwrap_or((s, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidOption(format!("Missing name in '{}'", s)));
    }
    Ok((name, parse_options(opts)?))
}
