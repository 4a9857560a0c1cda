//! Backend registry and initialization
//!
//! This crate turns a backend string such as
//! `linux_gpio:gpiochip=0,numbering=board` into an opened [`GpioLines`]
//! implementation plus the [`PinMap`] it should be driven with. Backends are
//! feature-gated; the pin keys (`numbering`, `reset`, `bootstrap`) are
//! understood by every backend.

use lpcboot_core::options::parse_named_options;
use lpcboot_core::{GpioLines, PinMap};

/// Environment variable both tools read the backend string from
pub const GPIO_ENV: &str = "LPCBOOT_GPIO";

/// Backend used when none is given
pub const DEFAULT_BACKEND: &str = "linux_gpio";

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// An opened backend and the pins to drive on it
pub struct OpenedBackend {
    pub gpio: Box<dyn GpioLines>,
    pub pins: PinMap,
}

/// Open a GPIO backend
///
/// # Arguments
/// * `spec` - Backend specification (e.g., "dummy" or "linux_gpio:gpiochip=1")
///
/// # Example
/// ```ignore
/// let backend = open_backend("linux_gpio:dev=/dev/gpiochip0")?;
/// let controller = PinController::open(backend.gpio, &backend.pins)?;
/// ```
pub fn open_backend(spec: &str) -> Result<OpenedBackend, Box<dyn std::error::Error>> {
    let (name, options) = parse_named_options(spec)?;
    let (pins, backend_options) = PinMap::parse_options(&options)?;
    log::debug!("Opening backend '{}' with {:?}", name, backend_options);

    let gpio: Box<dyn GpioLines> = match name {
        #[cfg(feature = "dummy")]
        "dummy" => Box::new(lpcboot_dummy::DummyGpio::new(
            lpcboot_dummy::parse_options(&backend_options)?,
        )),

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" | "gpiochip" => {
            lpcboot_linux_gpio::open_linux_gpio(&backend_options)?
        }

        _ => {
            return Err(format!(
                "Unknown backend: {} [available: {}]",
                name,
                backend_names_short()
            )
            .into())
        }
    };

    Ok(OpenedBackend { gpio, pins })
}

/// Backend string from the environment, or the default
pub fn backend_from_env() -> String {
    std::env::var(GPIO_ENV).unwrap_or_else(|_| DEFAULT_BACKEND.to_string())
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpiochip"],
        description: "Linux GPIO character device (dev=/dev/gpiochipN or gpiochip=N,consumer=<label>)",
    });

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory lines for dry runs (busy=1 to simulate a held chip)",
    });

    backends
}

/// Generate help text listing all available backends
pub fn backend_help() -> String {
    let backends = available_backends();

    if backends.is_empty() {
        return "No backends available (recompile with backend features enabled)".to_string();
    }

    let mut help = String::from("Available backends:\n");
    for b in &backends {
        help.push_str(&format!("  {:12} - {}\n", b.name, b.description));
    }
    help.push_str(
        "\nPin options (all backends): numbering=board|offset, reset=N, bootstrap=N\n\
         (defaults: board numbering, RESET on header pin 16, BOOTSTRAP on 18)",
    );
    help
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    if backends.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}
