//! In-system-programming entry, flash, and return to run mode
//!
//! The LPC210x boot ROM samples BOOTSTRAP when RESET is released. Holding
//! BOOTSTRAP low across a reset pulse therefore starts the serial loader,
//! and a second reset pulse with BOOTSTRAP high boots the new application.
//!
//! ```text
//!           ___                                      ________________
//! BOOTSTRAP    \____________________________________/
//!           _________           _________________________      ______
//! RESET              \_________/                         \____/
//!                                          ^ flasher runs here
//! ```
//!
//! Every transition is followed by a settle delay. The sequence is linear:
//! a failing flasher still gets the post-flash reset, and any early error
//! releases the lines through [`PinController`]'s drop.

use crate::controller::PinController;
use crate::delay::Delay;
use crate::error::{Error, Result};
use crate::gpio::GpioLines;
use crate::options::parse_options;
use crate::pin::{Pin, PinMap, PinState};
use crate::process::ProcessRunner;
use core::fmt;
use core::str::FromStr;
use std::ffi::OsString;
use std::time::Duration;

/// Time allowed for the target to see a stable level after each transition
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2100);

/// Flasher invoked with the forwarded arguments
pub const DEFAULT_FLASHER: &str = "lpc21isp";

/// Serial terminal that may hold the target's UART open
pub const DEFAULT_TERMINAL: &str = "putty";

/// Program used to ask the serial terminal to exit
const TERMINATE_PROGRAM: &str = "killall";

/// What the sequence reports as its own exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Mirror the flasher's exit status
    #[default]
    Flasher,
    /// Always succeed once the sequence completes
    Legacy,
}

impl FromStr for ExitPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flasher" => Ok(ExitPolicy::Flasher),
            "legacy" => Ok(ExitPolicy::Legacy),
            _ => Err(Error::InvalidOption(format!(
                "exit must be 'flasher' or 'legacy', got '{}'",
                s
            ))),
        }
    }
}

/// Program sequence configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceConfig {
    /// Delay after every line transition
    pub settle: Duration,
    /// Flasher program name or path
    pub flasher: String,
    /// Serial terminal to terminate first (`None` skips the step)
    pub terminal: Option<String>,
    pub exit_policy: ExitPolicy,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            flasher: DEFAULT_FLASHER.to_string(),
            terminal: Some(DEFAULT_TERMINAL.to_string()),
            exit_policy: ExitPolicy::default(),
        }
    }
}

impl SequenceConfig {
    /// Parse a `key=value,...` string on top of the defaults
    ///
    /// # Supported Options
    ///
    /// - `settle_ms=N` - settle delay in milliseconds (default 2100)
    /// - `flasher=NAME` - flasher program (default `lpc21isp`)
    /// - `terminal=NAME` - terminal to terminate (default `putty`, empty disables)
    /// - `exit=flasher|legacy` - exit status policy (default `flasher`)
    pub fn parse(s: &str) -> Result<Self> {
        let mut config = Self::default();

        for (key, value) in parse_options(s)? {
            match key {
                "settle_ms" => {
                    let ms: u64 = value.parse().map_err(|_| {
                        Error::InvalidOption(format!("Invalid settle_ms value: {}", value))
                    })?;
                    config.settle = Duration::from_millis(ms);
                }
                "flasher" => {
                    if value.is_empty() {
                        return Err(Error::InvalidOption("flasher must not be empty".into()));
                    }
                    config.flasher = value.to_string();
                }
                "terminal" => {
                    config.terminal = (!value.is_empty()).then(|| value.to_string());
                }
                "exit" => config.exit_policy = value.parse()?,
                _ => log::warn!("sequence: Unknown option: {}={}", key, value),
            }
        }

        Ok(config)
    }
}

/// Result of a completed sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// Exit code reported by the flasher
    pub flasher_status: i32,
}

impl SequenceOutcome {
    /// Process exit code under `policy`
    ///
    /// Codes outside `0..=255` are reported as 1.
    pub fn exit_code(&self, policy: ExitPolicy) -> u8 {
        match policy {
            ExitPolicy::Legacy => 0,
            ExitPolicy::Flasher => u8::try_from(self.flasher_status).unwrap_or(1),
        }
    }
}

/// States of the program sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Start,
    TerminateTerminal,
    EnterBootstrap,
    AssertReset,
    ReleaseReset,
    ReleaseBootstrap,
    InvokeFlasher,
    PostResetAssert,
    PostResetRelease,
    /// Settle delay; the number counts from 1 to 6
    Settle(u8),
    ReleaseController,
    Done,
}

impl Step {
    /// The state that follows this one
    pub fn next(self) -> Step {
        match self {
            Step::Start => Step::TerminateTerminal,
            Step::TerminateTerminal => Step::EnterBootstrap,
            Step::EnterBootstrap => Step::Settle(1),
            Step::Settle(1) => Step::AssertReset,
            Step::AssertReset => Step::Settle(2),
            Step::Settle(2) => Step::ReleaseReset,
            Step::ReleaseReset => Step::Settle(3),
            Step::Settle(3) => Step::ReleaseBootstrap,
            Step::ReleaseBootstrap => Step::Settle(4),
            Step::Settle(4) => Step::InvokeFlasher,
            Step::InvokeFlasher => Step::PostResetAssert,
            Step::PostResetAssert => Step::Settle(5),
            Step::Settle(5) => Step::PostResetRelease,
            Step::PostResetRelease => Step::Settle(6),
            Step::Settle(_) => Step::ReleaseController,
            Step::ReleaseController | Step::Done => Step::Done,
        }
    }

    /// Line write performed by this state, if any
    pub fn write(self) -> Option<(Pin, PinState)> {
        match self {
            Step::EnterBootstrap => Some((Pin::Bootstrap, PinState::Active)),
            Step::AssertReset | Step::PostResetAssert => Some((Pin::Reset, PinState::Active)),
            Step::ReleaseReset | Step::PostResetRelease => Some((Pin::Reset, PinState::Inactive)),
            Step::ReleaseBootstrap => Some((Pin::Bootstrap, PinState::Inactive)),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Start => f.write_str("Starting programming sequence"),
            Step::TerminateTerminal => f.write_str("Making sure no serial terminal is running"),
            Step::EnterBootstrap => f.write_str("Activating BOOTSTRAP (set low)"),
            Step::AssertReset => f.write_str("Activating RESET (set low)"),
            Step::ReleaseReset => f.write_str("Deactivating RESET (set high), releasing from reset"),
            Step::ReleaseBootstrap => f.write_str("Deactivating BOOTSTRAP (set high)"),
            Step::InvokeFlasher => f.write_str("Running the flasher"),
            Step::PostResetAssert => f.write_str("Activating RESET again after programming"),
            Step::PostResetRelease => f.write_str("Deactivating RESET, booting new firmware"),
            Step::Settle(n) => write!(f, "Settling ({}/6)", n),
            Step::ReleaseController => f.write_str("Releasing GPIO lines"),
            Step::Done => f.write_str("Programming sequence complete"),
        }
    }
}

/// Drives the target through bootstrap entry, flashing and reset
pub struct ProgramSequence<'a, D: Delay, R: ProcessRunner> {
    config: &'a SequenceConfig,
    delay: D,
    runner: R,
}

impl<'a, D: Delay, R: ProcessRunner> ProgramSequence<'a, D, R> {
    pub fn new(config: &'a SequenceConfig, delay: D, runner: R) -> Self {
        Self {
            config,
            delay,
            runner,
        }
    }

    /// Run the full sequence, forwarding `args` to the flasher unchanged
    ///
    /// The serial terminal is terminated before the lines are claimed, so
    /// it has already been asked to exit when a claim fails.
    pub fn run<G: GpioLines>(
        &mut self,
        gpio: G,
        pins: &PinMap,
        args: &[OsString],
    ) -> Result<SequenceOutcome> {
        let mut controller = PinController::new(gpio, pins)?;
        let mut flasher_status = 0;
        let mut step = Step::Start;

        while step != Step::Done {
            log::info!("{}", step);

            match step {
                Step::TerminateTerminal => self.terminate_terminal(),
                Step::EnterBootstrap => controller.claim()?,
                Step::InvokeFlasher => flasher_status = self.flash(args)?,
                Step::Settle(_) => self.delay.delay(self.config.settle),
                Step::ReleaseController => controller.release(),
                _ => {}
            }

            if let Some((pin, state)) = step.write() {
                controller.set(pin, state)?;
            }

            step = step.next();
        }
        log::info!("{}", Step::Done);

        if flasher_status != 0 {
            log::warn!("{} exited with status {}", self.config.flasher, flasher_status);
        }

        Ok(SequenceOutcome { flasher_status })
    }

    /// Ask the serial terminal to exit; never fails
    fn terminate_terminal(&mut self) {
        let Some(terminal) = self.config.terminal.as_deref() else {
            log::debug!("No serial terminal configured, skipping");
            return;
        };

        let args = [OsString::from(terminal)];
        log::info!("{} {}", TERMINATE_PROGRAM, terminal);
        match self.runner.run(TERMINATE_PROGRAM, &args) {
            Ok(0) => log::debug!("{} terminated", terminal),
            Ok(status) => log::debug!(
                "{} exited with status {} (no {} running?)",
                TERMINATE_PROGRAM,
                status,
                terminal
            ),
            Err(e) => log::warn!("Could not run {}: {}", TERMINATE_PROGRAM, e),
        }
    }

    fn flash(&mut self, args: &[OsString]) -> Result<i32> {
        let program = self.config.flasher.as_str();
        log::info!("{} {:?}", program, args);
        self.runner
            .run(program, args)
            .map_err(|source| Error::ChildProcess {
                program: program.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::Level;
    use crate::testutil::{
        Event, Exit, FakeDelay, FakeGpio, FakeRunner, Trace, BOOTSTRAP_LINE, RESET_LINE,
    };

    const SETTLE: Duration = Duration::from_millis(5);

    fn config() -> SequenceConfig {
        SequenceConfig {
            settle: SETTLE,
            ..Default::default()
        }
    }

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    fn killall() -> Event {
        Event::Run("killall".into(), args(&["putty"]))
    }

    fn flasher(list: &[&str]) -> Event {
        Event::Run("lpc21isp".into(), args(list))
    }

    fn run_with(
        trace: &Trace,
        runner: FakeRunner,
        gpio: FakeGpio,
        forwarded: &[&str],
    ) -> Result<SequenceOutcome> {
        let config = config();
        let mut sequence = ProgramSequence::new(&config, FakeDelay(trace.clone()), runner);
        sequence.run(gpio, &PinMap::default(), &args(forwarded))
    }

    fn expected_trace(forwarded: &[&str]) -> Vec<Event> {
        vec![
            killall(),
            Event::Claim(vec![RESET_LINE, BOOTSTRAP_LINE], Level::High),
            Event::Write(BOOTSTRAP_LINE, Level::Low),
            Event::Delay(SETTLE),
            Event::Write(RESET_LINE, Level::Low),
            Event::Delay(SETTLE),
            Event::Write(RESET_LINE, Level::High),
            Event::Delay(SETTLE),
            Event::Write(BOOTSTRAP_LINE, Level::High),
            Event::Delay(SETTLE),
            flasher(forwarded),
            Event::Write(RESET_LINE, Level::Low),
            Event::Delay(SETTLE),
            Event::Write(RESET_LINE, Level::High),
            Event::Delay(SETTLE),
            Event::Release,
        ]
    }

    #[test]
    fn test_full_trace() {
        let trace = Trace::default();
        let forwarded = ["-x", "file.hex", "-com1"];
        let outcome = run_with(
            &trace,
            FakeRunner::new(&trace),
            FakeGpio::new(&trace),
            &forwarded,
        )
        .unwrap();

        assert_eq!(trace.events(), expected_trace(&forwarded));
        assert_eq!(outcome.flasher_status, 0);
    }

    #[test]
    fn test_six_settle_delays() {
        let trace = Trace::default();
        run_with(&trace, FakeRunner::new(&trace), FakeGpio::new(&trace), &[]).unwrap();
        assert_eq!(trace.count(&Event::Delay(SETTLE)), 6);
    }

    #[test]
    fn test_arguments_forwarded_verbatim() {
        let trace = Trace::default();
        let forwarded = ["-wipe", "-- odd arg", "", "/dev/ttyAMA0", "115200", "14746"];
        run_with(
            &trace,
            FakeRunner::new(&trace),
            FakeGpio::new(&trace),
            &forwarded,
        )
        .unwrap();

        let runs: Vec<Event> = trace
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Run(program, _) if program == "lpc21isp"))
            .collect();
        assert_eq!(runs, vec![flasher(&forwarded)]);
    }

    #[test]
    fn test_failed_flash_still_resets_target() {
        let trace = Trace::default();
        let mut runner = FakeRunner::new(&trace);
        runner.flasher = Exit::Code(2);
        let outcome = run_with(&trace, runner, FakeGpio::new(&trace), &["x.hex"]).unwrap();

        assert_eq!(trace.events(), expected_trace(&["x.hex"]));
        assert_eq!(outcome.flasher_status, 2);
        assert_eq!(outcome.exit_code(ExitPolicy::Flasher), 2);
        assert_eq!(outcome.exit_code(ExitPolicy::Legacy), 0);
    }

    #[test]
    fn test_missing_flasher_releases_lines() {
        let trace = Trace::default();
        let mut runner = FakeRunner::new(&trace);
        runner.flasher = Exit::NotFound;
        let result = run_with(&trace, runner, FakeGpio::new(&trace), &[]);

        assert!(matches!(result, Err(Error::ChildProcess { .. })));
        let events = trace.events();
        assert_eq!(events.last(), Some(&Event::Release));
        assert_eq!(trace.count(&Event::Release), 1);
        // No post-flash reset pulse after a spawn failure
        let after_flash = events
            .iter()
            .skip_while(|e| !matches!(e, Event::Run(p, _) if p == "lpc21isp"))
            .skip(1)
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(after_flash, vec![Event::Release]);
    }

    #[test]
    fn test_claim_failure_after_terminal_termination() {
        let trace = Trace::default();
        let result = run_with(&trace, FakeRunner::new(&trace), FakeGpio::busy(&trace), &[]);

        assert!(matches!(result, Err(Error::ResourceUnavailable(_))));
        assert_eq!(trace.events(), vec![killall()]);
        assert!(trace.gpio_events().is_empty());
    }

    #[test]
    fn test_terminal_failures_are_ignored() {
        for killall_exit in [Exit::Code(1), Exit::NotFound] {
            let trace = Trace::default();
            let mut runner = FakeRunner::new(&trace);
            runner.killall = killall_exit;
            let outcome = run_with(&trace, runner, FakeGpio::new(&trace), &[]).unwrap();
            assert_eq!(outcome.flasher_status, 0);
            assert_eq!(trace.events(), expected_trace(&[]));
        }
    }

    #[test]
    fn test_terminal_step_can_be_disabled() {
        let trace = Trace::default();
        let config = SequenceConfig {
            terminal: None,
            ..config()
        };
        let mut sequence =
            ProgramSequence::new(&config, FakeDelay(trace.clone()), FakeRunner::new(&trace));
        sequence.run(FakeGpio::new(&trace), &PinMap::default(), &[]).unwrap();
        assert_eq!(trace.events()[..], expected_trace(&[])[1..]);
    }

    #[test]
    fn test_step_order() {
        let mut steps = vec![Step::Start];
        while *steps.last().unwrap() != Step::Done {
            steps.push(steps.last().unwrap().next());
        }
        assert_eq!(
            steps,
            vec![
                Step::Start,
                Step::TerminateTerminal,
                Step::EnterBootstrap,
                Step::Settle(1),
                Step::AssertReset,
                Step::Settle(2),
                Step::ReleaseReset,
                Step::Settle(3),
                Step::ReleaseBootstrap,
                Step::Settle(4),
                Step::InvokeFlasher,
                Step::PostResetAssert,
                Step::Settle(5),
                Step::PostResetRelease,
                Step::Settle(6),
                Step::ReleaseController,
                Step::Done,
            ]
        );
    }

    #[test]
    fn test_config_parse() {
        let config =
            SequenceConfig::parse("settle_ms=50,flasher=/opt/lpc21isp,terminal=,exit=legacy")
                .unwrap();
        assert_eq!(config.settle, Duration::from_millis(50));
        assert_eq!(config.flasher, "/opt/lpc21isp");
        assert_eq!(config.terminal, None);
        assert_eq!(config.exit_policy, ExitPolicy::Legacy);

        assert_eq!(SequenceConfig::parse("").unwrap(), SequenceConfig::default());
        assert!(SequenceConfig::parse("settle_ms=soon").is_err());
        assert!(SequenceConfig::parse("exit=maybe").is_err());
        assert!(SequenceConfig::parse("flasher=").is_err());
    }

    #[test]
    fn test_exit_code_out_of_range() {
        let outcome = SequenceOutcome {
            flasher_status: -1,
        };
        assert_eq!(outcome.exit_code(ExitPolicy::Flasher), 1);
        let outcome = SequenceOutcome {
            flasher_status: 255,
        };
        assert_eq!(outcome.exit_code(ExitPolicy::Flasher), 255);
    }
}
