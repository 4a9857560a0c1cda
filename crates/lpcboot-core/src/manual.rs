//! One-shot manual line control
//!
//! Each flag is an independent imperative action. They are applied in a
//! fixed order regardless of how they were given on the command line, so
//! when both the activate and deactivate flag of one line are present the
//! deactivate wins.

use crate::controller::PinController;
use crate::error::Result;
use crate::gpio::GpioLines;
use crate::pin::{Pin, PinMap, PinState};

/// Line operations requested for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualActions {
    pub reset_activate: bool,
    pub reset_deactivate: bool,
    pub bootstrap_activate: bool,
    pub bootstrap_deactivate: bool,
    /// Release the lines once all writes are done
    pub cleanup: bool,
}

impl ManualActions {
    /// Writes implied by the flags, in application order
    pub fn writes(&self) -> Vec<(Pin, PinState)> {
        [
            (self.reset_activate, Pin::Reset, PinState::Active),
            (self.reset_deactivate, Pin::Reset, PinState::Inactive),
            (self.bootstrap_activate, Pin::Bootstrap, PinState::Active),
            (self.bootstrap_deactivate, Pin::Bootstrap, PinState::Inactive),
        ]
        .into_iter()
        .filter(|(wanted, _, _)| *wanted)
        .map(|(_, pin, state)| (pin, state))
        .collect()
    }
}

/// Claim the lines, apply `actions`, and release only if `cleanup` is set
///
/// Claiming always drives both lines inactive first, so even an empty set
/// of actions has a visible effect. Without `cleanup` the lines are left
/// claimed at their last levels.
pub fn run_manual<G: GpioLines>(gpio: G, pins: &PinMap, actions: &ManualActions) -> Result<()> {
    let mut controller = PinController::open(gpio, pins)?;

    for (pin, state) in actions.writes() {
        let (verb, voltage) = match state {
            PinState::Active => ("Activating", "low"),
            PinState::Inactive => ("Deactivating", "high"),
        };
        log::info!("{} {} (set {})", verb, pin, voltage);
        controller.set(pin, state)?;
    }

    if actions.cleanup {
        controller.release();
    } else {
        controller.leave_claimed();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pin::Level;
    use crate::testutil::{Event, FakeGpio, Trace, BOOTSTRAP_LINE, RESET_LINE};

    fn run(actions: ManualActions) -> Vec<Event> {
        let trace = Trace::default();
        run_manual(FakeGpio::new(&trace), &PinMap::default(), &actions).unwrap();
        trace.events()
    }

    fn claim() -> Event {
        Event::Claim(vec![RESET_LINE, BOOTSTRAP_LINE], Level::High)
    }

    #[test]
    fn test_no_flags_only_claims() {
        assert_eq!(run(ManualActions::default()), vec![claim()]);
    }

    #[test]
    fn test_every_flag_subset() {
        for bits in 0u8..32 {
            let actions = ManualActions {
                reset_activate: bits & 0x01 != 0,
                reset_deactivate: bits & 0x02 != 0,
                bootstrap_activate: bits & 0x04 != 0,
                bootstrap_deactivate: bits & 0x08 != 0,
                cleanup: bits & 0x10 != 0,
            };

            let mut expected = vec![claim()];
            if actions.reset_activate {
                expected.push(Event::Write(RESET_LINE, Level::Low));
            }
            if actions.reset_deactivate {
                expected.push(Event::Write(RESET_LINE, Level::High));
            }
            if actions.bootstrap_activate {
                expected.push(Event::Write(BOOTSTRAP_LINE, Level::Low));
            }
            if actions.bootstrap_deactivate {
                expected.push(Event::Write(BOOTSTRAP_LINE, Level::High));
            }
            if actions.cleanup {
                expected.push(Event::Release);
            }

            assert_eq!(run(actions), expected, "flags {:#07b}", bits);
        }
    }

    #[test]
    fn test_deactivate_overrides_activate() {
        let actions = ManualActions {
            reset_activate: true,
            reset_deactivate: true,
            ..Default::default()
        };
        assert_eq!(
            actions.writes(),
            vec![(Pin::Reset, PinState::Active), (Pin::Reset, PinState::Inactive)]
        );
    }

    #[test]
    fn test_claim_failure_writes_nothing() {
        let trace = Trace::default();
        let actions = ManualActions {
            reset_activate: true,
            cleanup: true,
            ..Default::default()
        };
        let result = run_manual(FakeGpio::busy(&trace), &PinMap::default(), &actions);
        assert!(matches!(result, Err(Error::ResourceUnavailable(_))));
        assert!(trace.events().is_empty());
    }

    #[test]
    fn test_write_failure_still_releases() {
        let trace = Trace::default();
        let actions = ManualActions {
            bootstrap_activate: true,
            ..Default::default()
        };
        let result = run_manual(FakeGpio::failing_writes(&trace), &PinMap::default(), &actions);
        assert!(result.is_err());
        assert_eq!(trace.events().last(), Some(&Event::Release));
    }
}
