//! Recording fakes shared by the unit tests
//!
//! All fakes append to one [`Trace`] so tests can assert on the interleaving
//! of line writes, delays and child processes.

use crate::delay::Delay;
use crate::error::BackendError;
use crate::gpio::GpioLines;
use crate::pin::Level;
use crate::process::ProcessRunner;
use std::cell::RefCell;
use std::ffi::OsString;
use std::io;
use std::rc::Rc;
use std::time::Duration;

/// Line offsets of header pins 16 and 18
pub const RESET_LINE: u32 = 23;
pub const BOOTSTRAP_LINE: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Claim(Vec<u32>, Level),
    Write(u32, Level),
    Release,
    Delay(Duration),
    Run(String, Vec<OsString>),
}

#[derive(Debug, Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Event>>>);

impl Trace {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }

    /// Only the GPIO events, in order
    pub fn gpio_events(&self) -> Vec<Event> {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Claim(..) | Event::Write(..) | Event::Release))
            .cloned()
            .collect()
    }
}

pub struct FakeGpio {
    trace: Trace,
    busy: bool,
    fail_writes: bool,
}

impl FakeGpio {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            busy: false,
            fail_writes: false,
        }
    }

    /// Claim fails as if another process held the lines
    pub fn busy(trace: &Trace) -> Self {
        Self {
            busy: true,
            ..Self::new(trace)
        }
    }

    pub fn failing_writes(trace: &Trace) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(trace)
        }
    }
}

impl GpioLines for FakeGpio {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    fn claim(&mut self, offsets: &[u32], initial: Level) -> Result<(), BackendError> {
        if self.busy {
            return Err("Device or resource busy".into());
        }
        self.trace.push(Event::Claim(offsets.to_vec(), initial));
        Ok(())
    }

    fn write(&mut self, offset: u32, level: Level) -> Result<(), BackendError> {
        if self.fail_writes {
            return Err("write rejected".into());
        }
        self.trace.push(Event::Write(offset, level));
        Ok(())
    }

    fn release(&mut self) {
        self.trace.push(Event::Release);
    }
}

pub struct FakeDelay(pub Trace);

impl Delay for FakeDelay {
    fn delay(&mut self, duration: Duration) {
        self.0.push(Event::Delay(duration));
    }
}

/// How a fake child process behaves
#[derive(Debug, Clone, Copy)]
pub enum Exit {
    Code(i32),
    NotFound,
}

pub struct FakeRunner {
    trace: Trace,
    pub killall: Exit,
    pub flasher: Exit,
}

impl FakeRunner {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            killall: Exit::Code(1),
            flasher: Exit::Code(0),
        }
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<i32> {
        self.trace.push(Event::Run(program.to_string(), args.to_vec()));
        let behaviour = if program == "killall" {
            self.killall
        } else {
            self.flasher
        };
        match behaviour {
            Exit::Code(code) => Ok(code),
            Exit::NotFound => Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
        }
    }
}
