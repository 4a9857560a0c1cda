//! External program invocation
//!
//! The sequence runs two external programs: `killall` to close a serial
//! terminal that may hold the target's UART, and the flasher itself. Both
//! inherit stdin/stdout/stderr and are waited for synchronously.

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus};

/// Runs an external program to completion
pub trait ProcessRunner {
    /// Run `program` with `args`, returning its exit code
    ///
    /// An `Err` means the program could not be started at all.
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<i32>;
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[OsString]) -> io::Result<i32> {
        log::debug!("exec: {} {:?}", program, args);
        let status = Command::new(program).args(args).status()?;
        Ok(exit_code(status))
    }
}

/// Exit code of a finished child; signal deaths follow the shell's 128+N
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_system_runner_reports_exit_code() {
        let mut runner = SystemRunner;
        let args = [OsString::from("-c"), OsString::from("exit 3")];
        assert_eq!(runner.run("sh", &args).unwrap(), 3);
    }

    #[test]
    fn test_system_runner_missing_program() {
        let mut runner = SystemRunner;
        let err = runner.run("lpcboot-no-such-program", &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
