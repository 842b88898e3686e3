//! Spawning child processes and validating that their output is worth checking.

use crate::errors::ProcessFailure;
use crate::{Error, ProcessInvocation};
use std::process::{Command, Output};

/// Output of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,

    /// Exit code, or `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    /// Marker of a JVM warning line (eg. `OpenJDK 64-Bit Server VM warning: ...`)
    const VM_WARNING: &'static str = " VM warning:";

    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: Option<i32>) -> Self {
        CapturedOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Combined standard output and standard error
    pub fn text(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }

    /// Lines of the combined output, in order
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().chain(self.stderr.lines()).collect()
    }

    /// Human readable exit status
    pub fn status(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => String::from("terminated by signal"),
        }
    }

    /// Standard error minus the `... VM warning: ...` lines the JVM is allowed to print
    pub fn stderr_ignoring_vm_warnings(&self) -> String {
        let mut filtered = String::new();
        for line in self.stderr.lines() {
            if !line.contains(Self::VM_WARNING) {
                filtered.push_str(line);
                filtered.push('\n');
            }
        }
        filtered
    }

    /// Check the preconditions for pattern matching to mean anything
    pub fn check_clean_exit(&self) -> Result<(), ProcessFailure> {
        if !self.stderr_ignoring_vm_warnings().trim().is_empty() {
            return Err(ProcessFailure::UnexpectedStderr);
        }
        if self.stdout.is_empty() {
            return Err(ProcessFailure::EmptyStdout);
        }
        if self.exit_code != Some(0) {
            return Err(ProcessFailure::ExitStatus(self.exit_code));
        }
        Ok(())
    }
}

impl From<Output> for CapturedOutput {
    fn from(output: Output) -> CapturedOutput {
        CapturedOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        }
    }
}

/// Run a command to completion, capturing everything it prints
pub fn capture(command: &mut Command) -> Result<CapturedOutput, Error> {
    let output = command.output()?;
    Ok(CapturedOutput::from(output))
}

/// Run one child JVM and make sure it exited cleanly
pub fn run(invocation: &ProcessInvocation) -> Result<CapturedOutput, Error> {
    let command_line = invocation.command_line();
    log::debug!("Running {}", &command_line);

    let output = capture(&mut invocation.command())?;
    log::debug!(
        "Child finished with {} ({} bytes of output)",
        output.status(),
        output.stdout.len() + output.stderr.len()
    );

    match output.check_clean_exit() {
        Ok(()) => Ok(output),
        Err(failure) => Err(Error::ProcessFailed {
            command: command_line,
            failure,
            output,
        }),
    }
}
