use crate::runner::CapturedOutput;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// GC mode name is not one of the supported collectors
    UnknownGcMode(String),

    /// Test class name does not correspond to any operation kind
    UnknownTestClass(String),

    /// An expected token is not a valid regular expression (indicates a bug in the tables)
    BadPattern(regex::Error),

    IoError(io::Error),

    /// Compiling the generated Java test classes failed
    JavacFailed(CapturedOutput),

    /// The child JVM did not run cleanly, so its output cannot be checked
    ProcessFailed {
        command: String,
        failure: ProcessFailure,
        output: CapturedOutput,
    },

    /// No `{method}` block remains in the output
    MissingMethodBlock { method: String, output: String },

    /// A `{method}` block was found but not its `- name:` line
    MissingMethodName { method: String, output: String },

    /// The compiled block belongs to some other method
    ///
    /// This usually means inlining or the compile filter is misconfigured.
    WrongMethod {
        found: String,
        method: String,
        output: String,
    },

    /// An expected instruction token could not be found (in order) after the method header
    MissingExpectedOutput {
        method: String,
        token: String,
        output: String,
    },
}

/// Why a child process run is unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessFailure {
    /// Non-zero exit (`None` if killed by a signal)
    ExitStatus(Option<i32>),

    /// Standard error had content other than VM warnings
    UnexpectedStderr,

    EmptyStdout,
}

/// Coarse classification of errors, used to tell harness problems apart from real mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Process,
    Mismatch,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownGcMode(_) | Error::UnknownTestClass(_) | Error::BadPattern(_) => {
                ErrorKind::Configuration
            }
            Error::IoError(_) | Error::JavacFailed(_) | Error::ProcessFailed { .. } => {
                ErrorKind::Process
            }
            Error::MissingMethodBlock { .. }
            | Error::MissingMethodName { .. }
            | Error::WrongMethod { .. }
            | Error::MissingExpectedOutput { .. } => ErrorKind::Mismatch,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownGcMode(name) => write!(f, "unexpected test type {}", name),
            Error::UnknownTestClass(name) => write!(f, "unexpected test class {}", name),
            Error::BadPattern(err) => write!(f, "invalid expected pattern: {}", err),
            Error::IoError(err) => write!(f, "IO - {}", err),
            Error::JavacFailed(output) => {
                write!(f, "Failed to compile Java test classes ({})", output.status())?;
                write_output(f, &output.text())
            }
            Error::ProcessFailed {
                command,
                failure,
                output,
            } => {
                match failure {
                    ProcessFailure::ExitStatus(_) => {
                        write!(f, "Unexpected exit status {}", output.status())?
                    }
                    ProcessFailure::UnexpectedStderr => {
                        write!(f, "Unexpected output on standard error")?
                    }
                    ProcessFailure::EmptyStdout => write!(f, "Empty standard output")?,
                }
                write!(f, " from `{}`", command)?;
                write_output(f, &output.text())
            }
            Error::MissingMethodBlock { method, output } => {
                write!(f, "Missing compiler output for {}!", method)?;
                write_output(f, output)
            }
            Error::MissingMethodName { method, output } => {
                write!(f, "Missing compiled method name for {}!", method)?;
                write_output(f, output)
            }
            Error::WrongMethod {
                found,
                method,
                output,
            } => {
                write!(f, "Wrong method {}!\n  -- expecting {}", found, method)?;
                write_output(f, output)
            }
            Error::MissingExpectedOutput {
                method,
                token,
                output,
            } => {
                write!(f, "Missing expected output {} in {}!", token, method)?;
                write_output(f, output)
            }
        }
    }
}

fn write_output(f: &mut fmt::Formatter<'_>, output: &str) -> fmt::Result {
    if !output.is_empty() {
        write!(f, "\n\n{}", output)?;
    }
    Ok(())
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::BadPattern(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error::BadPattern(err)
    }
}
