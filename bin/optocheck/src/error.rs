use optocheck::{Error, ErrorKind};

pub enum TestOutcome {
    /// The test passed
    Ok,

    /// The compiled code did not have the expected barriers
    Fail(String),

    /// Something failed in the test infrastructure
    Error(String),
}

impl From<Error> for TestOutcome {
    fn from(err: Error) -> TestOutcome {
        match err.kind() {
            ErrorKind::Mismatch => TestOutcome::Fail(err.to_string()),
            ErrorKind::Configuration => TestOutcome::Error(format!("Configuration - {}", err)),
            ErrorKind::Process => TestOutcome::Error(format!("Process - {}", err)),
        }
    }
}

impl From<Result<(), Error>> for TestOutcome {
    fn from(result: Result<(), Error>) -> TestOutcome {
        result.map_or_else(TestOutcome::from, |_| TestOutcome::Ok)
    }
}

impl TestOutcome {
    /// Exit code of the `check` subcommand for this outcome
    pub fn check_exit_code(&self) -> i32 {
        match self {
            TestOutcome::Ok => 0,
            TestOutcome::Fail(_) => 1,
            TestOutcome::Error(_) => 2,
        }
    }
}
