//! Verify that C2 emits the expected AArch64 barrier sequences for volatile accesses.
//!
//! Test classes are run in child JVMs with `-XX:+PrintOptoAssembly`, under a range of garbage
//! collectors and VM flag combinations. The printed assembly of each `test*` method is then
//! checked for an expected sequence of instruction tokens, appearing in order.

pub mod cursor;
mod errors;
pub mod expected;
pub mod extractor;
mod invocation;
pub mod java;
pub mod matcher;
mod model;
pub mod runner;
mod settings;
pub mod verifier;

pub use errors::{Error, ErrorKind, ProcessFailure};
pub use invocation::ProcessInvocation;
pub use model::{ConfigAxis, DataKind, GcMode, OperationKind, TestClass, TestSpec};
pub use runner::CapturedOutput;
pub use settings::Settings;
pub use verifier::{check_output, run_test, CheckMode, Verifier};
