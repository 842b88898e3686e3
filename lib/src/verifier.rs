//! Checking captured compiler output against the expected sequences.

use crate::cursor::Cursor;
use crate::expected::{self, ExpectedSequence, MethodCheck};
use crate::extractor::{find_method_block, BlockMismatch};
use crate::matcher::match_in_order;
use crate::{runner, CapturedOutput, ConfigAxis, Error, GcMode, ProcessInvocation, Settings};
use crate::{OperationKind, TestClass};

/// What to do when output does not match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Mismatches are errors
    Fatal,

    /// Mismatches are reported as `Ok(false)`, so that a different expectation can be tried
    Probe,
}

/// Output of one child JVM, split into lines for scanning
pub struct Verifier<'a> {
    output: &'a CapturedOutput,
    lines: Vec<&'a str>,
}

impl<'a> Verifier<'a> {
    pub fn new(output: &'a CapturedOutput) -> Verifier<'a> {
        Verifier {
            output,
            lines: output.lines(),
        }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Locate the compiled block for `method` then check that each expected token occurs in it,
    /// in the order given
    ///
    /// Returns `Ok(true)` on a match. In [`CheckMode::Probe`] a mismatch returns `Ok(false)`
    /// instead of an error.
    pub fn check_compile(
        &self,
        cursor: &mut Cursor,
        method: &str,
        expected: &ExpectedSequence,
        mode: CheckMode,
    ) -> Result<bool, Error> {
        log::info!("checkCompile({},\n  {})", method, expected);
        let patterns = expected.patterns()?;

        let mismatch = match find_method_block(&self.lines, cursor, method) {
            Err(BlockMismatch::MissingBlock) => Error::MissingMethodBlock {
                method: method.to_owned(),
                output: self.output.text(),
            },
            Err(BlockMismatch::MissingName) => Error::MissingMethodName {
                method: method.to_owned(),
                output: self.output.text(),
            },
            Err(BlockMismatch::WrongMethod(found)) => Error::WrongMethod {
                found,
                method: method.to_owned(),
                output: self.output.text(),
            },
            Ok(_) => match match_in_order(&self.lines, cursor, &patterns) {
                Ok(_) => return Ok(true),
                Err(missing) => Error::MissingExpectedOutput {
                    method: method.to_owned(),
                    token: missing.token().to_owned(),
                    output: self.output.text(),
                },
            },
        };

        match mode {
            CheckMode::Fatal => Err(mismatch),
            CheckMode::Probe => {
                log::debug!("Probe for {} did not match", method);
                Ok(false)
            }
        }
    }

    /// Check one method, retrying from the same position with the fallback ordering if needed
    pub fn check_method(&self, cursor: &mut Cursor, check: &MethodCheck) -> Result<(), Error> {
        let fallback = match &check.fallback {
            None => {
                self.check_compile(cursor, check.method, &check.expected, CheckMode::Fatal)?;
                return Ok(());
            }
            Some(fallback) => fallback,
        };

        let saved = *cursor;
        if !self.check_compile(cursor, check.method, &check.expected, CheckMode::Probe)? {
            log::debug!(
                "Retrying {} from line {} with alternate order",
                check.method,
                saved.position()
            );
            *cursor = saved;
            self.check_compile(cursor, check.method, fallback, CheckMode::Fatal)?;
        }
        Ok(())
    }

    /// Check the blocks of every method a test class of this operation compiles
    pub fn verify(
        &self,
        operation: OperationKind,
        gc: GcMode,
        axis: ConfigAxis,
    ) -> Result<(), Error> {
        let mut cursor = Cursor::new();
        for check in expected::method_checks(operation, gc, axis) {
            self.check_method(&mut cursor, &check)?;
        }
        Ok(())
    }
}

/// Check already captured output for one configuration
pub fn check_output(
    output: &CapturedOutput,
    operation: OperationKind,
    gc: GcMode,
    axis: ConfigAxis,
) -> Result<(), Error> {
    log::info!("checkoutput({:?}, {}, {})", operation, gc, axis);
    Verifier::new(output).verify(operation, gc, axis)
}

/// Run a test class under a collector in every configuration, checking each run
///
/// Stops at the first failure.
pub fn run_test(settings: &Settings, class: TestClass, gc: GcMode) -> Result<(), Error> {
    for invocation in ProcessInvocation::expand(settings, class, gc) {
        log::info!("Running {} with {} ({})", class, gc, invocation.axis);
        let output = runner::run(&invocation)?;
        check_output(&output, class.operation(), gc, invocation.axis)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{DataKind, TestSpec};

    /// Render a fake `PrintOptoAssembly` block for a method, one line per instruction
    fn block(method: &str, instructions: &[&str]) -> String {
        let mut text = format!(
            "{{method}}\n - this oop:          0x00000008000c4e58\n - name:              '{}'\n",
            method
        );
        for instruction in instructions {
            text.push_str("  ");
            text.push_str(instruction);
            text.push('\n');
        }
        text
    }

    /// Output where each method's block holds exactly its expected tokens (unescaped)
    fn synthetic_output(operation: OperationKind, gc: GcMode, axis: ConfigAxis) -> String {
        let mut text = String::from("OpenJDK banner\n");
        for check in expected::method_checks(operation, gc, axis) {
            let instructions: Vec<String> = check
                .expected
                .tokens()
                .iter()
                .map(|token| token.replace("w?", "w").replace('\\', ""))
                .collect();
            let instructions: Vec<&str> = instructions.iter().map(String::as_str).collect();
            text.push_str(&block(check.method, &instructions));
        }
        text
    }

    fn stdout(text: impl Into<String>) -> CapturedOutput {
        CapturedOutput::new(text, "", Some(0))
    }

    #[test]
    fn well_ordered_output_passes_everywhere() {
        for operation in OperationKind::ALL {
            for gc in GcMode::ALL {
                for axis in ConfigAxis::expand(operation) {
                    let output = stdout(synthetic_output(operation, gc, axis));
                    if let Err(err) = check_output(&output, operation, gc, axis) {
                        panic!("{:?} {} {}: {}", operation, gc, axis, err);
                    }
                }
            }
        }
    }

    #[test]
    fn load_int_with_barriers() {
        let text = block("testInt", &["ldrw  R0, [R10]", "membar_acquire", "dmb ish", "ret"])
            + &block(
                "testObj",
                &["ldrw  R0, [R10]", "membar_acquire", "dmb ish", "ret"],
            );
        let output = stdout(text);
        check_output(
            &output,
            OperationKind::Load,
            GcMode::G1,
            ConfigAxis::new(true, true),
        )
        .unwrap();
    }

    #[test]
    fn cms_store_requires_storestore_fence() {
        let axis = ConfigAxis::new(false, true);
        let int_block = block(
            "testInt",
            &["membar_release (elided)", "stlrw", "membar_volatile (elided)", "ret"],
        );

        let good = int_block.clone()
            + &block(
                "testObj",
                &[
                    "membar_release (elided)",
                    "stlrw R1, [R10]",
                    "storestore",
                    "dmb ishst",
                    "strb zr, [R11, R12]",
                    "membar_volatile (elided)",
                    "ret",
                ],
            );
        check_output(&stdout(good), OperationKind::Store, GcMode::Cms, axis).unwrap();

        let missing_fence = int_block
            + &block(
                "testObj",
                &[
                    "membar_release (elided)",
                    "stlrw R1, [R10]",
                    "storestore",
                    "strb zr, [R11, R12]",
                    "membar_volatile (elided)",
                    "ret",
                ],
            );
        match check_output(&stdout(missing_fence), OperationKind::Store, GcMode::Cms, axis) {
            Err(Error::MissingExpectedOutput { method, token, .. }) => {
                assert_eq!(method, "testObj");
                assert_eq!(token, "dmb ishst");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn swapped_tokens_fail() {
        let axis = ConfigAxis::new(true, false);
        let text = block(
            "testInt",
            &["membar_release", "dmb ish", "strw", "membar_volatile", "dmb ish", "ret"],
        ) + &block(
            "testObj",
            // card mark before the store
            &[
                "membar_release",
                "dmb ish",
                "membar_volatile",
                "dmb ish",
                "strb",
                "str",
                "membar_volatile",
                "dmb ish",
                "ret",
            ],
        );
        let result = check_output(&stdout(text), OperationKind::Store, GcMode::G1, axis);
        assert!(matches!(
            result,
            Err(Error::MissingExpectedOutput { ref method, .. }) if method == "testObj"
        ));
    }

    #[test]
    fn reports_first_missing_token() {
        let axis = ConfigAxis::new(false, true);
        let text = block("testInt", &["something else entirely"]);
        let verifier_output = stdout(text);
        let verifier = Verifier::new(&verifier_output);
        let sequence = expected::expected_sequence(
            TestSpec {
                operation: OperationKind::Load,
                data: DataKind::Int,
            },
            GcMode::G1,
            axis,
        )
        .unwrap();
        match verifier.check_compile(&mut Cursor::new(), "testInt", &sequence, CheckMode::Fatal) {
            Err(Error::MissingExpectedOutput { token, output, .. }) => {
                assert_eq!(token, "ldarw");
                assert!(output.contains("something else entirely"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn wrong_method_rejected_even_if_instructions_match() {
        let axis = ConfigAxis::new(true, true);
        let text = block(
            "testOther",
            &["ldrw  R0, [R10]", "membar_acquire", "dmb ish", "ret"],
        );
        match check_output(&stdout(text), OperationKind::Load, GcMode::Serial, axis) {
            Err(Error::WrongMethod { found, method, .. }) => {
                assert_eq!(method, "testInt");
                assert!(found.contains("testOther"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_block() {
        let result = check_output(
            &stdout("no compilation happened\n"),
            OperationKind::GetAndAdd,
            GcMode::G1,
            ConfigAxis::new(false, true),
        );
        assert!(matches!(result, Err(Error::MissingMethodBlock { .. })));
    }

    fn cae_primitive_blocks() -> String {
        let mut text = String::new();
        for (method, instruction) in [
            ("testInt", "cmpxchgw_acq"),
            ("testLong", "cmpxchg_acq"),
            ("testByte", "cmpxchgb_acq"),
            ("testShort", "cmpxchgs_acq"),
        ] {
            text.push_str(&block(
                method,
                &[
                    "membar_release (elided)",
                    instruction,
                    "membar_acquire (elided)",
                    "ret",
                ],
            ));
        }
        text
    }

    #[test]
    fn cae_accepts_card_mark_either_side() {
        let axis = ConfigAxis::new(false, true);
        for gc in [GcMode::Serial, GcMode::Parallel] {
            let store_first = cae_primitive_blocks()
                + &block(
                    "testObj",
                    &[
                        "membar_release (elided)",
                        "strb zr, [R11, R12]",
                        "cmpxchgw_acq R0, [R10], R1",
                        "membar_acquire (elided)",
                        "ret",
                    ],
                );
            check_output(&stdout(store_first), OperationKind::CompareAndExchange, gc, axis)
                .unwrap();

            let swap_first = cae_primitive_blocks()
                + &block(
                    "testObj",
                    &[
                        "membar_release (elided)",
                        "cmpxchgw_acq R0, [R10], R1",
                        "strb zr, [R11, R12]",
                        "membar_acquire (elided)",
                        "ret",
                    ],
                );
            check_output(&stdout(swap_first), OperationKind::CompareAndExchange, gc, axis)
                .unwrap();
        }
    }

    #[test]
    fn cae_fallback_still_fails_on_real_mismatch() {
        let axis = ConfigAxis::new(false, true);
        let text = cae_primitive_blocks()
            + &block(
                "testObj",
                &[
                    "membar_release (elided)",
                    "cmpxchgw_acq R0, [R10], R1",
                    "membar_acquire (elided)",
                    "ret",
                ],
            );
        match check_output(
            &stdout(text),
            OperationKind::CompareAndExchange,
            GcMode::Serial,
            axis,
        ) {
            Err(Error::MissingExpectedOutput { method, token, .. }) => {
                assert_eq!(method, "testObj");
                assert_eq!(token, "strb");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn cas_does_not_tolerate_reordering() {
        let axis = ConfigAxis::new(false, true);
        let text = cae_primitive_blocks()
            + &block(
                "testObj",
                &[
                    "membar_release (elided)",
                    "strb zr, [R11, R12]",
                    "cmpxchgw_acq R0, [R10], R1",
                    "membar_acquire (elided)",
                    "ret",
                ],
            );
        assert!(check_output(&stdout(text), OperationKind::Cas, GcMode::Serial, axis).is_err());
    }

    #[test]
    fn probe_mode_does_not_error() {
        let output = stdout(block("testInt", &["ret"]));
        let verifier = Verifier::new(&output);
        let sequence: ExpectedSequence = ["ldarw", "ret"].into_iter().collect();
        let mut cursor = Cursor::new();
        assert!(!verifier
            .check_compile(&mut cursor, "testInt", &sequence, CheckMode::Probe)
            .unwrap());
        let mut cursor = Cursor::new();
        assert!(!verifier
            .check_compile(&mut cursor, "testObj", &sequence, CheckMode::Probe)
            .unwrap());
    }
}
