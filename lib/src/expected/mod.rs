//! Instruction sequences a correct C2 backend must emit for each volatile operation.
//!
//! Sequences are built from three pieces: the leading release barrier (if any), the memory
//! instruction itself, and the trailing barrier. Object stores additionally get a card-marking
//! fragment whose shape depends on the collector's write barrier.

mod cae;
mod cas;
mod gaa;
mod gas;
mod load;
mod store;

use crate::matcher::TokenPattern;
use crate::{ConfigAxis, DataKind, Error, GcMode, OperationKind, TestSpec};
use std::fmt;

pub const RET: &str = "ret";
pub const STRB: &str = "strb";
pub const DMB_ISH: &str = "dmb ish";
pub const DMB_ISHST: &str = "dmb ishst";
pub const MEMBAR_ACQUIRE: &str = "membar_acquire";
pub const MEMBAR_RELEASE: &str = "membar_release";
pub const MEMBAR_VOLATILE: &str = "membar_volatile";
pub const STORESTORE: &str = "storestore";
pub const MEMBAR_ACQUIRE_ELIDED: &str = r"membar_acquire \(elided\)";
pub const MEMBAR_RELEASE_ELIDED: &str = r"membar_release \(elided\)";
pub const MEMBAR_VOLATILE_ELIDED: &str = r"membar_volatile \(elided\)";
pub const STORESTORE_ELIDED: &str = r"storestore \(elided\)";

/// Ordered regex tokens that must appear (as a subsequence) in one method's block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedSequence {
    tokens: Vec<String>,
}

impl ExpectedSequence {
    pub fn new() -> ExpectedSequence {
        ExpectedSequence::default()
    }

    /// Append one token
    pub fn then(mut self, token: impl Into<String>) -> ExpectedSequence {
        self.tokens.push(token.into());
        self
    }

    /// Append several tokens
    pub fn then_all(mut self, tokens: &[&str]) -> ExpectedSequence {
        self.tokens.extend(tokens.iter().map(|token| String::from(*token)));
        self
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn patterns(&self) -> Result<Vec<TokenPattern>, Error> {
        self.tokens
            .iter()
            .map(|token| TokenPattern::new(token))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ExpectedSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> ExpectedSequence {
        ExpectedSequence {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Renders as `{ tok1, tok2, ... }`, one token per line
impl fmt::Display for ExpectedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "{ ";
        for token in &self.tokens {
            write!(f, "{}{}", separator, token)?;
            separator = ",\n    ";
        }
        f.write_str(" }")
    }
}

/// What to look for in the compiled block of one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCheck {
    pub method: &'static str,

    pub expected: ExpectedSequence,

    /// Alternate sequence to retry with (from the same starting point) if `expected` is not found
    ///
    /// Only set where instruction scheduling legitimately varies.
    pub fallback: Option<ExpectedSequence>,
}

impl MethodCheck {
    pub fn new(data: DataKind, expected: ExpectedSequence) -> MethodCheck {
        MethodCheck {
            method: data.method_name(),
            expected,
            fallback: None,
        }
    }
}

/// Card-marking strategy of a collector, as visible in volatile object writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMark {
    /// Plain card mark with no extra ordering (Serial, Parallel)
    Plain,

    /// Full volatile barrier before the card mark (G1)
    VolatileFenced,

    /// Full volatile barrier, then an elided store-store barrier before the card mark (CMS with
    /// `UseCondCardMark`)
    Conditional,

    /// Cheap store-store fence before the card mark (CMS)
    StoreStoreFenced,

    /// No separate card-mark step (Shenandoah)
    Absent,
}

impl CardMark {
    pub fn of(gc: GcMode) -> CardMark {
        match gc {
            GcMode::Serial | GcMode::Parallel => CardMark::Plain,
            GcMode::G1 => CardMark::VolatileFenced,
            GcMode::CmsCondMark => CardMark::Conditional,
            GcMode::Cms => CardMark::StoreStoreFenced,
            GcMode::Shenandoah | GcMode::ShenandoahTraversal => CardMark::Absent,
        }
    }

    /// Tokens emitted between the memory instruction and the trailing barrier
    ///
    /// `plain` is what shows up for `CardMark::Plain`, which varies with the operation.
    pub fn fragment(self, plain: &'static [&'static str]) -> &'static [&'static str] {
        match self {
            CardMark::Plain => plain,
            CardMark::VolatileFenced => &[MEMBAR_VOLATILE, DMB_ISH, STRB],
            CardMark::Conditional => &[MEMBAR_VOLATILE, DMB_ISH, STORESTORE_ELIDED, STRB],
            CardMark::StoreStoreFenced => &[STORESTORE, DMB_ISHST, STRB],
            CardMark::Absent => &[],
        }
    }
}

/// Barrier before a releasing operation
pub(crate) fn release(axis: ConfigAxis) -> &'static [&'static str] {
    if axis.use_barriers_for_volatile {
        &[MEMBAR_RELEASE, DMB_ISH]
    } else {
        &[MEMBAR_RELEASE_ELIDED]
    }
}

/// Barrier after an acquiring operation
pub(crate) fn acquire(axis: ConfigAxis) -> &'static [&'static str] {
    if axis.use_barriers_for_volatile {
        &[MEMBAR_ACQUIRE, DMB_ISH]
    } else {
        &[MEMBAR_ACQUIRE_ELIDED]
    }
}

/// Full barrier after a volatile store
pub(crate) fn trailing_volatile(axis: ConfigAxis) -> &'static [&'static str] {
    if axis.use_barriers_for_volatile {
        &[MEMBAR_VOLATILE, DMB_ISH]
    } else {
        &[MEMBAR_VOLATILE_ELIDED]
    }
}

/// Pick the narrow or wide form of an instruction operating on an object reference
pub(crate) fn oop_width(axis: ConfigAxis, narrow: &'static str, wide: &'static str) -> &'static str {
    if axis.use_compressed_oops {
        narrow
    } else {
        wide
    }
}

/// Token for an atomic read-modify-write instruction
///
/// With the transform applied the instruction carries acquire semantics (`_acq` suffix). With
/// explicit barriers it is the bare form, where the trailing space keeps it from matching `_acq`.
pub(crate) fn atomic_instruction(base: &str, axis: ConfigAxis) -> String {
    if axis.use_barriers_for_volatile {
        format!("{} ", base)
    } else {
        format!("{}_acq", base)
    }
}

/// Sequence for an atomic read-modify-write on a primitive field (no card mark)
pub(crate) fn atomic_primitive(base: &str, axis: ConfigAxis) -> ExpectedSequence {
    ExpectedSequence::new()
        .then_all(release(axis))
        .then(atomic_instruction(base, axis))
        .then_all(acquire(axis))
        .then(RET)
}

/// Expected check for one method, or `None` if the operation has no such method
pub fn method_check(spec: TestSpec, gc: GcMode, axis: ConfigAxis) -> Option<MethodCheck> {
    match spec.operation {
        OperationKind::Load => load::expected(spec.data, axis),
        OperationKind::Store => store::expected(spec.data, gc, axis),
        OperationKind::Cas | OperationKind::WeakCas => cas::expected(spec.data, gc, axis),
        OperationKind::CompareAndExchange => cae::expected(spec.data, gc, axis),
        OperationKind::GetAndSet => gas::expected(spec.data, gc, axis),
        OperationKind::GetAndAdd => gaa::expected(spec.data, axis),
    }
}

/// Checks for every method of a test class, in the order they are expected in the output
pub fn method_checks(operation: OperationKind, gc: GcMode, axis: ConfigAxis) -> Vec<MethodCheck> {
    operation
        .data_kinds()
        .iter()
        .filter_map(|&data| method_check(TestSpec { operation, data }, gc, axis))
        .collect()
}

/// Expected sequence for one method (the first ordering tried, when there is a fallback)
pub fn expected_sequence(
    spec: TestSpec,
    gc: GcMode,
    axis: ConfigAxis,
) -> Option<ExpectedSequence> {
    method_check(spec, gc, axis).map(|check| check.expected)
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(spec: TestSpec, gc: GcMode, axis: ConfigAxis) -> Vec<String> {
        expected_sequence(spec, gc, axis).unwrap().tokens().to_vec()
    }

    #[test]
    fn every_listed_data_kind_has_a_check() {
        for operation in OperationKind::ALL {
            for gc in GcMode::ALL {
                for axis in ConfigAxis::expand(operation) {
                    let checks = method_checks(operation, gc, axis);
                    let methods: Vec<&str> = checks.iter().map(|c| c.method).collect();
                    let listed: Vec<&str> = operation
                        .data_kinds()
                        .iter()
                        .map(|d| d.method_name())
                        .collect();
                    assert_eq!(methods, listed, "{:?} {:?} {}", operation, gc, axis);
                }
            }
        }
    }

    #[test]
    fn all_tokens_are_valid_patterns() {
        for operation in OperationKind::ALL {
            for gc in GcMode::ALL {
                for axis in ConfigAxis::expand(operation) {
                    for check in method_checks(operation, gc, axis) {
                        assert!(check.expected.patterns().is_ok());
                        if let Some(fallback) = check.fallback {
                            assert!(fallback.patterns().is_ok());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn every_sequence_ends_in_ret() {
        for operation in OperationKind::ALL {
            for gc in GcMode::ALL {
                for axis in ConfigAxis::expand(operation) {
                    for check in method_checks(operation, gc, axis) {
                        assert_eq!(check.expected.tokens().last().unwrap(), RET);
                    }
                }
            }
        }
    }

    #[test]
    fn only_cae_has_fallbacks() {
        for operation in OperationKind::ALL {
            for gc in GcMode::ALL {
                for axis in ConfigAxis::expand(operation) {
                    for check in method_checks(operation, gc, axis) {
                        let expect_fallback = operation == OperationKind::CompareAndExchange
                            && check.method == "testObj"
                            && CardMark::of(gc) == CardMark::Plain
                            && !axis.use_barriers_for_volatile;
                        assert_eq!(check.fallback.is_some(), expect_fallback);
                    }
                }
            }
        }
    }

    #[test]
    fn cms_object_store_without_barriers() {
        let spec = TestSpec {
            operation: OperationKind::Store,
            data: DataKind::Object,
        };
        assert_eq!(
            tokens(spec, GcMode::Cms, ConfigAxis::new(false, true)),
            vec![
                r"membar_release \(elided\)",
                "stlrw?",
                "storestore",
                "dmb ishst",
                "strb",
                r"membar_volatile \(elided\)",
                "ret",
            ]
        );
        assert_eq!(
            tokens(spec, GcMode::Cms, ConfigAxis::new(false, false))[1],
            "stlr"
        );
    }

    #[test]
    fn int_load_with_barriers() {
        let spec = TestSpec {
            operation: OperationKind::Load,
            data: DataKind::Int,
        };
        for gc in GcMode::ALL {
            assert_eq!(
                tokens(spec, gc, ConfigAxis::new(true, true)),
                vec!["ldrw", "membar_acquire", "dmb ish", "ret"]
            );
        }
    }

    #[test]
    fn card_mark_fragments() {
        assert_eq!(CardMark::of(GcMode::Serial).fragment(&[STRB]), &[STRB]);
        assert_eq!(CardMark::of(GcMode::Parallel).fragment(&[]), &[] as &[&str]);
        assert_eq!(
            CardMark::of(GcMode::CmsCondMark).fragment(&[]),
            &[MEMBAR_VOLATILE, DMB_ISH, STORESTORE_ELIDED, STRB]
        );
        assert_eq!(
            CardMark::of(GcMode::ShenandoahTraversal).fragment(&[STRB]),
            &[] as &[&str]
        );
    }

    #[test]
    fn display_like_a_java_array() {
        let sequence: ExpectedSequence = ["ldrw", "ret"].into_iter().collect();
        assert_eq!(sequence.to_string(), "{ ldrw,\n    ret }");
    }
}
