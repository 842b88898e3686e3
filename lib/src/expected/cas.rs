use super::{
    acquire, atomic_instruction, atomic_primitive, oop_width, release, CardMark,
    ExpectedSequence, MethodCheck, RET, STRB,
};
use crate::{ConfigAxis, DataKind, GcMode};

/// Base `cmpxchg` mnemonic for a primitive field
pub(super) fn primitive_instruction(data: DataKind) -> Option<&'static str> {
    match data {
        DataKind::Int => Some("cmpxchgw"),
        DataKind::Long => Some("cmpxchg"),
        DataKind::Byte => Some("cmpxchgb"),
        DataKind::Short => Some("cmpxchgs"),
        DataKind::Object => None,
    }
}

/// `cmpxchg` token for an object field
///
/// Shenandoah has its own compare-and-swap (which deals with forwarded objects).
pub(super) fn object_instruction(gc: GcMode, axis: ConfigAxis) -> String {
    let base = oop_width(axis, "cmpxchgw?", "cmpxchg");
    if matches!(gc, GcMode::Shenandoah | GcMode::ShenandoahTraversal) {
        if axis.use_barriers_for_volatile {
            format!("{}_shenandoah", base)
        } else {
            format!("{}_acq_shenandoah", base)
        }
    } else {
        atomic_instruction(base, axis)
    }
}

/// Compare-and-swap (strong or weak)
pub fn expected(data: DataKind, gc: GcMode, axis: ConfigAxis) -> Option<MethodCheck> {
    if let Some(base) = primitive_instruction(data) {
        return Some(MethodCheck::new(data, atomic_primitive(base, axis)));
    }

    // Plain card marks only show up when the transform is applied
    let plain: &'static [&'static str] = if axis.use_barriers_for_volatile {
        &[]
    } else {
        &[STRB]
    };
    let expected = ExpectedSequence::new()
        .then_all(release(axis))
        .then(object_instruction(gc, axis))
        .then_all(CardMark::of(gc).fragment(plain))
        .then_all(acquire(axis))
        .then(RET);
    Some(MethodCheck::new(data, expected))
}
