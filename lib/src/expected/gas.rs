use super::{
    acquire, atomic_instruction, atomic_primitive, oop_width, release, CardMark,
    ExpectedSequence, MethodCheck, RET, STRB,
};
use crate::{ConfigAxis, DataKind, GcMode};

/// Get-and-set (atomic exchange)
///
/// Unlike compare-and-swap there is no Shenandoah specific instruction.
pub fn expected(data: DataKind, gc: GcMode, axis: ConfigAxis) -> Option<MethodCheck> {
    let base = match data {
        DataKind::Int => "atomic_xchgw",
        DataKind::Long => "atomic_xchg",
        DataKind::Object => oop_width(axis, "atomic_xchgw?", "atomic_xchg"),
        DataKind::Byte | DataKind::Short => return None,
    };
    if data != DataKind::Object {
        return Some(MethodCheck::new(data, atomic_primitive(base, axis)));
    }

    let plain: &'static [&'static str] = if axis.use_barriers_for_volatile {
        &[]
    } else {
        &[STRB]
    };
    let expected = ExpectedSequence::new()
        .then_all(release(axis))
        .then(atomic_instruction(base, axis))
        .then_all(CardMark::of(gc).fragment(plain))
        .then_all(acquire(axis))
        .then(RET);
    Some(MethodCheck::new(data, expected))
}
