use super::{
    oop_width, release, trailing_volatile, CardMark, ExpectedSequence, MethodCheck, RET,
};
use crate::{ConfigAxis, DataKind, GcMode};

/// Volatile stores: release barrier, the store, then a full barrier
///
/// Object stores get the collector's card mark between the store and the trailing barrier.
pub fn expected(data: DataKind, gc: GcMode, axis: ConfigAxis) -> Option<MethodCheck> {
    let store = match (data, axis.use_barriers_for_volatile) {
        (DataKind::Int, false) => "stlrw",
        (DataKind::Int, true) => "strw",
        (DataKind::Object, false) => oop_width(axis, "stlrw?", "stlr"),
        (DataKind::Object, true) => oop_width(axis, "strw?", "str"),
        _ => return None,
    };
    let card_mark: &[&str] = if data == DataKind::Object {
        CardMark::of(gc).fragment(&[])
    } else {
        &[]
    };

    let expected = ExpectedSequence::new()
        .then_all(release(axis))
        .then(store)
        .then_all(card_mark)
        .then_all(trailing_volatile(axis))
        .then(RET);
    Some(MethodCheck::new(data, expected))
}
