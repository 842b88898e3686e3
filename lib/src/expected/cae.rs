use super::{acquire, cas, release, CardMark, ExpectedSequence, MethodCheck, RET, STRB};
use crate::{ConfigAxis, DataKind, GcMode};

/// Compare-and-exchange
///
/// Expectations match compare-and-swap, except that with a plain card mark and the transform
/// applied, the card mark store may be scheduled either before or after the `cmpxchg`. The
/// store-first order is tried first and the swap-first order is the fallback.
pub fn expected(data: DataKind, gc: GcMode, axis: ConfigAxis) -> Option<MethodCheck> {
    let check = cas::expected(data, gc, axis)?;
    if data != DataKind::Object
        || axis.use_barriers_for_volatile
        || CardMark::of(gc) != CardMark::Plain
    {
        return Some(check);
    }

    let store_first = ExpectedSequence::new()
        .then_all(release(axis))
        .then(STRB)
        .then(cas::object_instruction(gc, axis))
        .then_all(acquire(axis))
        .then(RET);
    Some(MethodCheck {
        method: check.method,
        expected: store_first,
        fallback: Some(check.expected),
    })
}
