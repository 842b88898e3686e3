use super::{acquire, oop_width, ExpectedSequence, MethodCheck, RET};
use crate::{ConfigAxis, DataKind};

/// Volatile loads never involve the collector: an acquiring load, or a plain load followed by an
/// acquire barrier
pub fn expected(data: DataKind, axis: ConfigAxis) -> Option<MethodCheck> {
    let load = match (data, axis.use_barriers_for_volatile) {
        (DataKind::Int, false) => "ldarw",
        (DataKind::Int, true) => "ldrw",
        (DataKind::Object, false) => oop_width(axis, "ldarw?", "ldar"),
        (DataKind::Object, true) => oop_width(axis, "ldrw?", "ldr"),
        _ => return None,
    };

    let expected = ExpectedSequence::new()
        .then(load)
        .then_all(acquire(axis))
        .then(RET);
    Some(MethodCheck::new(data, expected))
}
