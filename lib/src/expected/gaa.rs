use super::{atomic_primitive, MethodCheck};
use crate::{ConfigAxis, DataKind};

/// Get-and-add only exists for integral fields, so the collector never matters
pub fn expected(data: DataKind, axis: ConfigAxis) -> Option<MethodCheck> {
    let base = match data {
        DataKind::Int => "get_and_addI",
        DataKind::Long => "get_and_addL",
        _ => return None,
    };
    Some(MethodCheck::new(data, atomic_primitive(base, axis)))
}
