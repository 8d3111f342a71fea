use areaforge_core::EntityKind;
use log::warn;

/// Derive the area identifier for a source way or relation.
///
/// Ways map to even identifiers and relations to odd ones, so both share
/// one identifier space without collisions.
pub(super) fn area_id(kind: EntityKind, source_id: i64) -> Option<i64> {
    let offset = match kind {
        EntityKind::Way => 0,
        EntityKind::Relation => 1,
        EntityKind::Node | EntityKind::Area => return None,
    };
    let id = source_id
        .checked_mul(2)
        .and_then(|doubled| doubled.checked_add(offset));
    if id.is_none() {
        warn!("Skipped area: kind={kind:?}, source_id={source_id} (identifier out of range)");
    }
    id
}
