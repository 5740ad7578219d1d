//! Stable `u64` identifiers for OSM nodes and ways.

use log::warn;

/// Ways carry bit 62; nodes use the raw identifier. The lower 62 bits hold
/// the OSM id.
const WAY_ID_PREFIX: u64 = 1 << 62;
const RAW_ID_MASK: u64 = (1 << 62) - 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum OsmElementKind {
    Node,
    Way,
}

pub(super) fn encode_element_id(kind: OsmElementKind, raw_id: i64) -> Option<u64> {
    let Ok(base) = u64::try_from(raw_id) else {
        warn!("Skipped OSM {kind:?} {raw_id}: negative identifiers are unsupported");
        return None;
    };
    if base > RAW_ID_MASK {
        warn!("Skipped OSM {kind:?} {raw_id}: identifier exceeds {RAW_ID_MASK}");
        return None;
    }
    Some(match kind {
        OsmElementKind::Node => base,
        OsmElementKind::Way => WAY_ID_PREFIX | base,
    })
}
