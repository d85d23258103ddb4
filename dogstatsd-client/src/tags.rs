//! Tag composition.
//!
//! A client carries a sticky tag set (constant tags in configured order, plus the entity-id tag
//! when one is present) that is merged with the per-call tags of each measurement into a single
//! `|#`-prefixed clause.
//!
//! The clause emits the sticky set in reverse of its construction order, followed by the per-call
//! tags in reverse of the order the caller passed them. The two reversals never interleave.
//! Receivers treat tag order as insignificant, but recorded traffic is diffed byte-for-byte in
//! places, so the observable order is part of the wire contract and must not change.

/// Tag name under which the entity id is reported to the daemon.
pub(crate) const ENTITY_ID_TAG_NAME: &str = "dd.internal.entity_id";

/// Builds the sticky tag set from the configured constant tags and the optional entity id.
pub(crate) fn sticky_tags(constant_tags: Vec<String>, entity_id: Option<&str>) -> Vec<String> {
    let mut tags = constant_tags;
    if let Some(entity_id) = entity_id {
        tags.push(format!("{ENTITY_ID_TAG_NAME}:{entity_id}"));
    }
    tags
}

/// Appends the tag clause to `buf`, or nothing when both sources are empty.
pub(crate) fn push_tag_clause<S, C>(buf: &mut String, sticky: &[S], call: &[C])
where
    S: AsRef<str>,
    C: AsRef<str>,
{
    if sticky.is_empty() && call.is_empty() {
        return;
    }

    buf.push_str("|#");

    let mut first = true;
    let reversed_sticky = sticky.iter().rev().map(AsRef::as_ref);
    let reversed_call = call.iter().rev().map(AsRef::as_ref);
    for tag in reversed_sticky.chain(reversed_call) {
        if !first {
            buf.push(',');
        }
        buf.push_str(tag);
        first = false;
    }
}
