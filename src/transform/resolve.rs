use crate::transform::{
    op::TransformOp,
    overrides::{OverrideTable, Selector},
};

/// Where the final label came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelSource {
    /// The part's own label.
    Part,
    /// An override keyed by sprite id.
    IdOverride,
    /// An override keyed by sprite hash.
    HashOverride,
}

/// Outcome of [`resolve_transform`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTransform {
    /// Uppercased label after overrides.
    pub label: String,
    pub source: LabelSource,
    /// Operation to run. [`TransformOp::Identity`] for unrecognized labels.
    pub op: TransformOp,
    /// `false` when `label` is not one of the known labels.
    pub recognized: bool,
}

/// Resolve a raw part label to the operation to apply.
///
/// The label is uppercased (empty becomes `NONE`), then replaced by an id-keyed override if one
/// exists for it, otherwise by a hash-keyed override. Unknown labels fall back to identity.
pub fn resolve_transform(
    raw: &str,
    sprite_id: Option<&str>,
    sprite_hash: Option<&str>,
    table: &OverrideTable,
) -> ResolvedTransform {
    let mut label = raw.trim().to_ascii_uppercase();
    if label.is_empty() {
        label = TransformOp::Identity.label().to_string();
    }

    let by_id = sprite_id
        .filter(|id| !id.is_empty())
        .and_then(|id| table.lookup(&Selector::by_id(id), &label));
    let by_hash = || {
        sprite_hash
            .filter(|h| !h.is_empty())
            .and_then(|h| table.lookup(&Selector::by_hash(h), &label))
    };

    let (label, source) = if let Some(to) = by_id {
        (to.to_ascii_uppercase(), LabelSource::IdOverride)
    } else if let Some(to) = by_hash() {
        (to.to_ascii_uppercase(), LabelSource::HashOverride)
    } else {
        (label, LabelSource::Part)
    };

    match TransformOp::from_label(&label) {
        Some(op) => ResolvedTransform {
            label,
            source,
            op,
            recognized: true,
        },
        None => ResolvedTransform {
            label,
            source,
            op: TransformOp::Identity,
            recognized: false,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/resolve.rs"]
mod tests;
