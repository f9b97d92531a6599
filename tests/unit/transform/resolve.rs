use super::*;

fn table() -> OverrideTable {
    let mut t = OverrideTable::new();
    t.insert(Selector::by_id("42"), "FLIP_H", "ROTATE_90");
    t.insert(Selector::by_hash("beef"), "FLIP_H", "ROTATE_270");
    t.insert(Selector::by_hash("beef"), "FLIP_V", "none");
    t
}

#[test]
fn label_is_normalized_and_defaults_to_none() {
    let r = resolve_transform("flip_v", None, None, &OverrideTable::new());
    assert_eq!(r.label, "FLIP_V");
    assert_eq!(r.op, TransformOp::FlipV);
    assert_eq!(r.source, LabelSource::Part);

    let r = resolve_transform("", None, None, &OverrideTable::new());
    assert_eq!(r.label, "NONE");
    assert_eq!(r.op, TransformOp::Identity);
    assert!(r.recognized);
}

#[test]
fn id_override_wins_over_hash_override() {
    let r = resolve_transform("flip_h", Some("42"), Some("beef"), &table());
    assert_eq!(r.label, "ROTATE_90");
    assert_eq!(r.source, LabelSource::IdOverride);
    assert_eq!(r.op, TransformOp::Rotate90);
}

#[test]
fn hash_override_applies_when_id_has_no_rule() {
    let r = resolve_transform("FLIP_H", Some("7"), Some("beef"), &table());
    assert_eq!(r.label, "ROTATE_270");
    assert_eq!(r.source, LabelSource::HashOverride);

    // Id rules exist for 42 but not for this label.
    let r = resolve_transform("flip_v", Some("42"), Some("beef"), &table());
    assert_eq!(r.label, "NONE");
    assert_eq!(r.source, LabelSource::HashOverride);
    assert_eq!(r.op, TransformOp::Identity);
}

#[test]
fn no_matching_rule_keeps_label() {
    let r = resolve_transform("rotate_180", Some("42"), Some("beef"), &table());
    assert_eq!(r.label, "ROTATE_180");
    assert_eq!(r.source, LabelSource::Part);
    assert_eq!(r.op, TransformOp::Rotate180);
}

#[test]
fn unrecognized_label_falls_back_to_identity() {
    let r = resolve_transform("shear_x", None, None, &OverrideTable::new());
    assert_eq!(r.label, "SHEAR_X");
    assert_eq!(r.op, TransformOp::Identity);
    assert!(!r.recognized);
}
