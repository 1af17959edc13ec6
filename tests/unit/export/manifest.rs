use super::*;

#[test]
fn flat_manifest_records_both_sides() {
    let mut m = FlatManifest::default();
    m.record("walk", true);
    m.record("jump", false);
    assert_eq!(m.exported, ["walk"]);
    assert_eq!(m.failed, ["jump"]);
}

#[test]
fn grouped_manifest_keeps_touched_groups() {
    let mut m = GroupedManifest::default();
    m.touch("walk");
    m.touch("slash");
    m.record("walk", "010 body.png", true);
    m.record("slash", "140 sword.png", false);
    assert_eq!(m.exported["walk"], ["010 body.png"]);
    assert!(m.exported["slash"].is_empty());
    assert_eq!(m.failed_count(), 1);
}

#[test]
fn metadata_serializes_with_camel_case_keys() {
    let mut standard = FlatManifest::default();
    standard.record("walk", true);
    let meta = ExportMetadata::new(
        "2026-10-17T09-30-00",
        BodyType::Female,
        standard,
        FlatManifest::default(),
    );
    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(json["exportTimestamp"], "2026-10-17T09-30-00");
    assert_eq!(json["bodyType"], "female");
    assert_eq!(json["standardAnimations"]["exported"][0], "walk");
    assert_eq!(json["customAnimations"]["failed"].as_array().unwrap().len(), 0);
    assert_eq!(json["frameSize"], 64);
    assert_eq!(json["frameCounts"]["shoot"], 13);
    assert_eq!(json["frameCounts"].as_object().unwrap().len(), 15);
}
