use std::collections::BTreeMap;

use crate::animation::custom::{CustomAnimation, FrameRef};

use super::*;

fn anim(frame_size: u32, rows: usize, cols: usize, base: &str) -> CustomAnimation {
    CustomAnimation {
        frame_size,
        frames: (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|c| FrameRef {
                        row: "walk-s".to_string(),
                        column: c as u32,
                    })
                    .collect()
            })
            .collect(),
        base: base.to_string(),
        skip_first_frame_in_preview: false,
    }
}

fn registry() -> AnimationRegistry {
    let mut custom = BTreeMap::new();
    custom.insert("strip".to_string(), anim(64, 1, 3, "walk"));
    custom.insert("wide".to_string(), anim(128, 4, 8, "sit"));
    AnimationRegistry::new(custom)
}

#[test]
fn empty_list_is_the_universal_sheet() {
    let reg = registry();
    assert_eq!(
        total_sheet_size::<&str>(&reg, &[]).unwrap(),
        Size::new(832, 3456)
    );
    assert_eq!(SheetLayout::standard_only().size, Size::new(832, 3456));
}

#[test]
fn one_row_of_three_frames_adds_one_frame_of_height() {
    let reg = registry();
    assert_eq!(
        total_sheet_size(&reg, &["strip"]).unwrap(),
        Size::new(832, 3456 + 64)
    );
}

#[test]
fn wide_band_widens_sheet_and_bands_accumulate() {
    let reg = registry();
    let layout = SheetLayout::new(&reg, &["strip", "wide"]).unwrap();
    assert_eq!(layout.size, Size::new(1024, 3456 + 64 + 512));
    assert_eq!(layout.band("strip").unwrap().y, 3456);
    assert_eq!(layout.band("wide").unwrap().y, 3456 + 64);
    assert_eq!(layout.band("wide").unwrap().frame_size, 128);

    let swapped = SheetLayout::new(&reg, &["wide", "strip"]).unwrap();
    assert_eq!(swapped.band("strip").unwrap().y, 3456 + 512);
}

#[test]
fn unknown_custom_animation_is_a_validation_error() {
    assert!(SheetLayout::new(&registry(), &["nope"]).is_err());
}

#[test]
fn distinct_ids_keep_first_seen_order() {
    let ids = [None, Some("b"), Some("a"), None, Some("b")];
    assert_eq!(distinct_custom_animations(ids), ["b", "a"]);
}
