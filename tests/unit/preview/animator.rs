use std::collections::BTreeMap;

use super::*;
use crate::animation::custom::CustomAnimation;
use crate::animation::layout::SheetLayout;
use crate::assets::decode::SpriteImage;
use crate::render::surface::PixelSource;

const INTERVAL: Duration = Duration::from_millis(125);

fn registry() -> AnimationRegistry {
    let custom: CustomAnimation = serde_json::from_str(
        r#"{"frameSize": 128, "frames": [["walk-n,1", "walk-n,2", "walk-n,3"], ["walk-s,1"]], "skipFirstFrameInPreview": true}"#,
    )
    .unwrap();
    AnimationRegistry::new(BTreeMap::from([("wide".to_string(), custom)]))
}

/// Sheet whose walk frames carry their column index in the red channel.
fn walk_sheet(registry: &AnimationRegistry) -> CompositeSheet {
    let layout = SheetLayout::new(registry, &["wide"]).unwrap();
    let mut surface = Surface::new(layout.size);
    for col in 0..9u32 {
        let px = [col as u8 * 10, 0, 0, 255];
        let frame = SpriteImage::from_premul(64, 256, px.repeat(64 * 256)).unwrap();
        surface.draw_image(&frame, col * 64, 8 * 64);
    }
    let band = SpriteImage::from_premul(128, 128, [0, 200, 0, 255].repeat(128 * 128)).unwrap();
    surface.draw_image(&band, 256, 3456);
    CompositeSheet { surface, layout }
}

#[test]
fn default_cycles_skip_rest_pose() {
    let walk = standard_animation("walk").unwrap();
    assert_eq!(default_cycle(walk), (1..9).collect::<Vec<_>>());
    let idle = standard_animation("idle").unwrap();
    assert_eq!(default_cycle(idle), [1]);
}

#[test]
fn single_frame_cycle_holds_its_frame() {
    let registry = registry();
    let sheet = walk_sheet(&registry);
    let mut a = Animator::new(INTERVAL);
    a.select_standard("combat_idle", None).unwrap();
    assert_eq!(a.cycle(), [1]);
    let t0 = Instant::now();
    a.start(t0);
    assert!(a.tick(t0 + INTERVAL * 2, &sheet));
    assert_eq!(a.current_frame(), 1);
    assert!(a.tick(t0 + INTERVAL * 4, &sheet));
    assert_eq!(a.current_frame(), 1);
}

#[test]
fn idle_until_started() {
    let registry = registry();
    let sheet = walk_sheet(&registry);
    let mut a = Animator::new(INTERVAL);
    let t0 = Instant::now();
    assert_eq!(a.state(), PreviewState::Idle);
    assert!(!a.tick(t0 + INTERVAL * 4, &sheet));
    a.start(t0);
    assert_eq!(a.state(), PreviewState::Playing);
    assert!(!a.tick(t0 + INTERVAL, &sheet));
    assert!(a.tick(t0 + INTERVAL + Duration::from_millis(1), &sheet));
}

#[test]
fn ticks_advance_and_draw_all_rows() {
    let registry = registry();
    let sheet = walk_sheet(&registry);
    let mut a = Animator::new(INTERVAL);
    assert_eq!(a.strip().size(), Size::new(256, 64));
    let t0 = Instant::now();
    a.start(t0);

    let mut now = t0;
    let mut shown = Vec::new();
    for _ in 0..9 {
        now += INTERVAL + Duration::from_millis(1);
        assert!(a.tick(now, &sheet));
        shown.push(a.current_frame());
    }
    assert_eq!(shown, [2, 3, 4, 5, 6, 7, 8, 1, 2]);
    // column 2 in every direction row
    for row in 0..4 {
        assert_eq!(a.strip().pixel(row * 64 + 5, 5), [20, 0, 0, 255]);
    }
}

#[test]
fn selecting_resets_index_and_strip() {
    let mut a = Animator::new(INTERVAL);
    let sheet = walk_sheet(&registry());
    let t0 = Instant::now();
    a.start(t0);
    a.tick(t0 + INTERVAL * 2, &sheet);
    assert_eq!(a.current_frame(), 2);

    a.select_standard("hurt", None).unwrap();
    assert_eq!(a.current_frame(), 1);
    assert_eq!(a.strip().size(), Size::new(64, 64));

    a.select_standard("walk", Some(vec![0, 4])).unwrap();
    assert_eq!(a.cycle(), [0, 4]);
    assert!(a.select_standard("walk", Some(vec![9])).is_err());
    assert!(a.select_standard("fly", None).is_err());
}

#[test]
fn custom_preview_reads_its_band() {
    let registry = registry();
    let sheet = walk_sheet(&registry);
    let mut a = Animator::new(INTERVAL);
    a.select_custom("wide", &registry).unwrap();
    assert_eq!(a.cycle(), [1, 2]);
    assert_eq!(a.strip().size(), Size::new(256, 128));

    let t0 = Instant::now();
    a.start(t0);
    assert!(a.tick(t0 + INTERVAL * 2, &sheet));
    assert_eq!(a.current_frame(), 2);
    // column 2 of the band's first row
    assert_eq!(a.strip().pixel(10, 10), [0, 200, 0, 255]);
    assert!(a.select_custom("missing", &registry).is_err());
}

#[test]
fn elapsed_remainder_keeps_cadence() {
    let sheet = walk_sheet(&registry());
    let mut a = Animator::new(INTERVAL);
    let t0 = Instant::now();
    a.start(t0);
    // 2.5 intervals late: one advance, clock realigned to the interval grid
    assert!(a.tick(t0 + INTERVAL * 5 / 2, &sheet));
    assert!(!a.tick(t0 + INTERVAL * 3, &sheet));
    assert!(a.tick(t0 + INTERVAL * 3 + Duration::from_millis(1), &sheet));
}
