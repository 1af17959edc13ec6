use std::collections::BTreeMap;
use std::io::Cursor;

use super::*;
use crate::assets::fetch::MemoryFetcher;
use crate::foundation::core::Size;
use crate::render::surface::PixelSource;

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn registry() -> Arc<AnimationRegistry> {
    let custom: CustomAnimation = serde_json::from_str(
        r#"{"frameSize": 128, "frames": [["walk-s,0", "walk-s,1"]], "base": "walk"}"#,
    )
    .unwrap();
    Arc::new(AnimationRegistry::new(BTreeMap::from([(
        "walk_128".to_string(),
        custom,
    )])))
}

fn layer(file: &str, z: i32, anims: &[&str], custom: Option<&str>) -> Layer {
    Layer {
        file_path: file.to_string(),
        z_pos: z,
        custom_animation: custom.map(str::to_string),
        name: "Item".to_string(),
        parent_name: "group".to_string(),
        variant: "v".to_string(),
        supported_animations: anims.iter().map(|a| a.to_string()).collect(),
        uploaded: false,
    }
}

fn compositor() -> (Arc<MemoryFetcher>, SheetCompositor) {
    let fetcher = Arc::new(MemoryFetcher::new());
    fetcher.insert("body/walk/light.png", png_bytes(128, 256, BLUE));
    fetcher.insert("body/slash/light.png", png_bytes(64, 256, BLUE));
    fetcher.insert("cape/walk_128/red.png", png_bytes(4, 4, RED));
    let cache = Arc::new(ImageCache::new(fetcher.clone()));
    (fetcher, SheetCompositor::new(cache, registry()))
}

#[tokio::test]
async fn standard_layer_fills_supported_rows_only() {
    let (_, comp) = compositor();
    let list = DrawList::new(vec![layer("body/light.png", 10, &["walk", "slash"], None)]);
    let outcome = comp.composite(&list).await.unwrap();
    assert_eq!(
        outcome,
        CompositeOutcome::Completed(RenderStats {
            layers: 1,
            drawn: 2,
            missing: 0
        })
    );

    let sheet = comp.snapshot().await;
    assert_eq!(sheet.surface.size(), Size::universal_sheet());
    assert_eq!(sheet.surface.pixel(0, 8 * 64), BLUE);
    assert_eq!(sheet.surface.pixel(0, 12 * 64), BLUE);
    let jump = standard_animation_region("jump");
    assert!(!sheet.surface.region_has_content(jump));
}

fn standard_animation_region(name: &str) -> PixelRect {
    crate::animation::standard::standard_animation(name)
        .unwrap()
        .region()
}

#[tokio::test]
async fn custom_band_gets_layer_and_copied_frames() {
    let (_, comp) = compositor();
    let list = DrawList::new(vec![
        layer("cape/walk_128/red.png", 5, &[], Some("walk_128")),
        layer("body/light.png", 10, &["walk"], None),
    ]);
    comp.composite(&list).await.unwrap();
    let sheet = comp.snapshot().await;

    assert_eq!(sheet.surface.size(), Size::new(832, 3456 + 128));
    assert_eq!(sheet.layout.band("walk_128").unwrap().y, 3456);
    // custom layer at the band origin
    assert_eq!(sheet.surface.pixel(0, 3456), RED);
    // walk-s frames centered in 128 px cells
    assert_eq!(sheet.surface.pixel(32, 3456 + 32), BLUE);
    assert_eq!(sheet.surface.pixel(128 + 95, 3456 + 95), BLUE);
    assert_eq!(sheet.surface.pixel(128 + 10, 3456 + 10), [0, 0, 0, 0]);
}

#[tokio::test]
async fn missing_images_are_skipped() {
    let (_, comp) = compositor();
    let list = DrawList::new(vec![layer("hair/none.png", 1, &["walk"], None)]);
    let outcome = comp.composite(&list).await.unwrap();
    assert_eq!(
        outcome,
        CompositeOutcome::Completed(RenderStats {
            layers: 1,
            drawn: 0,
            missing: 1
        })
    );
    assert!(!comp.snapshot().await.surface.has_content());
}

#[tokio::test]
async fn overlapping_pass_is_skipped() {
    let (fetcher, comp) = compositor();
    let list = DrawList::new(vec![layer("body/light.png", 10, &["walk"], None)]);
    let (first, second) = tokio::join!(comp.composite(&list), comp.composite(&list));
    assert!(matches!(first.unwrap(), CompositeOutcome::Completed(_)));
    assert_eq!(second.unwrap(), CompositeOutcome::Skipped);
    assert_eq!(fetcher.fetch_count("body/walk/light.png"), 1);
}

#[tokio::test]
async fn recomposite_is_pixel_identical() {
    let (fetcher, comp) = compositor();
    let list = DrawList::new(vec![
        layer("cape/walk_128/red.png", 5, &[], Some("walk_128")),
        layer("body/light.png", 10, &["walk", "slash"], None),
    ]);
    comp.composite(&list).await.unwrap();
    let a = comp.snapshot().await;
    comp.composite(&list).await.unwrap();
    let b = comp.snapshot().await;
    assert_eq!(a, b);
    assert_eq!(fetcher.total_fetches(), 3);
}

#[tokio::test]
async fn isolated_render_leaves_shared_sheet_alone() {
    let (_, comp) = compositor();
    let layers = [layer("body/light.png", 10, &["walk"], None)];
    let private = comp.render_isolated(&layers).await.unwrap();
    assert!(private.surface.has_content());
    assert!(comp.snapshot().await.surface.size().is_empty());
}

#[test]
fn small_custom_frames_scale_down() {
    let mut surface = Surface::new(Size::new(64, 64 * 11 + 32));
    let blue = SpriteImage::from_premul(64, 64, BLUE.repeat(64 * 64)).unwrap();
    surface.draw_image(&blue, 0, 10 * 64);
    let custom: CustomAnimation =
        serde_json::from_str(r#"{"frameSize": 32, "frames": [["walk-s,0"]]}"#).unwrap();
    copy_custom_frames(&mut surface, &custom, 11 * 64, &AnimationRowsLayout::standard());
    assert_eq!(surface.pixel(0, 11 * 64), BLUE);
    assert_eq!(surface.pixel(31, 11 * 64 + 31), BLUE);
}

#[tokio::test]
async fn missing_layer_leaves_custom_band_untouched() {
    let custom: CustomAnimation =
        serde_json::from_str(r#"{"frameSize": 64, "frames": [["walk-s,0"]], "base": "walk"}"#)
            .unwrap();
    let registry = Arc::new(AnimationRegistry::new(BTreeMap::from([(
        "w64".to_string(),
        custom,
    )])));
    let fetcher = Arc::new(MemoryFetcher::new());
    fetcher.insert("body/walk/light.png", png_bytes(64, 256, [0, 0, 255, 128]));
    let comp = SheetCompositor::new(Arc::new(ImageCache::new(fetcher)), registry);

    let band = layer("cape/w64/red.png", 1, &[], Some("w64"));
    let body = layer("body/light.png", 10, &["walk"], None);
    let absent = layer("hair/absent.png", 20, &["walk"], None);

    let without = comp
        .render_isolated(&[band.clone(), body.clone()])
        .await
        .unwrap();
    let with = comp.render_isolated(&[band, body, absent]).await.unwrap();

    let walk_s = without.surface.pixel(0, 10 * 64);
    assert_eq!(without.surface.pixel(0, 3456), walk_s);
    assert_eq!(with.surface.pixel(0, 3456), walk_s);
    assert_eq!(with, without);
}

#[tokio::test]
async fn uploaded_sheet_draws_whole_at_origin() {
    let (fetcher, comp) = compositor();
    fetcher.insert("uploaded/1", png_bytes(64, 64, RED));
    let list = DrawList::new(vec![
        Layer::uploaded("uploaded/1", 20),
        layer("body/light.png", 10, &["walk"], None),
    ]);
    let outcome = comp.composite(&list).await.unwrap();
    assert_eq!(
        outcome,
        CompositeOutcome::Completed(RenderStats {
            layers: 2,
            drawn: 2,
            missing: 0
        })
    );
    let sheet = comp.snapshot().await;
    assert_eq!(sheet.surface.pixel(0, 0), RED);
    assert_eq!(sheet.surface.pixel(0, 8 * 64), BLUE);
    assert_eq!(fetcher.fetch_count("uploaded/1"), 1);
}
