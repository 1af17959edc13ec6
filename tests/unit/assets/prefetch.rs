use std::cell::RefCell;
use std::io::Cursor;
use std::sync::Arc;

use crate::assets::fetch::MemoryFetcher;

use super::*;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([9, 9, 9, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn prefetch_loads_every_path_once_and_reports_progress() {
    let fetcher = Arc::new(MemoryFetcher::new());
    let paths: Vec<String> = (0..20).map(|i| format!("sheet_{i}.png")).collect();
    for p in &paths[..17] {
        fetcher.insert(p.clone(), png_bytes());
    }
    let cache = ImageCache::new(fetcher.clone());

    let seen = RefCell::new(Vec::new());
    let report = prefetch_all(&cache, paths.clone(), 8, &|done, total| {
        seen.borrow_mut().push((done, total));
    })
    .await;

    assert_eq!(
        report,
        PrefetchReport {
            total: 20,
            loaded: 17,
            missing: 3
        }
    );
    let seen = seen.into_inner();
    assert_eq!(seen.len(), 20);
    assert_eq!(seen.last(), Some(&(20, 20)));
    assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
    for p in &paths {
        assert_eq!(fetcher.fetch_count(p), 1);
    }
    assert!(cache.all_settled(paths.iter().map(String::as_str)));
}

#[tokio::test]
async fn zero_concurrency_still_makes_progress() {
    let fetcher = Arc::new(MemoryFetcher::new());
    fetcher.insert("a.png", png_bytes());
    let cache = ImageCache::new(fetcher);
    let report = prefetch_all(&cache, vec!["a.png".to_string()], 0, &|_, _| {}).await;
    assert_eq!(report.loaded, 1);
}

#[tokio::test]
async fn empty_input_is_a_noop() {
    let cache = ImageCache::new(Arc::new(MemoryFetcher::new()));
    let report = prefetch_all(&cache, Vec::new(), 8, &|_, _| panic!("no progress expected")).await;
    assert_eq!(report, PrefetchReport::default());
}
