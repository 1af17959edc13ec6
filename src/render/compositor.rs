//! Sheet compositor: draws a z-ordered draw list into the universal sheet plus custom bands.
//!
//! Every image a pass needs is requested from the cache up front (concurrently, deduplicated by
//! the cache), then drawn in z-order. Missing images are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::animation::custom::{AnimationRegistry, AnimationRowsLayout, CustomAnimation};
use crate::animation::layout::SheetLayout;
use crate::animation::standard::{
    AnimationDescriptor, STANDARD_ANIMATIONS, animation_sheet_path,
};
use crate::assets::cache::ImageCache;
use crate::assets::decode::SpriteImage;
use crate::animation::layout::distinct_custom_animations;
use crate::foundation::core::{PixelRect, UNIVERSAL_FRAME_SIZE};
use crate::foundation::error::CharsheetResult;
use crate::render::surface::Surface;
use crate::selection::draw_list::{DrawList, Layer};

/// Composited pixels together with the band layout they were drawn with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeSheet {
    pub surface: Surface,
    pub layout: SheetLayout,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub layers: usize,
    pub drawn: usize,
    pub missing: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeOutcome {
    Completed(RenderStats),
    /// Another pass was already running; the surface was left untouched.
    Skipped,
}

/// Owns the shared composite sheet.
pub struct SheetCompositor {
    cache: Arc<ImageCache>,
    registry: Arc<AnimationRegistry>,
    sheet: tokio::sync::Mutex<CompositeSheet>,
}

impl std::fmt::Debug for SheetCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetCompositor")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SheetCompositor {
    pub fn new(cache: Arc<ImageCache>, registry: Arc<AnimationRegistry>) -> Self {
        Self {
            cache,
            registry,
            sheet: tokio::sync::Mutex::new(CompositeSheet::default()),
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<AnimationRegistry> {
        &self.registry
    }

    /// Redraw the shared sheet from `draw_list`.
    ///
    /// Returns [`CompositeOutcome::Skipped`] when a pass is already in progress.
    #[tracing::instrument(skip_all, fields(layers = draw_list.len()))]
    pub async fn composite(&self, draw_list: &DrawList) -> CharsheetResult<CompositeOutcome> {
        let Ok(mut sheet) = self.sheet.try_lock() else {
            tracing::debug!("composite already in progress, skipped");
            return Ok(CompositeOutcome::Skipped);
        };
        let layout = SheetLayout::new(&self.registry, &draw_list.custom_animation_ids())?;
        sheet.surface.resize(layout.size);
        sheet.layout = layout.clone();
        let stats = draw_layers(
            &self.cache,
            &self.registry,
            draw_list.layers(),
            &layout,
            &mut sheet.surface,
        )
        .await;
        tracing::debug!(
            drawn = stats.drawn,
            missing = stats.missing,
            width = layout.size.width,
            height = layout.size.height,
            "composite complete"
        );
        Ok(CompositeOutcome::Completed(stats))
    }

    /// Render `layers` (already z-ordered) into a private sheet; the shared sheet is not touched.
    pub async fn render_isolated(&self, layers: &[Layer]) -> CharsheetResult<CompositeSheet> {
        let ids = distinct_custom_animations(layers.iter().map(|l| l.custom_animation.as_deref()));
        let layout = SheetLayout::new(&self.registry, &ids)?;
        let surface = self.render_with_layout(layers, &layout).await;
        Ok(CompositeSheet { surface, layout })
    }

    /// Render `layers` into a private surface sized and banded by `layout`.
    pub async fn render_with_layout(&self, layers: &[Layer], layout: &SheetLayout) -> Surface {
        let mut surface = Surface::new(layout.size);
        draw_layers(&self.cache, &self.registry, layers, layout, &mut surface).await;
        surface
    }

    /// Copy of the shared sheet, waiting for any running pass to finish.
    pub async fn snapshot(&self) -> CompositeSheet {
        self.sheet.lock().await.clone()
    }

    /// Run `f` against the shared sheet unless a pass currently holds it.
    pub fn try_with_sheet<R>(&self, f: impl FnOnce(&CompositeSheet) -> R) -> Option<R> {
        self.sheet.try_lock().ok().map(|sheet| f(&sheet))
    }
}

enum Step {
    Custom { path: String, y: u32 },
    Standard { path: String, animation: &'static AnimationDescriptor },
    /// Uploaded sheet drawn once at the origin.
    Whole { path: String },
}

impl Step {
    fn path(&self) -> &str {
        match self {
            Step::Custom { path, .. } | Step::Standard { path, .. } | Step::Whole { path } => path,
        }
    }
}

fn plan_layer(layer: &Layer, layout: &SheetLayout) -> Vec<Step> {
    if layer.uploaded {
        return vec![Step::Whole {
            path: layer.file_path.clone(),
        }];
    }
    if let Some(custom) = &layer.custom_animation {
        return match layout.band(custom) {
            Some(band) => vec![Step::Custom {
                path: layer.file_path.clone(),
                y: band.y,
            }],
            None => {
                tracing::warn!(file = %layer.file_path, custom = %custom, "no band for custom animation");
                Vec::new()
            }
        };
    }

    let mut steps = Vec::new();
    for animation in &STANDARD_ANIMATIONS {
        if !layer.supports(animation) {
            tracing::trace!(file = %layer.file_path, animation = animation.name, "unsupported, skipped");
            continue;
        }
        match animation_sheet_path(&layer.file_path, animation) {
            Ok(path) => steps.push(Step::Standard { path, animation }),
            Err(err) => {
                tracing::warn!(error = %err, "layer skipped");
                return Vec::new();
            }
        }
    }
    steps
}

/// Draw `layers` into `surface`, which must already have `layout.size`.
pub(crate) async fn draw_layers(
    cache: &ImageCache,
    registry: &AnimationRegistry,
    layers: &[Layer],
    layout: &SheetLayout,
    surface: &mut Surface,
) -> RenderStats {
    let plans: Vec<Vec<Step>> = layers.iter().map(|l| plan_layer(l, layout)).collect();

    let mut paths: Vec<&str> = plans.iter().flatten().map(Step::path).collect();
    paths.sort_unstable();
    paths.dedup();
    let images: HashMap<&str, Option<Arc<SpriteImage>>> =
        join_all(paths.into_iter().map(|p| async move { (p, cache.load(p).await) }))
            .await
            .into_iter()
            .collect();

    let mut stats = RenderStats {
        layers: layers.len(),
        ..RenderStats::default()
    };
    for step in plans.iter().flatten() {
        let image = images.get(step.path()).and_then(Option::as_ref);
        match (step, image) {
            (Step::Custom { y, .. }, Some(img)) => {
                surface.draw_image(&**img, 0, *y);
                stats.drawn += 1;
            }
            (Step::Whole { .. }, Some(img)) => {
                surface.draw_image(&**img, 0, 0);
                stats.drawn += 1;
            }
            (Step::Standard { animation, .. }, Some(img)) => {
                surface.draw_image(&**img, 0, animation.row_offset_px());
                stats.drawn += 1;
                // band copies run only after this layer drew something
                for band in &layout.bands {
                    let Some(custom) = registry.custom(&band.name) else {
                        continue;
                    };
                    if custom.is_based_on(animation.name) {
                        copy_custom_frames(surface, custom, band.y, registry.rows_layout());
                    }
                }
            }
            (_, None) => stats.missing += 1,
        }
    }
    stats
}

/// Copy the frames `custom` references from the standard block into its band at `band_y`.
///
/// Source frames are 64 px; larger target frames hold them centered, smaller ones scale down.
pub fn copy_custom_frames(
    surface: &mut Surface,
    custom: &CustomAnimation,
    band_y: u32,
    rows: &AnimationRowsLayout,
) {
    let fs = custom.frame_size;
    for (i, row) in custom.frames.iter().enumerate() {
        for (j, frame) in row.iter().enumerate() {
            let Some(src_row) = rows.row(&frame.row) else {
                continue;
            };
            let src = PixelRect::new(
                frame.column * UNIVERSAL_FRAME_SIZE,
                src_row * UNIVERSAL_FRAME_SIZE,
                UNIVERSAL_FRAME_SIZE,
                UNIVERSAL_FRAME_SIZE,
            );
            let x = j as u32 * fs;
            let y = band_y + i as u32 * fs;
            let dst = if fs >= UNIVERSAL_FRAME_SIZE {
                let offset = (fs - UNIVERSAL_FRAME_SIZE) / 2;
                PixelRect::new(x + offset, y + offset, UNIVERSAL_FRAME_SIZE, UNIVERSAL_FRAME_SIZE)
            } else {
                PixelRect::new(x, y, fs, fs)
            };
            surface.draw_self_region(src, dst);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
