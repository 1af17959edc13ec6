//! Composition root: one character-editing session.
//!
//! A session owns the configuration, catalog, image cache, compositor and previewer, and keeps
//! the draw list in step with the selection.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, Utc};

use crate::animation::custom::AnimationRegistry;
use crate::assets::cache::ImageCache;
use crate::assets::decode::SpriteImage;
use crate::assets::fetch::{FsFetcher, ImageFetcher};
use crate::export::archive::ArchiveSink;
use crate::export::character::{CharacterDoc, import_selection};
use crate::export::pipeline::{ExportContext, ExportMode, ExportReport, export_timestamp, run_export};
use crate::foundation::config::CompositorConfig;
use crate::foundation::core::BodyType;
use crate::foundation::error::CharsheetResult;
use crate::preview::animator::Animator;
use crate::render::compositor::{CompositeOutcome, CompositeSheet, SheetCompositor};
use crate::selection::catalog::Catalog;
use crate::selection::draw_list::{
    DrawList, Layer, ResolvedSelection, UPLOADED_LAYER_NAME, build_draw_list,
};
use crate::selection::state::Selection;

pub struct Session {
    config: CompositorConfig,
    catalog: Catalog,
    compositor: SheetCompositor,
    selection: Selection,
    resolved: ResolvedSelection,
    animator: Animator,
    uploaded: Option<UploadedSheet>,
    uploads: u32,
    /// The draw list changed since the last completed composite.
    stale: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct UploadedSheet {
    path: String,
    z_pos: i32,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("body_type", &self.selection.body_type)
            .field("layers", &self.resolved.draw_list.len())
            .field("animator", &self.animator)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        config: CompositorConfig,
        catalog: Catalog,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> CharsheetResult<Self> {
        config.validate()?;
        let cache = Arc::new(ImageCache::new(fetcher));
        let registry = Arc::new(catalog.registry().clone());
        let animator = Animator::new(config.preview_interval());
        Ok(Self {
            compositor: SheetCompositor::new(cache, registry),
            selection: Selection::default(),
            resolved: ResolvedSelection::default(),
            animator,
            uploaded: None,
            uploads: 0,
            stale: false,
            catalog,
            config,
        })
    }

    /// Session reading sheets from `config.asset_root`.
    pub fn from_asset_root(config: CompositorConfig, catalog: Catalog) -> CharsheetResult<Self> {
        let fetcher = Arc::new(FsFetcher::new(config.asset_root.clone()));
        Self::new(config, catalog, fetcher)
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &AnimationRegistry {
        self.catalog.registry()
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        self.compositor.cache()
    }

    pub fn compositor(&self) -> &SheetCompositor {
        &self.compositor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn resolved(&self) -> &ResolvedSelection {
        &self.resolved
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    /// Replace the whole selection and rebuild the draw list.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.rebuild();
    }

    pub fn select(&mut self, group: &str, name: &str, variant: &str) {
        self.selection.select(group, name, variant);
        self.rebuild();
    }

    pub fn clear(&mut self, group: &str) {
        self.selection.clear(group);
        self.rebuild();
    }

    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.selection.body_type = body_type;
        self.rebuild();
    }

    pub fn match_body_color(&mut self, variant: &str) -> usize {
        let changed = self.selection.match_body_color(&self.catalog, variant);
        if changed > 0 {
            self.rebuild();
        }
        changed
    }

    fn rebuild(&mut self) {
        let mut resolved = build_draw_list(&self.catalog, &self.selection);
        if let Some(up) = &self.uploaded {
            let mut layers = resolved.draw_list.into_layers();
            layers.push(Layer::uploaded(up.path.clone(), up.z_pos));
            resolved.draw_list = DrawList::new(layers);
        }
        self.resolved = resolved;
        self.stale = true;
        tracing::debug!(layers = self.resolved.draw_list.len(), "draw list rebuilt");
    }

    /// Draw a user-supplied full sheet at `z_pos` among the catalog layers, replacing any
    /// earlier upload.
    pub fn upload(&mut self, image: SpriteImage, z_pos: i32) {
        // every upload gets its own cache slot; slots are never replaced
        self.uploads += 1;
        let path = format!("{UPLOADED_LAYER_NAME}/{}", self.uploads);
        self.cache().insert(path.clone(), image);
        tracing::debug!(path = %path, z_pos, "sheet uploaded");
        self.uploaded = Some(UploadedSheet { path, z_pos });
        self.rebuild();
    }

    /// Move the uploaded sheet to another z-position; no-op without an upload.
    pub fn set_upload_z_pos(&mut self, z_pos: i32) {
        if let Some(up) = &mut self.uploaded {
            up.z_pos = z_pos;
            self.rebuild();
        }
    }

    pub fn clear_upload(&mut self) {
        if self.uploaded.take().is_some() {
            self.rebuild();
        }
    }

    /// True when the selection changed since the last completed [`redraw`](Self::redraw).
    pub fn needs_redraw(&self) -> bool {
        self.stale
    }

    /// Composite the current draw list; the previewer starts after the first completed pass.
    pub async fn redraw(&mut self) -> CharsheetResult<CompositeOutcome> {
        let outcome = self.compositor.composite(&self.resolved.draw_list).await?;
        if matches!(outcome, CompositeOutcome::Completed(_)) {
            self.stale = false;
            self.animator.start(Instant::now());
        }
        Ok(outcome)
    }

    pub async fn sheet(&self) -> CompositeSheet {
        self.compositor.snapshot().await
    }

    /// Advance the preview; skipped while a composite pass holds the sheet.
    pub fn tick_preview(&mut self, now: Instant) -> bool {
        let animator = &mut self.animator;
        self.compositor
            .try_with_sheet(|sheet| animator.tick(now, sheet))
            .unwrap_or(false)
    }

    pub fn character(&self) -> CharacterDoc {
        CharacterDoc::new(
            self.selection.body_type,
            &self.resolved,
            self.config.base_url.clone(),
            self.config.spritesheets_url(),
            Local::now(),
        )
    }

    /// Replace the selection with the one described by a `character.json` document.
    pub fn import_character(&mut self, json: &str) -> CharsheetResult<()> {
        let doc = CharacterDoc::from_json(json)?;
        self.set_selection(import_selection(&self.catalog, &doc));
        Ok(())
    }

    /// Write one export archive into `sink`, compositing first if the selection changed.
    pub async fn export(
        &mut self,
        mode: &ExportMode,
        sink: &mut dyn ArchiveSink,
    ) -> CharsheetResult<ExportReport> {
        if self.stale {
            self.redraw().await?;
        }
        let character = self.character();
        let ctx = ExportContext {
            compositor: &self.compositor,
            catalog: &self.catalog,
            selection: &self.selection,
            resolved: &self.resolved,
            character: &character,
            timestamp: export_timestamp(Utc::now()),
            prefetch_concurrency: self.config.prefetch_concurrency,
        };
        run_export(&ctx, mode, sink).await
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
