//! Export modes: full sheet, per-animation, per-item, per-item-animation and per-category
//! archives.
//!
//! Every entry is isolated: a failed crop, encode or write is recorded and the export moves on.
//! An export fails as a whole only when nothing could be written.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::animation::layout::SheetLayout;
use crate::animation::standard::{STANDARD_ANIMATIONS, animation_sheet_path};
use crate::assets::prefetch::prefetch_all;
use crate::export::archive::ArchiveSink;
use crate::export::character::CharacterDoc;
use crate::export::credits::{credits_to_csv, credits_to_txt};
use crate::export::manifest::{ExportMetadata, FlatManifest, GroupedManifest};
use crate::foundation::core::{PixelRect, Size, UNIVERSAL_SHEET_HEIGHT, UNIVERSAL_SHEET_WIDTH};
use crate::foundation::error::{CharsheetError, CharsheetResult};
use crate::render::compositor::{SheetCompositor, copy_custom_frames};
use crate::render::surface::{PixelSource, Surface};
use crate::selection::catalog::Catalog;
use crate::selection::draw_list::{Layer, ResolvedSelection, build_draw_list};
use crate::selection::state::Selection;

/// What to export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportMode {
    /// The whole composite as one sheet.
    Full,
    /// One image per standard animation and per custom band.
    Animations,
    /// One full sheet per drawn layer.
    Items,
    /// One image per layer and animation.
    ItemAnimations,
    /// Every variant of every item in the given selection groups.
    Categories { groups: Vec<String> },
}

impl ExportMode {
    pub fn label(&self) -> &'static str {
        match self {
            ExportMode::Full => "full",
            ExportMode::Animations => "animations",
            ExportMode::Items => "items",
            ExportMode::ItemAnimations => "item-animations",
            ExportMode::Categories { .. } => "categories",
        }
    }

    /// Archive file name for this mode, e.g. `lpc_male_animations_<ts>.zip`.
    pub fn archive_name(&self, body_type: &str, timestamp: &str) -> String {
        match self {
            ExportMode::Full => format!("lpc_{body_type}_spritesheet_{timestamp}.zip"),
            ExportMode::Animations => format!("lpc_{body_type}_animations_{timestamp}.zip"),
            ExportMode::Items => format!("lpc_{body_type}_item_spritesheets_{timestamp}.zip"),
            ExportMode::ItemAnimations => {
                format!("lpc_{body_type}_item_animations_{timestamp}.zip")
            }
            ExportMode::Categories { .. } => format!("categories_export_{timestamp}.zip"),
        }
    }
}

/// Timestamp used in archive names and metadata: ISO-8601 with `:` and `.` replaced.
pub fn export_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFailure {
    /// Which part of the export failed, e.g. `standard animations`.
    pub section: &'static str,
    pub entry: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub archive_name: String,
    pub exported: Vec<String>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    fn new(archive_name: String) -> Self {
        Self {
            archive_name,
            exported: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, section: &'static str, entry: impl Into<String>, err: impl fmt::Display) {
        let failure = ExportFailure {
            section,
            entry: entry.into(),
            reason: err.to_string(),
        };
        tracing::warn!(
            section = failure.section,
            entry = %failure.entry,
            reason = %failure.reason,
            "export entry failed"
        );
        self.failures.push(failure);
    }

    /// User-facing description of partial failures, grouped by section.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let mut sections: Vec<&'static str> = Vec::new();
        for f in &self.failures {
            if !sections.contains(&f.section) {
                sections.push(f.section);
            }
        }
        let lines: Vec<String> = sections
            .into_iter()
            .map(|section| {
                let entries: Vec<&str> = self
                    .failures
                    .iter()
                    .filter(|f| f.section == section)
                    .map(|f| f.entry.as_str())
                    .collect();
                format!("Failed to export {section}: {}", entries.join(", "))
            })
            .collect();
        Some(format!(
            "Export completed with some issues:\n{}",
            lines.join("\n")
        ))
    }
}

/// Inputs shared by all export modes.
pub struct ExportContext<'a> {
    pub compositor: &'a SheetCompositor,
    pub catalog: &'a Catalog,
    pub selection: &'a Selection,
    pub resolved: &'a ResolvedSelection,
    pub character: &'a CharacterDoc,
    pub timestamp: String,
    pub prefetch_concurrency: usize,
}

impl fmt::Debug for ExportContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportContext")
            .field("body_type", &self.selection.body_type)
            .field("layers", &self.resolved.draw_list.len())
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Run one export into `sink` and finish it.
///
/// Returns [`CharsheetError::Export`] when no entry could be exported; the sink is then left
/// unfinished and should be discarded.
#[tracing::instrument(skip_all, fields(mode = mode.label()))]
pub async fn run_export(
    ctx: &ExportContext<'_>,
    mode: &ExportMode,
    sink: &mut dyn ArchiveSink,
) -> CharsheetResult<ExportReport> {
    let body = ctx.selection.body_type.as_str();
    let mut report = ExportReport::new(mode.archive_name(body, &ctx.timestamp));

    write_common_files(ctx, sink)?;
    match mode {
        ExportMode::Full => export_full(ctx, sink, &mut report).await,
        ExportMode::Animations => export_animations(ctx, sink, &mut report).await?,
        ExportMode::Items => export_item_sheets(ctx, sink, &mut report).await?,
        ExportMode::ItemAnimations => export_item_animations(ctx, sink, &mut report).await?,
        ExportMode::Categories { groups } => {
            export_categories(ctx, groups, sink, &mut report).await
        }
    }

    if report.exported.is_empty() {
        let detail = report
            .failure_summary()
            .unwrap_or_else(|| "nothing to export".to_string());
        return Err(CharsheetError::export(format!(
            "{} export produced no files. {detail}",
            mode.label()
        )));
    }
    sink.finish()?;
    tracing::info!(
        archive = %report.archive_name,
        exported = report.exported.len(),
        failed = report.failures.len(),
        "export finished"
    );
    Ok(report)
}

/// `character.json` and the credits files every archive carries.
fn write_common_files(ctx: &ExportContext<'_>, sink: &mut dyn ArchiveSink) -> CharsheetResult<()> {
    sink.add_file("character.json", ctx.character.to_json_pretty()?.as_bytes())?;
    sink.add_file(
        "credits/credits.txt",
        credits_to_txt(&ctx.resolved.credits).as_bytes(),
    )?;
    sink.add_file(
        "credits/credits.csv",
        credits_to_csv(&ctx.resolved.credits).as_bytes(),
    )?;
    Ok(())
}

fn write_png(
    sink: &mut dyn ArchiveSink,
    report: &mut ExportReport,
    section: &'static str,
    path: String,
    surface: &Surface,
) -> bool {
    match surface.encode_png().and_then(|png| sink.add_file(&path, &png)) {
        Ok(()) => {
            report.exported.push(path);
            true
        }
        Err(err) => {
            report.fail(section, path, err);
            false
        }
    }
}

async fn export_full(ctx: &ExportContext<'_>, sink: &mut dyn ArchiveSink, report: &mut ExportReport) {
    let sheet = ctx.compositor.snapshot().await;
    write_png(sink, report, "spritesheet", "spritesheet.png".to_string(), &sheet.surface);
}

async fn export_animations(
    ctx: &ExportContext<'_>,
    sink: &mut dyn ArchiveSink,
    report: &mut ExportReport,
) -> CharsheetResult<()> {
    let sheet = ctx.compositor.snapshot().await;
    let mut standard = FlatManifest::default();
    let mut custom = FlatManifest::default();

    for animation in &STANDARD_ANIMATIONS {
        let crop = sheet.surface.crop(animation.region());
        let ok = write_png(
            sink,
            report,
            "standard animations",
            format!("standard/{}.png", animation.name),
            &crop,
        );
        standard.record(animation.name, ok);
    }
    for band in &sheet.layout.bands {
        let crop = sheet.surface.crop(band.region());
        let ok = write_png(
            sink,
            report,
            "custom animations",
            format!("custom/{}.png", band.name),
            &crop,
        );
        custom.record(&band.name, ok);
    }

    let meta = ExportMetadata::new(&ctx.timestamp, ctx.selection.body_type, standard, custom);
    sink.add_file(
        "credits/metadata.json",
        serde_json::to_string_pretty(&meta)?.as_bytes(),
    )?;
    Ok(())
}

/// Band layout of the current draw list, independent of what the shared sheet last drew.
fn draw_list_layout(ctx: &ExportContext<'_>) -> CharsheetResult<SheetLayout> {
    SheetLayout::new(
        ctx.compositor.registry(),
        &ctx.resolved.draw_list.custom_animation_ids(),
    )
}

async fn export_item_sheets(
    ctx: &ExportContext<'_>,
    sink: &mut dyn ArchiveSink,
    report: &mut ExportReport,
) -> CharsheetResult<()> {
    let layout = draw_list_layout(ctx)?;
    for layer in ctx.resolved.draw_list.iter() {
        let path = format!("items/{}", layer.export_file_name());
        let surface = ctx
            .compositor
            .render_with_layout(std::slice::from_ref(layer), &layout)
            .await;
        write_png(sink, report, "item spritesheets", path, &surface);
        tokio::task::yield_now().await;
    }
    Ok(())
}

async fn export_item_animations(
    ctx: &ExportContext<'_>,
    sink: &mut dyn ArchiveSink,
    report: &mut ExportReport,
) -> CharsheetResult<()> {
    let cache = ctx.compositor.cache();
    let registry = ctx.compositor.registry();
    let layout = draw_list_layout(ctx)?;
    let mut standard = GroupedManifest::default();
    let mut custom = GroupedManifest::default();

    for animation in &STANDARD_ANIMATIONS {
        standard.touch(animation.name);
        for layer in ctx.resolved.draw_list.iter() {
            if layer.custom_animation.is_some() || !layer.supports(animation) {
                continue;
            }
            let file = layer.export_file_name();
            let image = match animation_sheet_path(&layer.file_path, animation) {
                Ok(path) => cache.load(&path).await,
                Err(err) => {
                    report.fail("standard animations", format!("{}/{file}", animation.name), err);
                    standard.record(animation.name, &file, false);
                    continue;
                }
            };
            let Some(image) = image else {
                continue;
            };
            let mut frames = Surface::new(image.size());
            frames.draw_image(&*image, 0, 0);
            if !frames.has_content() {
                continue;
            }
            let ok = write_png(
                sink,
                report,
                "standard animations",
                format!("standard/{}/{file}", animation.name),
                &frames,
            );
            standard.record(animation.name, &file, ok);

            for band in &layout.bands {
                let Some(def) = registry.custom(&band.name) else {
                    continue;
                };
                if !def.is_based_on(animation.name) {
                    continue;
                }
                custom.touch(&band.name);
                // the item's frames laid into the standard block, then copied into a lone band
                let mut scratch = Surface::new(Size::new(
                    UNIVERSAL_SHEET_WIDTH.max(band.size.width),
                    UNIVERSAL_SHEET_HEIGHT + band.size.height,
                ));
                scratch.draw_image(&frames, 0, animation.row_offset_px());
                copy_custom_frames(&mut scratch, def, UNIVERSAL_SHEET_HEIGHT, registry.rows_layout());
                let cropped = scratch.crop(PixelRect::new(
                    0,
                    UNIVERSAL_SHEET_HEIGHT,
                    band.size.width,
                    band.size.height,
                ));
                if !cropped.has_content() {
                    continue;
                }
                let ok = write_png(
                    sink,
                    report,
                    "custom animations",
                    format!("custom/{}/{file}", band.name),
                    &cropped,
                );
                custom.record(&band.name, &file, ok);
            }
        }
        tokio::task::yield_now().await;
    }

    for layer in ctx.resolved.draw_list.iter() {
        let Some(name) = &layer.custom_animation else {
            continue;
        };
        let Some(band) = layout.band(name) else {
            continue;
        };
        custom.touch(name);
        let Some(image) = cache.load(&layer.file_path).await else {
            continue;
        };
        let mut surface = Surface::new(band.size);
        surface.draw_image(&*image, 0, 0);
        if !surface.has_content() {
            continue;
        }
        let file = layer.export_file_name();
        let ok = write_png(
            sink,
            report,
            "custom animations",
            format!("custom/{name}/{file}"),
            &surface,
        );
        custom.record(name, &file, ok);
    }

    let meta = ExportMetadata::new(&ctx.timestamp, ctx.selection.body_type, standard, custom);
    sink.add_file(
        "credits/metadata.json",
        serde_json::to_string_pretty(&meta)?.as_bytes(),
    )?;
    Ok(())
}

/// One variant of one item, resolved for the current body type.
struct CategoryEntry {
    category: String,
    item: String,
    variant: String,
    layers: Vec<Layer>,
}

fn category_entries(ctx: &ExportContext<'_>, groups: &[String]) -> Vec<CategoryEntry> {
    let mut entries = Vec::new();
    for group in groups {
        for item in ctx.catalog.items_in_group(group) {
            for variant in &item.variants {
                let mut selection = ctx.selection.clone();
                selection.select(&item.group, &item.name, variant);
                let layers: Vec<Layer> = build_draw_list(ctx.catalog, &selection)
                    .draw_list
                    .into_layers()
                    .into_iter()
                    .filter(|l| l.parent_name == item.group && l.custom_animation.is_none())
                    .collect();
                if layers.is_empty() {
                    continue;
                }
                entries.push(CategoryEntry {
                    category: item.category_name().to_string(),
                    item: item.name.clone(),
                    variant: variant.clone(),
                    layers,
                });
            }
        }
    }
    entries
}

async fn export_categories(
    ctx: &ExportContext<'_>,
    groups: &[String],
    sink: &mut dyn ArchiveSink,
    report: &mut ExportReport,
) {
    let entries = category_entries(ctx, groups);

    let mut urls: Vec<String> = entries
        .iter()
        .flat_map(|e| e.layers.iter())
        .flat_map(|layer| {
            STANDARD_ANIMATIONS
                .iter()
                .filter(|a| layer.supports(a))
                .filter_map(|a| animation_sheet_path(&layer.file_path, a).ok())
                .collect::<Vec<_>>()
        })
        .collect();
    urls.sort();
    urls.dedup();
    let prefetched = prefetch_all(
        ctx.compositor.cache(),
        urls,
        ctx.prefetch_concurrency,
        &|done, total| tracing::debug!(done, total, "prefetch progress"),
    )
    .await;
    tracing::info!(
        loaded = prefetched.loaded,
        missing = prefetched.missing,
        "category images prefetched"
    );

    let layout = SheetLayout::standard_only();
    for entry in &entries {
        let surface = ctx.compositor.render_with_layout(&entry.layers, &layout).await;
        let path = format!("{}/{}/{}.png", entry.category, entry.item, entry.variant);
        write_png(sink, report, "spritesheets", path, &surface);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
