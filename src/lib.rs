//! Charsheet composites layered 2D character sprite sheets.
//!
//! A character is a set of selected catalog items. Each item contributes image layers that are
//! drawn in z-order into one universal sheet (832×3456, 64 px frames, 15 standard animations),
//! with extra bands below it for custom animations that use larger frames.
//!
//! # Pipeline overview
//!
//! 1. **Select**: `Catalog + Selection -> DrawList` (which files, in what order, with credits)
//! 2. **Load**: sheet images are fetched once per path through a shared [`ImageCache`]
//! 3. **Composite**: `DrawList -> CompositeSheet` on a CPU [`Surface`]
//! 4. **Preview**: an [`Animator`] cuts the selected animation out of the sheet on a timer
//! 5. **Export**: flat, per-animation, per-item or per-category zip archives with credits
//!
//! Pixels are premultiplied RGBA8 end-to-end; PNG encoding converts back to straight alpha.
//! `unsafe` is forbidden in this crate.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod export;
mod foundation;
mod preview;
mod render;
mod selection;
mod session;

pub use animation::custom::{AnimationRegistry, AnimationRowsLayout, CustomAnimation, FrameRef};
pub use animation::layout::{CustomBand, SheetLayout, distinct_custom_animations, total_sheet_size};
pub use animation::standard::{
    AnimationDescriptor, DIRECTIONS, STANDARD_ANIMATIONS, animation_sheet_path, split_file_path,
    standard_animation, support_key,
};
pub use assets::cache::{CacheState, CacheStats, ImageCache};
pub use assets::decode::{SpriteImage, decode_image, normalize_rel_path};
pub use assets::fetch::{FsFetcher, ImageFetcher, MemoryFetcher};
pub use assets::prefetch::{PrefetchReport, prefetch_all};
pub use export::archive::{ArchiveSink, MemoryArchive, ZipArchive};
pub use export::character::{CHARACTER_FORMAT_VERSION, CharacterDoc, import_selection};
pub use export::credits::{CSV_HEADER, credits_to_csv, credits_to_txt};
pub use export::manifest::{
    ExportManifest, ExportMetadata, FlatManifest, GroupedManifest, frame_counts,
};
pub use export::pipeline::{
    ExportContext, ExportFailure, ExportMode, ExportReport, export_timestamp, run_export,
};
pub use foundation::config::CompositorConfig;
pub use foundation::core::{
    BodyType, PixelRect, Size, UNIVERSAL_FRAME_SIZE, UNIVERSAL_SHEET_HEIGHT,
    UNIVERSAL_SHEET_WIDTH,
};
pub use foundation::error::{CharsheetError, CharsheetResult};
pub use preview::animator::{Animator, PreviewState, PreviewTarget, default_cycle};
pub use render::blend::{PremulRgba8, over};
pub use render::compositor::{
    CompositeOutcome, CompositeSheet, RenderStats, SheetCompositor, copy_custom_frames,
};
pub use render::surface::{PINK_MASK, PixelSource, Surface};
pub use selection::catalog::{Catalog, CreditDef, ItemDef, LayerDef, ReplaceSpec, element_id};
pub use selection::draw_list::{
    Credit, DrawList, Layer, ResolvedSelection, UPLOADED_LAYER_NAME, build_draw_list,
};
pub use selection::state::{Choice, Selection};
pub use selection::template::resolve_file_template;
pub use session::Session;
