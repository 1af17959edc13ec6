use std::collections::BTreeMap;

use crate::animation::standard::STANDARD_ANIMATIONS;
use crate::foundation::core::{BodyType, UNIVERSAL_FRAME_SIZE};

/// Exported and failed entries of one export section.
///
/// `T` is `Vec<String>` for flat lists of animations, or a map of animation → item file names
/// for per-item exports.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportManifest<T> {
    pub exported: T,
    pub failed: T,
}

pub type FlatManifest = ExportManifest<Vec<String>>;
pub type GroupedManifest = ExportManifest<BTreeMap<String, Vec<String>>>;

impl FlatManifest {
    pub fn record(&mut self, id: impl Into<String>, ok: bool) {
        if ok {
            self.exported.push(id.into());
        } else {
            self.failed.push(id.into());
        }
    }
}

impl GroupedManifest {
    /// Make sure `group` is listed under `exported`, even if nothing ends up in it.
    pub fn touch(&mut self, group: &str) {
        self.exported.entry(group.to_string()).or_default();
    }

    pub fn record(&mut self, group: &str, id: impl Into<String>, ok: bool) {
        let side = if ok { &mut self.exported } else { &mut self.failed };
        side.entry(group.to_string()).or_default().push(id.into());
    }

    pub fn failed_count(&self) -> usize {
        self.failed.values().map(Vec::len).sum()
    }
}

/// Content of `credits/metadata.json`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata<T> {
    pub export_timestamp: String,
    pub body_type: BodyType,
    pub standard_animations: ExportManifest<T>,
    pub custom_animations: ExportManifest<T>,
    pub frame_size: u32,
    pub frame_counts: BTreeMap<String, u32>,
}

impl<T> ExportMetadata<T> {
    pub fn new(
        export_timestamp: impl Into<String>,
        body_type: BodyType,
        standard_animations: ExportManifest<T>,
        custom_animations: ExportManifest<T>,
    ) -> Self {
        Self {
            export_timestamp: export_timestamp.into(),
            body_type,
            standard_animations,
            custom_animations,
            frame_size: UNIVERSAL_FRAME_SIZE,
            frame_counts: frame_counts(),
        }
    }
}

/// Frame count of every standard animation.
pub fn frame_counts() -> BTreeMap<String, u32> {
    STANDARD_ANIMATIONS
        .iter()
        .map(|a| (a.name.to_string(), a.frame_count))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/export/manifest.rs"]
mod tests;
