use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Runtime configuration for compositing, preview and export.
///
/// Loaded from JSON (every field optional), then overridden by `CHARSHEET_*` environment variables
/// and finally by CLI flags.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Directory that relative sheet paths resolve against.
    pub asset_root: PathBuf,
    /// Public base URL recorded in `character.json`.
    pub base_url: String,
    /// Worker count for category-export prefetching.
    pub prefetch_concurrency: usize,
    /// Preview animation rate.
    pub preview_fps: u32,
    /// Deflate level for zip archives (0-9).
    pub compression_level: i64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("spritesheets"),
            base_url: String::new(),
            prefetch_concurrency: 8,
            preview_fps: 8,
            compression_level: 9,
        }
    }
}

impl CompositorConfig {
    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> CharsheetResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `CHARSHEET_ASSET_ROOT`, `CHARSHEET_BASE_URL` and `CHARSHEET_PREFETCH_CONCURRENCY`.
    pub fn with_env_overrides(self) -> CharsheetResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> CharsheetResult<Self> {
        if let Some(root) = lookup("CHARSHEET_ASSET_ROOT") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(url) = lookup("CHARSHEET_BASE_URL") {
            self.base_url = url;
        }
        if let Some(n) = lookup("CHARSHEET_PREFETCH_CONCURRENCY") {
            self.prefetch_concurrency = n.trim().parse().map_err(|_| {
                CharsheetError::config(format!(
                    "CHARSHEET_PREFETCH_CONCURRENCY must be a positive integer, got '{n}'"
                ))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> CharsheetResult<()> {
        if self.prefetch_concurrency == 0 {
            return Err(CharsheetError::config("prefetch_concurrency must be > 0"));
        }
        if self.preview_fps == 0 {
            return Err(CharsheetError::config("preview_fps must be > 0"));
        }
        if !(0..=9).contains(&self.compression_level) {
            return Err(CharsheetError::config("compression_level must be in 0..=9"));
        }
        Ok(())
    }

    /// Interval between preview frames (125ms at the default 8 fps).
    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.preview_fps.max(1)))
    }

    /// URL prefix for spritesheets, as recorded in exported `character.json`.
    pub fn spritesheets_url(&self) -> String {
        if self.base_url.is_empty() {
            return "spritesheets/".to_string();
        }
        format!("{}/spritesheets/", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
