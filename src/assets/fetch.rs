use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use async_trait::async_trait;

use crate::assets::decode::normalize_rel_path;
use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Source of encoded sheet bytes, addressed by asset-root-relative path.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded bytes stored at `path`.
    async fn fetch(&self, path: &str) -> CharsheetResult<Vec<u8>>;
}

/// Reads sheets from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageFetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> CharsheetResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        let full = self.root.join(Path::new(&norm));
        let bytes = tokio::fs::read(&full)
            .await
            .with_context(|| format!("read sheet '{}'", full.display()))?;
        Ok(bytes)
    }
}

/// In-memory sheet store. Counts fetches per path.
///
/// Every fetch yields to the scheduler once before resolving, so concurrent callers observe a
/// genuinely in-flight request.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), bytes);
    }

    /// Number of `fetch` calls made for `path`, successful or not.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

#[async_trait]
impl ImageFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> CharsheetResult<Vec<u8>> {
        *self
            .fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_insert(0) += 1;

        tokio::task::yield_now().await;

        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| CharsheetError::asset(format!("no such sheet '{path}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
