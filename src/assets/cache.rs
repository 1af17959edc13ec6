//! Session-lifetime image cache.
//!
//! Every path resolves at most once: concurrent `load` calls for the same path share one in-flight
//! fetch, and failures are remembered as `None` so later requests resolve immediately. Entries are
//! never evicted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::assets::decode::{SpriteImage, decode_image};
use crate::assets::fetch::ImageFetcher;

type Slot = Arc<OnceCell<Option<Arc<SpriteImage>>>>;

/// Observable state of one cache entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// Never requested.
    Unrequested,
    /// A load is in flight.
    Pending,
    /// Loaded and decoded.
    Loaded(Arc<SpriteImage>),
    /// Fetch or decode failed; the path is treated as missing for the rest of the session.
    Missing,
}

/// Counters describing cache traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total `load` calls.
    pub requests: u64,
    /// Calls into the underlying fetcher.
    pub fetches: u64,
    /// Fetches that failed or produced undecodable bytes.
    pub failures: u64,
}

pub struct ImageCache {
    fetcher: Arc<dyn ImageFetcher>,
    slots: Mutex<HashMap<String, Slot>>,
    requests: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl ImageCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            slots: Mutex::new(HashMap::new()),
            requests: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Resolve `path` to a decoded image, or `None` if it cannot be fetched or decoded.
    ///
    /// Never fails: callers treat `None` as "skip this draw".
    pub async fn load(&self, path: &str) -> Option<Arc<SpriteImage>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let slot = self.slot(path);
        slot.get_or_init(|| self.fetch_and_decode(path))
            .await
            .clone()
    }

    /// Seed an entry without fetching (e.g. a user-uploaded sheet).
    ///
    /// Returns `false` if the path was already requested; existing entries are never replaced.
    pub fn insert(&self, path: impl Into<String>, image: SpriteImage) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.entry(path.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(v) => {
                v.insert(Arc::new(OnceCell::new_with(Some(Some(Arc::new(image))))));
                true
            }
        }
    }

    /// Peek at an entry without triggering a load.
    pub fn state(&self, path: &str) -> CacheState {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(path) {
            None => CacheState::Unrequested,
            Some(slot) => match slot.get() {
                None => CacheState::Pending,
                Some(Some(img)) => CacheState::Loaded(Arc::clone(img)),
                Some(None) => CacheState::Missing,
            },
        }
    }

    /// True when every path has finished loading (successfully or not).
    pub fn all_settled<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> bool {
        paths.into_iter().all(|p| {
            matches!(
                self.state(p),
                CacheState::Loaded(_) | CacheState::Missing
            )
        })
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            requests: self.requests.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, path: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(path.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    async fn fetch_and_decode(&self, path: &str) -> Option<Arc<SpriteImage>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let decoded = match self.fetcher.fetch(path).await {
            Ok(bytes) => decode_image(&bytes),
            Err(err) => Err(err),
        };
        match decoded {
            Ok(img) => {
                tracing::debug!(path, width = img.width, height = img.height, "loaded sheet");
                Some(Arc::new(img))
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(path, error = %err, "sheet unavailable, caching as missing");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
