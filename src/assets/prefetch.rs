use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::assets::cache::ImageCache;

/// Outcome of a bounded prefetch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub total: usize,
    pub loaded: usize,
    pub missing: usize,
}

/// Warm `cache` with every path in `paths` using at most `concurrency` loads in flight.
///
/// Workers pull from one shared pending list until it is empty, so a slow path never stalls the
/// others. `on_progress(completed, total)` fires after every path, whatever its outcome.
#[tracing::instrument(skip_all, fields(total = paths.len(), concurrency = concurrency))]
pub async fn prefetch_all(
    cache: &ImageCache,
    paths: Vec<String>,
    concurrency: usize,
    on_progress: &dyn Fn(usize, usize),
) -> PrefetchReport {
    let total = paths.len();
    let pending = Mutex::new(paths);
    let completed = AtomicUsize::new(0);
    let loaded = AtomicUsize::new(0);

    let workers = (0..concurrency.max(1))
        .map(|_| run_worker(cache, &pending, &completed, &loaded, total, on_progress));
    futures_util::future::join_all(workers).await;

    let loaded = loaded.load(Ordering::Relaxed);
    let report = PrefetchReport {
        total,
        loaded,
        missing: total - loaded,
    };
    tracing::debug!(?report, "prefetch finished");
    report
}

async fn run_worker(
    cache: &ImageCache,
    pending: &Mutex<Vec<String>>,
    completed: &AtomicUsize,
    loaded: &AtomicUsize,
    total: usize,
    on_progress: &dyn Fn(usize, usize),
) {
    loop {
        let next = pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let Some(path) = next else {
            break;
        };
        if cache.load(&path).await.is_some() {
            loaded.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::warn!(path = %path, "prefetch could not load sheet");
        }
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        on_progress(done, total);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/prefetch.rs"]
mod tests;
