//! Progress reporting for batch runs.
//!
//! This module provides [`ProgressCallback`] for observing a batch as it
//! runs and [`ProgressInfo`] for the per-item snapshots it receives.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stillframe::{
//!     AssetReference, BatchOptions, LocalSource, ProgressCallback, ProgressInfo,
//!     ThumbnailError,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo<'_>) {
//!         if let Some(pct) = info.percentage {
//!             println!("{} ({pct:.0}%)", info.outcome.asset.base_name());
//!         }
//!     }
//! }
//!
//! let assets = vec![AssetReference::new("plank", "gifs/plank.gif")];
//! let options = BatchOptions::new("thumbs").with_progress(Arc::new(PrintProgress));
//! let report = stillframe::run_batch(&LocalSource::new(), &assets, &options)?;
//! # Ok::<(), ThumbnailError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::asset::AssetReference;
use crate::batch::ItemOutcome;

/// A snapshot taken right after one item finished.
#[derive(Debug, Clone)]
pub struct ProgressInfo<'a> {
    /// The item that just finished.
    pub outcome: &'a ItemOutcome,
    /// How many items have finished so far, this one included.
    pub current: u64,
    /// Total items in the batch.
    pub total: u64,
    /// Share of the batch finished, in percent. `None` for an empty batch.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the batch started.
    pub elapsed: Duration,
    /// Projected time left at the average pace so far.
    pub estimated_remaining: Option<Duration>,
}

/// Trait for receiving per-item updates during a batch.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks are
/// invoked from worker threads when the batch runs on a pool.
///
/// Callbacks observe the batch; they cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called before an item is fetched.
    fn on_start(&self, _asset: &AssetReference) {}

    /// Called after an item succeeded or failed.
    fn on_progress(&self, info: &ProgressInfo<'_>);
}

/// Discards all notifications. The default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo<'_>) {}
}

/// Counts finished items and turns each one into a [`ProgressInfo`].
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    done: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            done: 0,
            started: Instant::now(),
        }
    }

    pub(crate) fn start(&self, asset: &AssetReference) {
        self.callback.on_start(asset);
    }

    /// Record one finished item and fire the callback.
    pub(crate) fn advance(&mut self, outcome: &ItemOutcome) {
        self.done += 1;
        let elapsed = self.started.elapsed();
        let left = self.total.saturating_sub(self.done);

        self.callback.on_progress(&ProgressInfo {
            outcome,
            current: self.done,
            total: self.total,
            percentage: (self.total > 0).then(|| self.done as f32 * 100.0 / self.total as f32),
            elapsed,
            estimated_remaining: Some(elapsed.mul_f64(left as f64 / self.done as f64)),
        });
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
