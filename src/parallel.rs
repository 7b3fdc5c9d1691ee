//! Bounded worker pool for batch runs.
//!
//! Enabled by the `rayon` feature and selected through
//! [`BatchOptions::with_workers`](crate::BatchOptions::with_workers). Each
//! item runs the same fetch → convert → write job as the sequential path;
//! items share nothing but the source and the progress tracker.

use std::sync::Mutex;

use ::rayon::ThreadPoolBuilder;
use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::asset::AssetReference;
use crate::batch::{BatchReport, ItemOutcome, finish, process_item, run_sequential};
use crate::configuration::BatchOptions;
use crate::error::ThumbnailError;
use crate::progress::ProgressTracker;
use crate::source::AssetSource;

/// Run the batch on a dedicated pool of `options.workers` threads.
///
/// Outcomes come back in input order. Falls back to the sequential path if
/// the pool cannot be built.
pub(crate) fn run_parallel<S>(
    source: &S,
    assets: &[AssetReference],
    options: &BatchOptions,
) -> Result<BatchReport, ThumbnailError>
where
    S: AssetSource + ?Sized,
{
    let pool = match ThreadPoolBuilder::new().num_threads(options.workers).build() {
        Ok(pool) => pool,
        Err(error) => {
            log::warn!("Could not start worker pool ({error}); running sequentially");
            return run_sequential(source, assets, options);
        }
    };
    log::debug!("Running batch on {} workers", options.workers);

    let tracker = Mutex::new(ProgressTracker::new(
        options.progress_callback(),
        assets.len() as u64,
    ));

    let outcomes: Vec<ItemOutcome> = pool.install(|| {
        assets
            .par_iter()
            .map(|asset| {
                if let Ok(guard) = tracker.lock() {
                    guard.start(asset);
                }
                let outcome = process_item(source, asset, options);
                if let Ok(mut guard) = tracker.lock() {
                    guard.advance(&outcome);
                }
                outcome
            })
            .collect()
    });

    let elapsed = tracker
        .into_inner()
        .map(|tracker| tracker.elapsed())
        .unwrap_or_default();
    Ok(finish(outcomes, &options.output_dir, elapsed))
}
