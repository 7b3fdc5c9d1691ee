//! The batch driver.
//!
//! [`run_batch`] converts a list of assets one by one. Each item is
//! fetched, converted and written independently: a failure is recorded in
//! that item's [`ItemOutcome`] and the batch moves on.
//!
//! # Example
//!
//! ```no_run
//! use stillframe::{BatchOptions, ConvertOptions, LocalSource, OutputNaming, ThumbnailError};
//!
//! let assets = stillframe::discover_gifs("assets/exercise-gifs/abdominals")?;
//! let options = BatchOptions::new("assets/exercise-thumbnails/abdominals")
//!     .with_convert(ConvertOptions::local())
//!     .with_naming(OutputNaming::Plain);
//! let report = stillframe::run_batch(&LocalSource::new(), &assets, &options)?;
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! # Ok::<(), ThumbnailError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Value, json};

use crate::asset::{AssetReference, OutputNaming};
use crate::configuration::BatchOptions;
use crate::error::{FailureKind, ThumbnailError};
use crate::extract::{Thumbnail, convert_to_file};
use crate::progress::ProgressTracker;
use crate::source::AssetSource;

/// What happened to one asset.
#[derive(Debug)]
pub struct ItemOutcome {
    /// The asset that was processed.
    pub asset: AssetReference,
    /// Where its thumbnail was (or would have been) written.
    pub output_path: PathBuf,
    /// The written thumbnail, or why there is none.
    pub result: Result<Thumbnail, ThumbnailError>,
}

impl ItemOutcome {
    /// `true` if the thumbnail was written.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure category, if the item failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.result.as_ref().err().map(ThumbnailError::kind)
    }

    fn to_json(&self) -> Value {
        match &self.result {
            Ok(thumbnail) => json!({
                "id": self.asset.id,
                "locator": self.asset.locator,
                "output": self.output_path.display().to_string(),
                "status": "ok",
                "bytes": thumbnail.bytes,
                "frame_index": thumbnail.frame_index,
                "frame_count": thumbnail.frame_count,
            }),
            Err(error) => json!({
                "id": self.asset.id,
                "locator": self.asset.locator,
                "output": self.output_path.display().to_string(),
                "status": "error",
                "kind": error.kind().to_string(),
                "error": error.to_string(),
            }),
        }
    }
}

/// The result of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// One outcome per input asset, in input order.
    pub outcomes: Vec<ItemOutcome>,
    /// Directory thumbnails were written to.
    pub output_dir: PathBuf,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of thumbnails written.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of assets that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Number of assets that failed with the given kind.
    pub fn failed_with(&self, kind: FailureKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.failure_kind() == Some(kind))
            .count()
    }

    /// The failed outcomes, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> Value {
        json!({
            "output_dir": self.output_dir.display().to_string(),
            "succeeded": self.succeeded(),
            "failed": self.failed(),
            "elapsed_seconds": self.elapsed.as_secs_f64(),
            "items": self.outcomes.iter().map(ItemOutcome::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Convert every asset in `assets` and write the thumbnails.
///
/// The output directory is created first; that is the only error that
/// aborts the batch. Per-item errors are captured in the report.
///
/// # Errors
///
/// Returns [`ThumbnailError::Io`] if the output directory cannot be
/// created.
pub fn run_batch<S>(
    source: &S,
    assets: &[AssetReference],
    options: &BatchOptions,
) -> Result<BatchReport, ThumbnailError>
where
    S: AssetSource + ?Sized,
{
    fs::create_dir_all(&options.output_dir)?;
    log::info!(
        "Converting {} asset(s) into {} (policy={}, quality={})",
        assets.len(),
        options.output_dir.display(),
        options.convert.policy,
        options.convert.quality
    );

    #[cfg(feature = "rayon")]
    if options.workers > 1 {
        return crate::parallel::run_parallel(source, assets, options);
    }

    #[cfg(not(feature = "rayon"))]
    if options.workers > 1 {
        log::warn!(
            "{} workers requested but built without the `rayon` feature; running sequentially",
            options.workers
        );
    }

    run_sequential(source, assets, options)
}

pub(crate) fn run_sequential<S>(
    source: &S,
    assets: &[AssetReference],
    options: &BatchOptions,
) -> Result<BatchReport, ThumbnailError>
where
    S: AssetSource + ?Sized,
{
    let mut tracker = ProgressTracker::new(options.progress_callback(), assets.len() as u64);
    let mut outcomes = Vec::with_capacity(assets.len());

    for asset in assets {
        tracker.start(asset);
        let outcome = process_item(source, asset, options);
        tracker.advance(&outcome);
        outcomes.push(outcome);
    }

    Ok(finish(outcomes, &options.output_dir, tracker.elapsed()))
}

/// Fetch, convert and write one asset.
pub(crate) fn process_item<S>(
    source: &S,
    asset: &AssetReference,
    options: &BatchOptions,
) -> ItemOutcome
where
    S: AssetSource + ?Sized,
{
    let output_path = options.naming.output_path(&options.output_dir, asset);
    log::debug!("Processing {} -> {}", asset.locator, output_path.display());

    // Plain names never include the id.
    let checked = match options.naming {
        OutputNaming::Prefixed => asset.check_id(),
        OutputNaming::Plain => Ok(()),
    };
    let result = checked
        .and_then(|()| source.fetch(asset))
        .and_then(|bytes| convert_to_file(&bytes, &output_path, &options.convert));

    if let Err(error) = &result {
        log::info!("Error processing {}: {error}", asset.base_name());
    }

    ItemOutcome {
        asset: asset.clone(),
        output_path,
        result,
    }
}

pub(crate) fn finish(outcomes: Vec<ItemOutcome>, output_dir: &Path, elapsed: Duration) -> BatchReport {
    let report = BatchReport {
        outcomes,
        output_dir: output_dir.to_path_buf(),
        elapsed,
    };
    log::info!(
        "Batch finished: {} succeeded, {} failed in {:.2?}",
        report.succeeded(),
        report.failed(),
        report.elapsed
    );
    report
}
