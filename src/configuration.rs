//! Conversion and batch configuration.
//!
//! [`ConvertOptions`] controls how one GIF becomes one JPEG.
//! [`BatchOptions`] adds the output directory, file naming, progress
//! reporting and worker count on top of that, without threading each
//! setting through every function signature.
//!
//! # Example
//!
//! ```
//! use stillframe::{BatchOptions, ConvertOptions, FramePolicy, OutputNaming};
//!
//! let convert = ConvertOptions::new()
//!     .with_policy(FramePolicy::Middle)
//!     .with_quality(95);
//! let batch = BatchOptions::new("assets/exercise-thumbnails")
//!     .with_convert(convert)
//!     .with_naming(OutputNaming::Plain);
//! assert_eq!(batch.convert().quality, 95);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::Rgb;

use crate::asset::OutputNaming;
use crate::error::ThumbnailError;
use crate::policy::FramePolicy;
use crate::progress::{NoOpProgress, ProgressCallback};

/// JPEG quality used for assets pulled from the bucket.
pub const REMOTE_QUALITY: u8 = 90;

/// JPEG quality used for assets read from a local directory.
pub const LOCAL_QUALITY: u8 = 95;

/// Settings for converting a single GIF into a JPEG thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Which frame to keep.
    pub policy: FramePolicy,
    /// JPEG quality, `1..=100`.
    pub quality: u8,
    /// Color transparent pixels are composited over.
    pub background: Rgb<u8>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertOptions {
    /// First frame, quality 90, white background.
    pub fn new() -> Self {
        Self {
            policy: FramePolicy::First,
            quality: REMOTE_QUALITY,
            background: Rgb([255, 255, 255]),
        }
    }

    /// Defaults for the bucket variant: first frame at quality 90.
    pub fn remote() -> Self {
        Self::new()
    }

    /// Defaults for the local-directory variant: middle frame at quality 95.
    pub fn local() -> Self {
        Self::new()
            .with_policy(FramePolicy::Middle)
            .with_quality(LOCAL_QUALITY)
    }

    /// Set the frame selection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FramePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the JPEG quality. Clamped to `1..=100`.
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Set the JPEG quality, rejecting values outside `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::InvalidQuality`] for out-of-range values.
    pub fn try_with_quality(self, quality: u8) -> Result<Self, ThumbnailError> {
        if (1..=100).contains(&quality) {
            Ok(self.with_quality(quality))
        } else {
            Err(ThumbnailError::InvalidQuality(quality))
        }
    }

    /// Set the background color for transparent pixels.
    #[must_use]
    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = Rgb(background);
        self
    }
}

/// Configuration for a batch run.
///
/// Pass a reference to [`run_batch`](crate::run_batch).
#[derive(Clone)]
pub struct BatchOptions {
    pub(crate) output_dir: PathBuf,
    pub(crate) convert: ConvertOptions,
    pub(crate) naming: OutputNaming,
    /// Progress callback, if any.
    pub(crate) progress: Option<Arc<dyn ProgressCallback>>,
    /// Worker threads; 1 means sequential.
    pub(crate) workers: usize,
}

impl Debug for BatchOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BatchOptions")
            .field("output_dir", &self.output_dir)
            .field("convert", &self.convert)
            .field("naming", &self.naming)
            .field("has_progress", &self.progress.is_some())
            .field("workers", &self.workers)
            .finish()
    }
}

impl BatchOptions {
    /// Create a batch configuration writing into `output_dir`.
    ///
    /// Defaults: [`ConvertOptions::new`], prefixed naming, no progress
    /// callback, one worker.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            convert: ConvertOptions::new(),
            naming: OutputNaming::Prefixed,
            progress: None,
            workers: 1,
        }
    }

    /// Set the per-item conversion settings.
    #[must_use]
    pub fn with_convert(mut self, convert: ConvertOptions) -> Self {
        self.convert = convert;
        self
    }

    /// Set how output files are named.
    #[must_use]
    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Set the number of worker threads. Clamped to a minimum of 1.
    ///
    /// Values above 1 only take effect when the `rayon` feature is enabled;
    /// otherwise the batch runs sequentially.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// The attached callback, or one that discards everything.
    pub(crate) fn progress_callback(&self) -> Arc<dyn ProgressCallback> {
        self.progress
            .clone()
            .unwrap_or_else(|| Arc::new(NoOpProgress))
    }

    /// Directory thumbnails are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Per-item conversion settings.
    pub fn convert(&self) -> &ConvertOptions {
        &self.convert
    }

    /// Output naming scheme.
    pub fn naming(&self) -> OutputNaming {
        self.naming
    }

    /// Configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }
}
