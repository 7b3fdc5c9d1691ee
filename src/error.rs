//! Error types for the `stillframe` crate.
//!
//! This module defines [`ThumbnailError`], the unified error type returned by
//! all fallible operations in the crate, and [`FailureKind`], the closed set
//! of categories the batch driver tags failed items with.

use std::{fmt, io::Error as IoError, path::PathBuf, time::Duration};

use image::ImageError;
use jpeg_encoder::EncodingError;
use thiserror::Error;

/// The unified error type for all `stillframe` operations.
///
/// Every public method that can fail returns `Result<T, ThumbnailError>`.
/// Variants carry the locator or path involved so a failure can be reported
/// without extra context at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThumbnailError {
    /// The source bytes could not be obtained (network or local read).
    #[error("Failed to fetch {locator}: {reason}")]
    Fetch {
        /// Locator of the asset that was being fetched.
        locator: String,
        /// Underlying reason the fetch failed.
        reason: String,
    },

    /// The remote request did not complete in time.
    #[error("Timed out after {timeout:?} fetching {locator}")]
    Timeout {
        /// Locator of the asset that was being fetched.
        locator: String,
        /// The configured request timeout.
        timeout: Duration,
    },

    /// The remote server answered with a non-success status.
    #[error("HTTP {status} fetching {locator}")]
    HttpStatus {
        /// Locator of the asset that was being fetched.
        locator: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The source could not be parsed as a GIF container.
    #[error("Failed to decode GIF: {0}")]
    Decode(String),

    /// The GIF container parsed but holds no frames.
    #[error("GIF contains no frames")]
    EmptyAnimation,

    /// The selected frame could not be encoded as JPEG.
    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    /// An I/O error occurred while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The asset manifest could not be read or parsed.
    #[error("Invalid manifest at {path}: {reason}")]
    Manifest {
        /// Path of the manifest file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// JPEG quality outside `1..=100`.
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    /// A frame policy string that is neither `first`, `middle` nor an index.
    #[error("Unknown frame policy: {0} (expected first, middle, or a frame index)")]
    InvalidPolicy(String),

    /// An asset identifier that cannot be used inside a file name.
    #[error("Invalid asset id {0:?}: must not contain path separators or be \"..\"")]
    InvalidIdentifier(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// The category of a [`ThumbnailError`].
///
/// Per-item failures in a batch are `Fetch`, `Decode` or `Encode`, or
/// `Configuration` for an asset whose identifier is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network, HTTP, or source read failure.
    Fetch,
    /// Unparseable or empty image container.
    Decode,
    /// JPEG encoding or output write failure.
    Encode,
    /// Invalid settings or manifest.
    Configuration,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Decode => "decode",
            FailureKind::Encode => "encode",
            FailureKind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

impl ThumbnailError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            ThumbnailError::Fetch { .. }
            | ThumbnailError::Timeout { .. }
            | ThumbnailError::HttpStatus { .. } => FailureKind::Fetch,
            ThumbnailError::Decode(_) | ThumbnailError::EmptyAnimation => FailureKind::Decode,
            ThumbnailError::Encode(_) | ThumbnailError::Io(_) => FailureKind::Encode,
            ThumbnailError::Manifest { .. }
            | ThumbnailError::InvalidQuality(_)
            | ThumbnailError::InvalidPolicy(_)
            | ThumbnailError::InvalidIdentifier(_)
            | ThumbnailError::HttpClient(_) => FailureKind::Configuration,
        }
    }
}

/// Image errors only arise while decoding the in-memory GIF, so anything
/// that is not an explicit encoding failure counts as a decode error.
impl From<ImageError> for ThumbnailError {
    fn from(error: ImageError) -> Self {
        match error {
            ImageError::Encoding(_) => ThumbnailError::Encode(error.to_string()),
            other => ThumbnailError::Decode(other.to_string()),
        }
    }
}

impl From<EncodingError> for ThumbnailError {
    fn from(error: EncodingError) -> Self {
        ThumbnailError::Encode(error.to_string())
    }
}
