//! # stillframe
//!
//! Turn animated GIF exercise demonstrations into static JPEG thumbnails.
//!
//! `stillframe` decodes a GIF, picks one frame (the first, the middle, or a
//! fixed index), flattens it to RGB and encodes it as JPEG. A batch driver
//! runs that conversion over a list of assets pulled from an object-storage
//! bucket or a local directory, isolating failures per item.
//!
//! ## Quick Start
//!
//! ### Convert one GIF
//!
//! ```no_run
//! use stillframe::{ConvertOptions, FramePolicy};
//!
//! let gif = std::fs::read("push-up.gif").unwrap();
//! let options = ConvertOptions::new().with_policy(FramePolicy::Middle).with_quality(95);
//! let jpeg = stillframe::convert(&gif, &options).unwrap();
//! std::fs::write("push-up.jpg", jpeg).unwrap();
//! ```
//!
//! ### Convert a bucket manifest
//!
//! ```no_run
//! use stillframe::{BatchOptions, ConvertOptions, Manifest, RemoteSource};
//!
//! let manifest = Manifest::load("assets.json").unwrap();
//! let source = RemoteSource::new(manifest.base_url.clone().unwrap()).unwrap();
//! let options = BatchOptions::new("static-thumbnails").with_convert(ConvertOptions::remote());
//! let report = stillframe::run_batch(&source, &manifest.assets, &options).unwrap();
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! ```
//!
//! ## Features
//!
//! - **Frame policies**: first frame, middle frame (`floor(n / 2)`), or a
//!   fixed index with fallback to the first frame
//! - **RGB normalization**: palette and transparent frames are flattened
//!   over a background color before encoding
//! - **Atomic output**: thumbnails are written through a temporary file,
//!   so failures never leave partial JPEGs behind
//! - **Failure isolation**: each asset succeeds or fails on its own, tagged
//!   with a [`FailureKind`]
//! - **Remote and local sources**: HTTP with a 30 second timeout, or plain
//!   files discovered from a directory
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | Run batches on a bounded worker pool |
//! | `full` | Enables all of the above |

pub mod asset;
pub mod batch;
pub mod configuration;
pub mod error;
pub mod extract;
pub mod manifest;
#[cfg(feature = "rayon")]
mod parallel;
pub mod policy;
pub mod progress;
pub mod source;

pub use asset::{AssetReference, OutputNaming};
pub use batch::{BatchReport, ItemOutcome, run_batch};
pub use configuration::{BatchOptions, ConvertOptions, LOCAL_QUALITY, REMOTE_QUALITY};
pub use error::{FailureKind, ThumbnailError};
pub use extract::{SelectedFrame, Thumbnail, convert, convert_to_file, encode_jpeg, extract_frame};
pub use manifest::Manifest;
pub use policy::FramePolicy;
pub use progress::{ProgressCallback, ProgressInfo};
pub use source::{AssetSource, DEFAULT_TIMEOUT, LocalSource, RemoteSource, discover_gifs};
