//! Where GIF bytes come from.
//!
//! [`AssetSource`] is the seam between the batch driver and the outside
//! world. [`RemoteSource`] downloads from an object-storage bucket over
//! HTTP; [`LocalSource`] reads files. [`discover_gifs`] turns a directory
//! listing into asset references.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::asset::AssetReference;
use crate::error::ThumbnailError;

/// Default total timeout for one remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces the raw bytes of an asset.
///
/// Implementations must be [`Send`] and [`Sync`] so a batch can share one
/// source between worker threads.
pub trait AssetSource: Send + Sync {
    /// Fetch the bytes behind `asset.locator`.
    fn fetch(&self, asset: &AssetReference) -> Result<Vec<u8>, ThumbnailError>;
}

/// Downloads assets with HTTP GET from `<base_url>/<locator>`.
///
/// No authentication is sent. Non-2xx responses are errors.
///
/// # Example
///
/// ```no_run
/// use stillframe::{AssetReference, AssetSource, RemoteSource, ThumbnailError};
///
/// let source = RemoteSource::new("https://example.com/storage/v1/object/public/exercise-gifs")?;
/// let bytes = source.fetch(&AssetReference::new("365", "/abdominals/plank.gif"))?;
/// # Ok::<(), ThumbnailError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl RemoteSource {
    /// Create a source with the default 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::HttpClient`] if the HTTP client cannot be
    /// initialised.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ThumbnailError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a source with a custom total request timeout.
    ///
    /// # Errors
    ///
    /// Same as [`new`](RemoteSource::new).
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ThumbnailError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ThumbnailError::HttpClient(error.to_string()))?;
        Ok(Self::from_client(base_url, client, timeout))
    }

    /// Use a preconfigured client (proxies, headers, TLS roots).
    ///
    /// `timeout` is only used for error reporting; the client's own timeout
    /// is what applies.
    pub fn from_client(base_url: impl Into<String>, client: Client, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            client,
        }
    }

    /// The base URL locators are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a locator. Absolute URLs are used as given.
    pub fn url_for(&self, locator: &str) -> String {
        if locator.contains("://") {
            return locator.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            locator.trim_start_matches('/')
        )
    }

    fn request_error(&self, locator: &str, error: reqwest::Error) -> ThumbnailError {
        if error.is_timeout() {
            ThumbnailError::Timeout {
                locator: locator.to_string(),
                timeout: self.timeout,
            }
        } else {
            ThumbnailError::Fetch {
                locator: locator.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

impl AssetSource for RemoteSource {
    fn fetch(&self, asset: &AssetReference) -> Result<Vec<u8>, ThumbnailError> {
        let url = self.url_for(&asset.locator);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|error| self.request_error(&asset.locator, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::HttpStatus {
                locator: asset.locator.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|error| self.request_error(&asset.locator, error))?;
        log::debug!("Fetched {} bytes from {url}", body.len());
        Ok(body.to_vec())
    }
}

/// Reads assets from the filesystem.
///
/// Relative locators are resolved against the optional root directory.
#[derive(Debug, Clone, Default)]
pub struct LocalSource {
    root: Option<PathBuf>,
}

impl LocalSource {
    /// Resolve locators relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locators against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// The path a locator resolves to.
    pub fn path_for(&self, locator: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(locator),
            None => PathBuf::from(locator),
        }
    }
}

impl AssetSource for LocalSource {
    fn fetch(&self, asset: &AssetReference) -> Result<Vec<u8>, ThumbnailError> {
        let path = self.path_for(&asset.locator);
        fs::read(&path).map_err(|error| ThumbnailError::Fetch {
            locator: path.display().to_string(),
            reason: error.to_string(),
        })
    }
}

/// List the `*.gif` files directly inside `directory`.
///
/// The identifier of each reference is the file stem and the locator is the
/// file's full path. Entries are returned in directory-listing order, which
/// is platform dependent. Subdirectories are not searched.
///
/// # Errors
///
/// Returns [`ThumbnailError::Fetch`] if the directory cannot be read.
pub fn discover_gifs<P: AsRef<Path>>(directory: P) -> Result<Vec<AssetReference>, ThumbnailError> {
    let directory = directory.as_ref();
    let listing_error = |error: std::io::Error| ThumbnailError::Fetch {
        locator: directory.display().to_string(),
        reason: error.to_string(),
    };

    let mut assets = Vec::new();
    for entry in fs::read_dir(directory).map_err(listing_error)? {
        let path = entry.map_err(listing_error)?.path();
        if !path.is_file() || !is_gif(&path) {
            continue;
        }
        let Some(locator) = path.to_str() else {
            log::warn!("Skipping non UTF-8 path {}", path.display());
            continue;
        };
        let asset = AssetReference {
            id: String::new(),
            locator: locator.to_string(),
        };
        let id = asset.base_name();
        assets.push(AssetReference { id, ..asset });
    }

    log::debug!("Discovered {} GIF(s) in {}", assets.len(), directory.display());
    Ok(assets)
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("gif"))
}
