//! Asset references and output naming.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ThumbnailError;

const FORBIDDEN_ID_CHARS: &[char] = &['/', '\\', '\0'];

/// One convertible item: an identifier plus a source locator.
///
/// The locator is interpreted by the [`AssetSource`](crate::AssetSource)
/// that fetches it: a URL suffix for [`RemoteSource`](crate::RemoteSource),
/// a filesystem path for [`LocalSource`](crate::LocalSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Identifier used to prefix the output file name.
    #[serde(alias = "identifier")]
    pub id: String,
    /// Where the GIF lives.
    #[serde(alias = "path", alias = "url")]
    pub locator: String,
}

impl AssetReference {
    /// Create a new reference.
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
        }
    }

    /// Check that the identifier stays a plain file-name fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::InvalidIdentifier`] if the id contains a
    /// path separator or NUL, or is `.` or `..`.
    pub fn check_id(&self) -> Result<(), ThumbnailError> {
        if self.id.contains(FORBIDDEN_ID_CHARS) || self.id == "." || self.id == ".." {
            return Err(ThumbnailError::InvalidIdentifier(self.id.clone()));
        }
        Ok(())
    }

    /// The locator's last path component without its extension.
    ///
    /// ```
    /// use stillframe::AssetReference;
    ///
    /// let asset = AssetReference::new("1", "/abdominals/alternate-heel-touches.gif");
    /// assert_eq!(asset.base_name(), "alternate-heel-touches");
    /// ```
    pub fn base_name(&self) -> String {
        let trimmed = self.locator.trim_end_matches('/');
        Path::new(trimmed)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| trimmed.to_string())
    }
}

/// How output file names are derived from an [`AssetReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputNaming {
    /// `<id>-<base_name>.jpg`
    #[default]
    Prefixed,
    /// `<base_name>.jpg`
    Plain,
}

impl OutputNaming {
    /// File name (no directory) for the thumbnail of `asset`.
    pub fn file_name(self, asset: &AssetReference) -> String {
        match self {
            OutputNaming::Prefixed => format!("{}-{}.jpg", asset.id, asset.base_name()),
            OutputNaming::Plain => format!("{}.jpg", asset.base_name()),
        }
    }

    /// Full output path for the thumbnail of `asset` inside `output_dir`.
    ///
    /// The path is only descriptive until [`AssetReference::check_id`]
    /// has passed; [`run_batch`](crate::run_batch) checks before writing.
    pub fn output_path(self, output_dir: &Path, asset: &AssetReference) -> PathBuf {
        output_dir.join(self.file_name(asset))
    }
}
