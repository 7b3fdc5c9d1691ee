//! Asset manifests.
//!
//! A manifest is a JSON file listing the assets to convert, in order:
//!
//! ```json
//! {
//!   "base_url": "https://example.com/storage/v1/object/public/exercise-gifs",
//!   "assets": [
//!     { "id": "1", "locator": "/abdominals/alternate-heel-touches.gif" },
//!     { "id": "364", "locator": "/pectorals/push-up.gif" }
//!   ]
//! }
//! ```
//!
//! A bare JSON array of assets is accepted too.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::asset::AssetReference;
use crate::error::ThumbnailError;

/// An ordered list of assets, optionally with the bucket they live in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Base URL remote locators are joined to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Assets in processing order.
    pub assets: Vec<AssetReference>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    Full(Manifest),
    List(Vec<AssetReference>),
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::Manifest`] if the file cannot be read or
    /// is not a valid manifest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ThumbnailError> {
        let path = path.as_ref();
        log::debug!("Loading manifest {}", path.display());
        let text = fs::read_to_string(path).map_err(|error| ThumbnailError::Manifest {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
        Self::parse(&text).map_err(|reason| ThumbnailError::Manifest {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse manifest JSON.
    ///
    /// Identifiers must be unique and usable in a file name, and locators
    /// non-empty.
    pub fn parse(text: &str) -> Result<Self, String> {
        let manifest = match serde_json::from_str::<ManifestFile>(text)
            .map_err(|error| error.to_string())?
        {
            ManifestFile::Full(manifest) => manifest,
            ManifestFile::List(assets) => Manifest {
                base_url: None,
                assets,
            },
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for asset in &self.assets {
            if asset.locator.trim().is_empty() {
                return Err(format!("asset {:?} has an empty locator", asset.id));
            }
            asset.check_id().map_err(|error| error.to_string())?;
            if !seen.insert(asset.id.as_str()) {
                return Err(format!("duplicate asset id {:?}", asset.id));
            }
        }
        Ok(())
    }
}
