//! Loading and saving `vendor.json`.

use crate::core::VendorError;
use crate::manifest::Manifest;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::path::Path;

impl Manifest {
    /// Load a manifest from disk.
    ///
    /// A missing file is reported as [`VendorError::MissingManifest`]; malformed
    /// JSON as [`VendorError::ManifestParseError`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VendorError::MissingManifest {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read manifest: {}", path.display()));
            }
        };

        let manifest: Self =
            serde_json::from_str(&content).map_err(|e| VendorError::ManifestParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Loaded {} records from {}", manifest.package.len(), path.display());
        Ok(manifest)
    }

    /// Load a manifest, or an empty one if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(manifest) => Ok(manifest),
            Err(e) if matches!(e.downcast_ref(), Some(VendorError::MissingManifest { .. })) => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply the session edits and write the manifest atomically.
    ///
    /// Records flagged `remove` are dropped, the `add` flags cleared and the
    /// list sorted by local then canonical path. Field values of untouched
    /// records are written back unchanged.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.normalize();
        let mut content =
            serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        content.push('\n');
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        tracing::debug!("Saved {} records to {}", self.package.len(), path.display());
        Ok(())
    }
}
