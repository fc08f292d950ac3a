//! Manifest file discovery.

use crate::constants::{MANIFEST_FILE, VENDOR_FOLDER};
use crate::utils::fs::find_upward;
use std::path::{Path, PathBuf};

/// `root/vendor/vendor.json`.
#[must_use]
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(VENDOR_FOLDER).join(MANIFEST_FILE)
}

/// Find the nearest manifest by walking up from `start`.
///
/// Returns the project root (the directory holding `vendor/`) and the
/// manifest path. The first manifest found wins.
#[must_use]
pub fn find_manifest(start: &Path) -> Option<(PathBuf, PathBuf)> {
    let relative = Path::new(VENDOR_FOLDER).join(MANIFEST_FILE);
    let found = find_upward(start, &relative)?;
    let root = found.parent()?.parent()?.to_path_buf();
    Some((root, found))
}
