//! Legal notices of vendored packages.
//!
//! A package vendored from `src/co2/pk1/sub` also needs the `LICENSE` that
//! sits in `src/co2/pk1`. Each directory between the package and its source
//! root is mirrored onto the matching ancestor in the vendor folder.

use crate::constants::LICENSE_PREFIXES;
use crate::utils::fs::import_to_path;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// True for file names that look like a license or notice.
#[must_use]
pub fn is_license_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    LICENSE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

fn license_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| is_license_file(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

/// Copy license files from `src_dir` and its parents (below `src_root`) onto
/// `vendor_dir/canonical` and its parents (below `vendor_dir`).
///
/// Existing files are never overwritten. Returns the files written.
pub fn copy_licenses(src_dir: &Path, src_root: &Path, vendor_dir: &Path, canonical: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let mut src = src_dir.to_path_buf();
    let mut dest = import_to_path(vendor_dir, canonical);

    while src.starts_with(src_root) && src != src_root && dest.starts_with(vendor_dir) && dest != vendor_dir {
        for file in license_files(&src) {
            let Some(name) = file.file_name() else { continue };
            let target = dest.join(name);
            if target.exists() {
                continue;
            }
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create directory: {}", dest.display()))?;
            fs::copy(&file, &target)
                .with_context(|| format!("Failed to copy {} to {}", file.display(), target.display()))?;
            tracing::debug!("Copied license {}", target.display());
            written.push(target);
        }
        if !src.pop() || !dest.pop() {
            break;
        }
    }
    Ok(written)
}

/// License files applying to the vendored package `canonical`, nearest first.
#[must_use]
pub fn find_licenses(vendor_dir: &Path, canonical: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut dir = import_to_path(vendor_dir, canonical);
    while dir.starts_with(vendor_dir) && dir != vendor_dir {
        found.extend(license_files(&dir));
        if !dir.pop() {
            break;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_license_file() {
        assert!(is_license_file("LICENSE"));
        assert!(is_license_file("License.md"));
        assert!(is_license_file("COPYING"));
        assert!(is_license_file("NOTICE.txt"));
        assert!(!is_license_file("README.md"));
        assert!(!is_license_file("main.go"));
    }

    #[test]
    fn test_copy_licenses_mirrors_parents() {
        let temp = tempdir().unwrap();
        let src_root = temp.path().join("gopath/src");
        let pkg = src_root.join("co2/pk1/sub");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(src_root.join("co2/pk1/LICENSE"), "MIT").unwrap();
        fs::write(src_root.join("co2/COPYING"), "GPL").unwrap();
        fs::write(src_root.join("TOP-LICENSE"), "never").unwrap();

        let vendor = temp.path().join("proj/vendor");
        fs::create_dir_all(vendor.join("co2/pk1")).unwrap();
        fs::write(vendor.join("co2/pk1/LICENSE"), "kept").unwrap();

        let written = copy_licenses(&pkg, &src_root, &vendor, "co2/pk1/sub").unwrap();

        assert_eq!(written, vec![vendor.join("co2/COPYING")]);
        assert_eq!(fs::read_to_string(vendor.join("co2/pk1/LICENSE")).unwrap(), "kept");
        assert!(!vendor.join("TOP-LICENSE").exists());

        let found = find_licenses(&vendor, "co2/pk1/sub");
        assert_eq!(found, vec![vendor.join("co2/pk1/LICENSE"), vendor.join("co2/COPYING")]);
    }
}
