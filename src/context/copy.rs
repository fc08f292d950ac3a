//! Copying package directories into the vendor folder and hashing them.

use super::package::Package;
use crate::tags::TEST_TAG;
use crate::utils::fs::{ensure_dir, has_go_files, remove_dir_all};
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Copy the package at `src` to `dest`.
///
/// Plain files already in `dest` are removed first; in tree mode its
/// subdirectories are removed too. Files starting with `.` and files named in
/// `ignore_files` are not copied. In tree mode subdirectories are copied
/// recursively, skipping `.` and `_` prefixed ones, and `testdata` or
/// `*_test` directories when tests are ignored. Each subdirectory computes
/// its own ignore list from `ignore_tags`.
///
/// Every file is written to a temporary file in `dest` and renamed into
/// place, keeping the source permissions and modification time.
pub fn copy_tree(dest: &Path, src: &Path, ignore_files: &[String], ignore_tags: &[String], tree: bool) -> Result<()> {
    ensure_dir(dest)?;
    clear_dest(dest, tree)?;

    let mut entries: Vec<fs::DirEntry> = fs::read_dir(src)
        .with_context(|| format!("Failed to read directory: {}", src.display()))?
        .collect::<io::Result<_>>()
        .with_context(|| format!("Failed to list directory: {}", src.display()))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let skip_tests = ignore_tags.iter().any(|t| t == TEST_TAG);
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if !tree || name.starts_with('_') || (skip_tests && (name == "testdata" || name.ends_with("_test"))) {
                continue;
            }
            let sub_src = entry.path();
            let sub_ignore = subdir_ignore_files(&sub_src, ignore_tags)?;
            copy_tree(&dest.join(&name), &sub_src, &sub_ignore, ignore_tags, true)?;
        } else if file_type.is_file() {
            if ignore_files.iter().any(|f| f == &name) {
                tracing::trace!("Not copying ignored file {name}");
                continue;
            }
            copy_file(&entry.path(), &dest.join(&name))?;
        }
    }
    Ok(())
}

fn clear_dest(dest: &Path, tree: bool) -> Result<()> {
    for entry in fs::read_dir(dest).with_context(|| format!("Failed to read directory: {}", dest.display()))? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if tree {
                remove_dir_all(&entry.path())?;
            }
        } else {
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
        }
    }
    Ok(())
}

fn subdir_ignore_files(dir: &Path, ignore_tags: &[String]) -> Result<Vec<String>> {
    if !has_go_files(dir) {
        return Ok(Vec::new());
    }
    let mut pkg = Package::new("", dir, dir);
    pkg.scan_files()?;
    Ok(pkg.ignored_files(ignore_tags))
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    let parent = dest.parent().unwrap_or(Path::new("."));
    let metadata = fs::metadata(src).with_context(|| format!("Failed to stat {}", src.display()))?;

    let mut input = fs::File::open(src).with_context(|| format!("Failed to open {}", src.display()))?;
    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
    io::copy(&mut input, temp.as_file_mut())
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;

    temp.as_file().set_permissions(metadata.permissions())?;
    if let Ok(modified) = metadata.modified() {
        temp.as_file().set_modified(modified)?;
    }
    temp.persist(dest)
        .with_context(|| format!("Failed to rename temp file to: {}", dest.display()))?;
    Ok(())
}

/// Content hash of a vendored package.
///
/// SHA-256 over the files in name order: for each directory holding files,
/// its path relative to `dir` (empty for `dir` itself) and a NUL byte, then
/// for each file its name, a NUL byte, its length as a little-endian `u64`
/// and its contents. Subdirectories are included in tree mode. The digest is
/// base64 encoded with the URL-safe alphabet and no padding.
pub fn hash_tree(dir: &Path, tree: bool) -> Result<String> {
    let mut hasher = Sha256::new();
    hash_dir(&mut hasher, dir, "", tree)?;
    Ok(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

fn hash_dir(hasher: &mut Sha256, dir: &Path, rel: &str, tree: bool) -> Result<()> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect::<io::Result<_>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut dir_written = false;
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if tree {
                let sub = if rel.is_empty() { name } else { format!("{rel}/{name}") };
                hash_dir(hasher, &entry.path(), &sub, tree)?;
            }
            continue;
        }
        if !dir_written {
            hasher.update(rel.as_bytes());
            hasher.update([0u8]);
            dir_written = true;
        }
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        let mut file = fs::File::open(entry.path())
            .with_context(|| format!("Failed to open {}", entry.path().display()))?;
        let len = file.metadata()?.len();
        hasher.update(len.to_le_bytes());
        io::copy(&mut file, hasher)?;
    }
    Ok(())
}
