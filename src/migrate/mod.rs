//! Converting projects from other vendoring layouts.
//!
//! A migration moves the packages into `vendor/`, writes a manifest for them
//! and registers rewrite rules so the project's imports drop the old prefix.
//! The rewrite itself runs through [`Context::alter`].

mod godep;
mod internal;

use crate::config::GoEnv;
use crate::constants::DEFAULT_IGNORE;
use crate::context::Context;
use crate::context::copy::hash_tree;
use crate::utils::fs::{ensure_dir, has_go_files, path_to_import, remove_dir_all};
use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Layout to migrate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateFrom {
    /// `Godeps/Godeps.json` with packages in `Godeps/_workspace/src`.
    Godep,
    /// Packages kept under `internal/`.
    Internal,
}

/// Migrate the project at `root` and return the opened session.
pub fn migrate(env: GoEnv, root: &Path, from: MigrateFrom) -> Result<Context> {
    let mut ctx = Context::init(env, root, DEFAULT_IGNORE)?;
    match from {
        MigrateFrom::Godep => godep::migrate(&mut ctx)?,
        MigrateFrom::Internal => internal::migrate(&mut ctx)?,
    }
    ctx.alter()?;
    Ok(ctx)
}

/// Move `src` to `dest`, merging into directories that already exist.
fn move_tree(src: &Path, dest: &Path) -> Result<()> {
    if !dest.exists() {
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        return fs::rename(src, dest)
            .with_context(|| format!("Failed to move {} to {}", src.display(), dest.display()));
    }
    if !src.is_dir() || !dest.is_dir() {
        tracing::warn!("Not replacing existing {}", dest.display());
        return Ok(());
    }
    for entry in fs::read_dir(src).with_context(|| format!("Failed to read {}", src.display()))? {
        let entry = entry?;
        move_tree(&entry.path(), &dest.join(entry.file_name()))?;
    }
    remove_dir_all(src)
}

/// Record every package found below the vendor folder, filling in the
/// checksum of records that have none.
fn record_vendored(ctx: &mut Context) -> Result<()> {
    let vendor_dir = ctx.vendor_dir();
    let dirs: Vec<_> = WalkDir::new(&vendor_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_dir() && has_go_files(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    for dir in dirs {
        let Some(path) = path_to_import(&vendor_dir, &dir) else { continue };
        let local = ctx.vendor_local(&path);
        let record = ctx.manifest.upsert(&path);
        record.local = local;
        if record.checksum.is_empty() {
            record.checksum = hash_tree(&dir, false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_tree_merges() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(src.join("co2/pk1")).unwrap();
        fs::create_dir_all(dest.join("co2/other")).unwrap();
        fs::write(src.join("co2/pk1/a.go"), "package pk1\n").unwrap();

        move_tree(&src.join("co2"), &dest.join("co2")).unwrap();

        assert!(dest.join("co2/pk1/a.go").exists());
        assert!(dest.join("co2/other").exists());
        assert!(!src.join("co2").exists());
    }
}
