//! Executing planned operations.

use super::copy::{copy_tree, hash_tree};
use super::license::copy_licenses;
use super::{Context, OpKind, OpState, Operation};
use crate::constants::UNCOMMITTED_CHECKSUM;
use crate::core::VendorError;
use crate::utils::fs::{has_go_files, path_to_import, remove_dir_all, remove_empty_parents};
use anyhow::{Context as _, Result};
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

impl Context {
    /// Run every ready operation, save the manifest and bring the package
    /// graph up to date.
    ///
    /// Nothing is executed while an unresolved conflict remains. Fetch
    /// operations are downloaded and turned into copies first.
    pub fn alter(&mut self) -> Result<()> {
        self.ensure_no_conflicts()?;
        self.expand_fetch()?;
        self.ensure_no_conflicts()?;

        let mut changed: Vec<(String, Option<(PathBuf, bool)>)> = Vec::new();
        for index in 0..self.operations.len() {
            if self.operations[index].state != OpState::Ready {
                continue;
            }
            let op = self.operations[index].clone();
            match op.kind {
                OpKind::Copy => {
                    self.apply_copy(&op)?;
                    changed.push((op.pkg.clone(), Some((op.dest.clone(), op.tree))));
                }
                OpKind::Remove => {
                    self.apply_remove(&op)?;
                    changed.push((op.pkg.clone(), None));
                }
                OpKind::Fetch => {
                    tracing::warn!("Skipping unexpanded fetch: {op}");
                    continue;
                }
            }
            self.operations[index].state = OpState::Done;
        }

        self.write_manifest()?;

        if self.loaded {
            self.refresh(&changed)?;
        } else {
            self.load_packages()?;
        }

        if !self.rewrite_rules.is_empty() || !self.stripped.is_empty() {
            let rewritten = self.rewrite_imports()?;
            if rewritten > 0 {
                tracing::info!("Rewrote imports in {rewritten} files");
                self.rehash_copies()?;
                self.load_packages()?;
            }
        }
        Ok(())
    }

    /// Recompute the checksum of packages copied this session, whose files
    /// may have changed when their import comments were stripped.
    fn rehash_copies(&mut self) -> Result<()> {
        let copies: Vec<Operation> = self
            .operations
            .iter()
            .filter(|op| op.kind == OpKind::Copy && op.state == OpState::Done && !op.uncommitted)
            .cloned()
            .collect();
        if copies.is_empty() {
            return Ok(());
        }
        for op in copies {
            if let Some(record) = self.manifest.find_mut(&op.canonical) {
                if op.dest.is_dir() {
                    record.checksum = hash_tree(&op.dest, op.tree)?;
                }
            }
        }
        self.write_manifest()
    }

    fn ensure_no_conflicts(&self) -> Result<()> {
        let conflicts = self.check();
        if conflicts.is_empty() {
            return Ok(());
        }
        let details = conflicts
            .iter()
            .map(|c| {
                let sources = c
                    .ops
                    .iter()
                    .map(|&i| {
                        let op = &self.operations[i];
                        if op.pkg.is_empty() { op.source.clone() } else { op.pkg.clone() }
                    })
                    .collect();
                (c.canonical.clone(), sources)
            })
            .collect();
        Err(VendorError::UnresolvedConflict { conflicts: details }.into())
    }

    fn apply_copy(&mut self, op: &Operation) -> Result<()> {
        tracing::info!("{op}");
        copy_tree(&op.dest, &op.src, &op.ignore_files, &self.ignore_tags, op.tree)?;

        let checksum = if op.uncommitted {
            UNCOMMITTED_CHECKSUM.to_string()
        } else {
            hash_tree(&op.dest, op.tree)?
        };

        let mut src_root = op.src.clone();
        for _ in op.source.split('/').filter(|e| !e.is_empty()) {
            src_root.pop();
        }
        copy_licenses(&op.src, &src_root, &self.vendor_dir(), &op.canonical)?;

        let local = self.vendor_local(&op.canonical);
        let record = self.manifest.upsert(&op.canonical);
        record.local = local.clone();
        record.origin = if op.source == op.canonical { String::new() } else { op.source.clone() };
        record.tree = op.tree;
        record.revision = op.revision.clone();
        record.revision_time = op.revision_time.clone();
        record.checksum = checksum;

        if op.tree {
            for entry in WalkDir::new(&op.dest).min_depth(1).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_dir() || !has_go_files(entry.path()) {
                    continue;
                }
                if let Some(rel) = path_to_import(&op.dest, entry.path()) {
                    self.stripped.push(format!("{local}/{rel}"));
                }
            }
        }
        self.stripped.push(local);
        Ok(())
    }

    fn apply_remove(&mut self, op: &Operation) -> Result<()> {
        tracing::info!("{op}");
        self.manifest.mark_removed(&op.canonical);

        if op.tree {
            remove_dir_all(&op.src)?;
        } else if op.src.is_dir() {
            for entry in fs::read_dir(&op.src).with_context(|| format!("Failed to read {}", op.src.display()))? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::remove_file(entry.path())
                        .with_context(|| format!("Failed to remove {}", entry.path().display()))?;
                }
            }
        }
        remove_empty_parents(&op.src, &self.vendor_dir())
    }
}
