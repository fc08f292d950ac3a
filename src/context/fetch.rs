//! Downloading packages at a requested version.
//!
//! Each repository is cloned once per requested version into its own
//! temporary GOPATH. A fetch operation is converted into a copy from that
//! GOPATH, and the imports of the fetched package that the project cannot
//! satisfy are queued as further fetches.

use super::package::Package;
use super::{Context, OpKind, OpState, Operation};
use crate::constants::{FETCH_LOOP_LIMIT, RESERVED_STD_PATHS};
use crate::core::VendorError;
use crate::utils::fs::{ensure_dir, has_go_files, has_path_prefix, import_to_path};
use crate::vcs::VcsChain;
use crate::vcs::remote::RepoRoot;
use crate::version::{VersionRequest, find_label};
use anyhow::{Context as _, Result};
use chrono::SecondsFormat;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Clones made during one session, removed when the session ends.
#[derive(Debug, Default)]
pub(crate) struct FetchCache {
    temp: Option<TempDir>,
    /// (repository root, version) to the GOPATH holding the checkout.
    checkouts: BTreeMap<(String, String), PathBuf>,
}

impl FetchCache {
    /// GOPATH containing `repo` checked out at `revision` (exact) or
    /// `version` (matched against labels). Clones on first use.
    fn checkout(
        &mut self,
        vcs_chain: &VcsChain,
        repo: &RepoRoot,
        version: Option<&VersionRequest>,
        revision: &str,
    ) -> Result<PathBuf> {
        let target = if revision.is_empty() {
            version.map(VersionRequest::as_spec).unwrap_or_default()
        } else {
            revision.to_string()
        };
        let key = (repo.root.clone(), target);
        if let Some(gopath) = self.checkouts.get(&key) {
            return Ok(gopath.clone());
        }

        let base = match &self.temp {
            Some(temp) => temp.path().to_path_buf(),
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("gvend-fetch-")
                    .tempdir()
                    .context("Failed to create fetch directory")?;
                let path = temp.path().to_path_buf();
                self.temp = Some(temp);
                path
            }
        };
        let gopath = base.join(self.checkouts.len().to_string());
        let repo_dir = import_to_path(&gopath.join("src"), &repo.root);
        if let Some(parent) = repo_dir.parent() {
            ensure_dir(parent)?;
        }

        let vcs = vcs_chain.by_name(&repo.vcs).ok_or_else(|| VendorError::UnknownVcs {
            path: repo.root.clone(),
        })?;
        tracing::info!("Cloning {} from {}", repo.root, repo.url);
        vcs.create(&repo.url, &repo_dir)?;

        let checkout = if revision.is_empty() {
            match version {
                None | Some(VersionRequest::Latest) => None,
                Some(request) => {
                    let labels = vcs.labels(&repo_dir)?;
                    let raw = match request {
                        VersionRequest::Prefix(text) | VersionRequest::Exact(text) => text.clone(),
                        VersionRequest::Latest => String::new(),
                    };
                    Some(find_label(&request.as_spec(), &labels).map_or(raw, |l| l.text.clone()))
                }
            }
        } else {
            Some(revision.to_string())
        };
        if let Some(rev) = checkout {
            tracing::debug!("Checking out {rev} in {}", repo_dir.display());
            vcs.checkout(&repo_dir, &rev)?;
        }

        self.checkouts.insert(key, gopath.clone());
        Ok(gopath)
    }
}

impl Context {
    /// Convert every ready fetch operation into a copy, queueing fetches for
    /// imports the project lacks.
    pub(crate) fn expand_fetch(&mut self) -> Result<()> {
        let mut rounds = 0;
        while let Some(index) = self
            .operations
            .iter()
            .position(|op| op.kind == OpKind::Fetch && op.state == OpState::Ready)
        {
            rounds += 1;
            if rounds > FETCH_LOOP_LIMIT {
                return Err(VendorError::FetchLoopLimit {
                    limit: FETCH_LOOP_LIMIT,
                }
                .into());
            }
            self.fetch_one(index)?;
        }
        Ok(())
    }

    fn fetch_one(&mut self, index: usize) -> Result<()> {
        let op = self.operations[index].clone();
        let repo = self.remote.resolve(&op.source)?;
        let gopath = self
            .fetch_cache
            .checkout(&self.vcs, &repo, op.version.as_ref(), &op.revision)?;
        let src_root = gopath.join("src");
        let src = import_to_path(&src_root, &op.source);
        if !src.is_dir() {
            return Err(VendorError::NotFoundInSearchPath { path: op.source }.into());
        }

        let mut pkg = Package::new(&op.source, &src, &src_root);
        if has_go_files(&src) {
            pkg.scan_files()?;
        }
        let mut imports = pkg.active_imports(&self.ignore_tags);
        if op.tree {
            imports.extend(self.subtree_imports(&src)?);
        }

        let info = self.vcs.find_info(&src)?;
        let slot = &mut self.operations[index];
        slot.kind = OpKind::Copy;
        slot.src = src;
        slot.ignore_files = pkg.ignored_files(&self.ignore_tags);
        if let Some(info) = info {
            slot.revision = info.revision;
            slot.revision_time = info
                .revision_time
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default();
        }
        tracing::debug!("Fetched {} at {}", op.source, self.operations[index].revision);

        for import in imports {
            if self.needs_fetch(&import, &op.canonical, &op.source) {
                let mut dep = Operation::new(OpKind::Fetch, &import, &import);
                dep.pkg = import.clone();
                dep.dest = import_to_path(&self.vendor_dir(), &import);
                tracing::debug!("Queueing dependency fetch {import}");
                self.operations.push(dep);
            }
        }
        Ok(())
    }

    fn subtree_imports(&self, dir: &Path) -> Result<BTreeSet<String>> {
        let mut imports = BTreeSet::new();
        let walker = WalkDir::new(dir).min_depth(1).into_iter().filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(name.starts_with('.') || name.starts_with('_') || name == "testdata")
        });
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_dir() && has_go_files(entry.path()) {
                let mut sub = Package::new("", entry.path(), dir);
                sub.scan_files()?;
                imports.extend(sub.active_imports(&self.ignore_tags));
            }
        }
        Ok(imports)
    }

    /// True if `import` must be fetched because nothing else provides it.
    fn needs_fetch(&self, import: &str, canonical: &str, source: &str) -> bool {
        if import == canonical || import == source {
            return false;
        }
        if RESERVED_STD_PATHS.iter().any(|r| has_path_prefix(import, r))
            || has_path_prefix(import, &self.root_import)
            || self.is_excluded(import)
            || has_go_files(&import_to_path(&self.vendor_dir(), import))
            || has_go_files(&import_to_path(&self.env.goroot_src(), import))
        {
            return false;
        }
        !self
            .operations
            .iter()
            .any(|op| op.state != OpState::Ignore && op.canonical == import)
    }
}
