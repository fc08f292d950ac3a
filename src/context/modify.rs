//! Turning package specifiers into operations.

use super::package::{Package, canonical_path};
use super::status::{Location, Presence, StatusFilter};
use super::{Context, OpKind, OpState, Operation};
use crate::core::VendorError;
use crate::pkgspec::PkgSpec;
use crate::utils::fs::{has_go_files, has_path_prefix, import_to_path, normalize_path, path_to_import};
use anyhow::Result;
use chrono::SecondsFormat;
use std::collections::BTreeSet;
use walkdir::WalkDir;

/// The change a command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyKind {
    /// Copy a package that is not vendored yet.
    Add,
    /// Copy again over a vendored package.
    Update,
    /// Add or update, whichever applies.
    AddUpdate,
    Remove,
    /// Download at a version, then copy.
    Fetch,
}

/// Flags shared by the modifying commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifyOptions {
    /// Vendor the whole subtree below each package.
    pub tree: bool,
    /// Allow copying from a working tree with uncommitted changes.
    pub uncommitted: bool,
}

impl Context {
    /// Plan operations for one specifier.
    ///
    /// `path/...` specifiers expand to every matching package. Nothing on
    /// disk changes until [`Context::alter`] runs.
    pub fn modify(&mut self, spec: &PkgSpec, kind: ModifyKind, opts: ModifyOptions) -> Result<()> {
        self.ensure_loaded()?;
        if !spec.match_tree {
            return self.modify_one(spec, kind, opts);
        }

        let expanded = self.expand_match_tree(&spec.path, kind);
        if expanded.is_empty() {
            return Err(VendorError::NotFoundInSearchPath {
                path: format!("{}/...", spec.path),
            }
            .into());
        }
        for path in expanded {
            let sub = PkgSpec {
                path,
                version: spec.version.clone(),
                ..PkgSpec::default()
            };
            self.modify_one(&sub, kind, opts)?;
        }
        Ok(())
    }

    /// Plan operations for every package whose status matches `filter`.
    pub fn modify_status(&mut self, filter: &StatusFilter, kind: ModifyKind, opts: ModifyOptions) -> Result<()> {
        self.ensure_loaded()?;
        let targets: Vec<PkgSpec> = self
            .packages
            .values()
            .filter(|p| filter.matches(&p.status))
            .filter(|p| !p.in_tree && p.status.presence != Presence::Excluded)
            .filter(|p| {
                !matches!(p.status.location, Location::Standard | Location::NotFound | Location::Local)
            })
            .map(|p| PkgSpec {
                path: p.canonical.clone(),
                origin: if p.status.location == Location::External && p.local != p.canonical {
                    p.local.clone()
                } else {
                    String::new()
                },
                ..PkgSpec::default()
            })
            .collect();

        tracing::debug!("Status selection matched {} packages", targets.len());
        for spec in targets {
            self.modify_one(&spec, kind, opts)?;
        }
        Ok(())
    }

    fn expand_match_tree(&self, base: &str, kind: ModifyKind) -> Vec<String> {
        let base_canonical = canonical_path(base);
        let mut found: BTreeSet<String> = self
            .packages
            .values()
            .filter(|p| has_path_prefix(&p.canonical, base_canonical))
            .filter(|p| !matches!(p.status.location, Location::Standard | Location::NotFound | Location::Local))
            .filter(|p| kind != ModifyKind::Remove || p.status.location == Location::Vendor)
            .map(|p| p.canonical.clone())
            .collect();

        if kind != ModifyKind::Remove {
            if let Some((dir, src)) = self.find_in_gopath(base_canonical) {
                let walker = WalkDir::new(&dir).sort_by_file_name().into_iter().filter_entry(|e| {
                    let name = e.file_name().to_string_lossy();
                    e.depth() == 0
                        || !(name.starts_with('.') || name.starts_with('_') || name == "testdata" || name == "vendor")
                });
                for entry in walker.filter_map(std::result::Result::ok) {
                    if entry.file_type().is_dir() && has_go_files(entry.path()) {
                        if let Some(import) = path_to_import(&src, entry.path()) {
                            found.insert(import);
                        }
                    }
                }
            }
        }
        found.into_iter().collect()
    }

    fn modify_one(&mut self, spec: &PkgSpec, kind: ModifyKind, opts: ModifyOptions) -> Result<()> {
        let kind = match kind {
            ModifyKind::Add | ModifyKind::Update | ModifyKind::AddUpdate if spec.has_version() => ModifyKind::Fetch,
            other => other,
        };
        let canonical = canonical_path(&spec.path).to_string();
        let vendor_key = self.vendor_local(&canonical);
        let record = self.manifest.find(&canonical).cloned();

        let source = if !spec.origin.is_empty() {
            spec.origin.clone()
        } else if let Some(record) = record.as_ref().filter(|_| kind != ModifyKind::Add) {
            record.source_path().to_string()
        } else {
            canonical.clone()
        };
        let pkg_key = [vendor_key.as_str(), spec.path.as_str(), spec.origin.as_str(), canonical.as_str()]
            .into_iter()
            .find(|k| self.packages.contains_key(*k))
            .unwrap_or(canonical.as_str())
            .to_string();
        let tree = opts.tree || spec.include_tree || record.as_ref().is_some_and(|r| r.tree);
        tracing::debug!("Planning {kind:?} for {canonical} from {source} (graph key {pkg_key})");

        match kind {
            ModifyKind::Remove => self.plan_remove(&canonical, &vendor_key, tree),
            ModifyKind::Fetch => {
                self.check_nesting(&canonical, tree)?;
                let mut op = Operation::new(OpKind::Fetch, &canonical, &source);
                op.pkg = pkg_key;
                op.dest = import_to_path(&self.vendor_dir(), &canonical);
                op.tree = tree;
                op.version = spec.version.clone();
                self.push_operation(op);
                Ok(())
            }
            ModifyKind::Add | ModifyKind::Update | ModifyKind::AddUpdate => {
                self.plan_copy(&canonical, &source, pkg_key, kind, tree, opts.uncommitted)
            }
        }
    }

    fn check_nesting(&self, canonical: &str, tree: bool) -> Result<()> {
        if tree {
            let children = self.manifest.children(canonical);
            if !children.is_empty() {
                return Err(VendorError::TreeChildren {
                    path: canonical.to_string(),
                    children,
                }
                .into());
            }
        }
        let parents = self.manifest.tree_parents(canonical);
        if !parents.is_empty() {
            return Err(VendorError::TreeParents {
                path: canonical.to_string(),
                parents,
            }
            .into());
        }
        Ok(())
    }

    fn plan_copy(
        &mut self,
        canonical: &str,
        source: &str,
        pkg_key: String,
        kind: ModifyKind,
        tree: bool,
        uncommitted: bool,
    ) -> Result<()> {
        let (src_dir, src_root) = self.find_in_gopath(source).ok_or_else(|| VendorError::NotFoundInSearchPath {
            path: source.to_string(),
        })?;
        self.check_nesting(canonical, tree)?;

        let dest = import_to_path(&self.vendor_dir(), canonical);
        match kind {
            ModifyKind::Add if has_go_files(&dest) => {
                return Err(VendorError::PackageAlreadyExists {
                    path: canonical.to_string(),
                }
                .into());
            }
            ModifyKind::Update if self.manifest.find(canonical).is_none() => {
                return Err(VendorError::PackageNotVendored {
                    path: canonical.to_string(),
                }
                .into());
            }
            _ => {}
        }

        let info = self.vcs.find_info(&src_dir)?;
        let dirty = info.as_ref().is_some_and(|i| i.dirty);
        if dirty && !uncommitted {
            return Err(VendorError::DirtyWorkingTree {
                path: source.to_string(),
            }
            .into());
        }

        let ignore_files = match self.packages.get(source) {
            Some(pkg) if pkg.dir == src_dir => pkg.ignored_files(&self.ignore_tags),
            _ => {
                let mut pkg = Package::new(source, &src_dir, &src_root);
                pkg.scan_files()?;
                pkg.ignored_files(&self.ignore_tags)
            }
        };

        let mut op = Operation::new(OpKind::Copy, canonical, source);
        op.pkg = pkg_key;
        op.src = src_dir;
        op.dest = dest;
        op.ignore_files = ignore_files;
        op.tree = tree;
        op.uncommitted = dirty;
        if let Some(info) = info {
            op.revision = info.revision;
            op.revision_time = info
                .revision_time
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default();
        }
        self.push_operation(op);
        Ok(())
    }

    fn plan_remove(&mut self, canonical: &str, vendor_key: &str, tree: bool) -> Result<()> {
        if self.manifest.find(canonical).is_none() && !self.packages.contains_key(vendor_key) {
            return Err(VendorError::PackageNotVendored {
                path: canonical.to_string(),
            }
            .into());
        }
        let vendor_dir = self.vendor_dir();
        let dir = normalize_path(&import_to_path(&vendor_dir, canonical));
        if !dir.starts_with(&vendor_dir) || dir == vendor_dir {
            return Err(VendorError::RemoveOutsideVendor {
                path: dir.display().to_string(),
            }
            .into());
        }

        let mut op = Operation::new(OpKind::Remove, canonical, canonical);
        op.pkg = vendor_key.to_string();
        op.src = dir;
        op.tree = tree;
        self.push_operation(op);
        Ok(())
    }

    fn push_operation(&mut self, op: Operation) {
        let duplicate = self
            .operations
            .iter()
            .any(|o| {
                o.state != OpState::Done && o.kind == op.kind && o.canonical == op.canonical && o.source == op.source
            });
        if duplicate {
            tracing::debug!("Skipping duplicate operation: {op}");
            return;
        }
        tracing::debug!("Planned: {op}");
        self.operations.push(op);
    }
}
