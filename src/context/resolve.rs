//! Building the package graph.
//!
//! The project tree is walked once; every import of every package found is
//! then resolved through a worklist until no new packages appear. Imports
//! that cannot be located become `NotFound` packages instead of errors.
//! Classification, reference counting and unused detection run on the
//! finished graph.

use super::package::{Package, canonical_path};
use super::status::{Location, PkgType, Presence, Status};
use super::Context;
use crate::constants::{RESERVED_STD_PATHS, VENDOR_FOLDER};
use crate::manifest::{Manifest, find_manifest, vendor_local_path};
use crate::utils::fs::{has_go_files, has_path_prefix, import_to_path, normalize_path, path_to_import};
use anyhow::{Context as _, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where an import resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Found {
    pub dir: PathBuf,
    pub local: String,
    pub src_root: PathBuf,
    pub standard: bool,
}

type Pending = Vec<(String, String)>;

fn skip_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || name == "testdata"
}

impl Context {
    /// Walk the project and resolve the full package graph.
    pub fn load_packages(&mut self) -> Result<()> {
        self.packages.clear();
        let mut pending = Pending::new();

        let root = self.root_dir.clone();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !skip_dir(&e.file_name().to_string_lossy()));
        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_dir() || !has_go_files(entry.path()) {
                continue;
            }
            let local = self.local_for_dir(entry.path());
            pending.extend(self.insert_package(&local, entry.path(), &root)?);
        }
        tracing::debug!("Walked project: {} packages", self.packages.len());

        self.resolve_pending(pending)?;
        self.classify();
        self.add_missing_records();
        self.link_references();
        self.detect_unused()?;
        self.loaded = true;

        tracing::info!("Resolved {} packages", self.packages.len());
        Ok(())
    }

    /// Create, scan and insert the package at `dir`. Returns its imports
    /// still to resolve.
    pub(crate) fn insert_package(&mut self, local: &str, dir: &Path, src_root: &Path) -> Result<Pending> {
        let mut pkg = Package::new(local, dir, src_root);
        pkg.scan_files()?;

        let follow = if self.is_excluded(&pkg.canonical) {
            pkg.status.presence = Presence::Excluded;
            false
        } else {
            true
        };

        let pending = if follow {
            pkg.active_imports(&self.ignore_tags)
                .into_iter()
                .map(|raw| (local.to_string(), raw))
                .collect()
        } else {
            Pending::new()
        };
        self.packages.insert(local.to_string(), pkg);
        Ok(pending)
    }

    /// Drain the worklist. Each round resolves the imports discovered by the
    /// previous one; the number of rounds is bounded by the loop limit.
    pub(crate) fn resolve_pending(&mut self, mut pending: Pending) -> Result<()> {
        let mut round = 0;
        while !pending.is_empty() {
            round += 1;
            self.loop_guard("resolve imports", round)?;

            let mut next = Pending::new();
            for (importer, raw) in std::mem::take(&mut pending) {
                let Some(from_dir) = self.packages.get(&importer).map(|p| p.dir.clone()) else {
                    continue;
                };
                let key = self.resolve_import(&from_dir, &raw, &mut next)?;
                if let Some(pkg) = self.packages.get_mut(&importer) {
                    pkg.resolved.insert(raw, key);
                }
            }
            pending = next;
        }
        Ok(())
    }

    fn resolve_import(&mut self, from_dir: &Path, raw: &str, next: &mut Pending) -> Result<String> {
        let found = if raw.starts_with("./") || raw.starts_with("../") {
            let dir = normalize_path(&from_dir.join(raw));
            has_go_files(&dir).then(|| Found {
                local: self.local_for_dir(&dir),
                src_root: self.src_root_for(&dir).unwrap_or_default(),
                dir,
                standard: false,
            })
        } else {
            self.find_import_dir(from_dir, raw)
        };

        let Some(found) = found else {
            if !self.packages.contains_key(raw) {
                tracing::debug!("Import {raw} not found from {}", from_dir.display());
                self.packages.insert(raw.to_string(), Package::not_found(raw));
            }
            return Ok(raw.to_string());
        };

        if !self.packages.contains_key(&found.local) {
            if found.standard {
                self.packages.insert(
                    found.local.clone(),
                    Package::standard(&found.local, &found.dir, &found.src_root),
                );
            } else {
                next.extend(self.insert_package(&found.local, &found.dir, &found.src_root)?);
            }
        }
        Ok(found.local)
    }

    /// Locate the directory `import` refers to when imported from `from_dir`.
    ///
    /// Search order: reserved standard paths, `vendor` folders from
    /// `from_dir` up to its source root, the project itself, GOROOT, then
    /// each GOPATH entry.
    pub(crate) fn find_import_dir(&self, from_dir: &Path, import: &str) -> Option<Found> {
        if RESERVED_STD_PATHS.iter().any(|r| has_path_prefix(import, r)) {
            return Some(Found {
                dir: PathBuf::new(),
                local: import.to_string(),
                src_root: PathBuf::new(),
                standard: true,
            });
        }

        if let Some(floor) = self.src_root_for(from_dir) {
            for dir in from_dir.ancestors().take_while(|d| d.starts_with(&floor)) {
                let candidate = import_to_path(&dir.join(VENDOR_FOLDER), import);
                if has_go_files(&candidate) {
                    return Some(Found {
                        local: self.local_for_dir(&candidate),
                        dir: candidate,
                        src_root: floor,
                        standard: false,
                    });
                }
            }
        }

        if has_path_prefix(import, &self.root_import) {
            let rel = import[self.root_import.len()..].trim_start_matches('/');
            let dir = import_to_path(&self.root_dir, rel);
            if has_go_files(&dir) {
                return Some(Found {
                    dir,
                    local: import.to_string(),
                    src_root: self.root_dir.clone(),
                    standard: false,
                });
            }
        }

        let goroot_src = self.env.goroot_src();
        let dir = import_to_path(&goroot_src, import);
        if has_go_files(&dir) {
            return Some(Found {
                dir,
                local: import.to_string(),
                src_root: goroot_src,
                standard: true,
            });
        }

        for src in self.env.gopath_srcs() {
            let dir = import_to_path(&src, import);
            if has_go_files(&dir) {
                return Some(Found {
                    dir,
                    local: import.to_string(),
                    src_root: src,
                    standard: false,
                });
            }
        }
        None
    }

    /// Search in GOPATH only, skipping the project's own vendor folder.
    pub(crate) fn find_in_gopath(&self, import: &str) -> Option<(PathBuf, PathBuf)> {
        let vendor = self.vendor_dir();
        self.env.gopath_srcs().into_iter().find_map(|src| {
            let dir = import_to_path(&src, import);
            (has_go_files(&dir) && !dir.starts_with(&vendor)).then_some((dir, src))
        })
    }

    /// The directory vendor lookups from `dir` stop at.
    fn src_root_for(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(src) = self.env.gopath_src_for(dir) {
            return Some(src);
        }
        dir.starts_with(&self.root_dir).then(|| self.root_dir.clone())
    }

    /// Import path of a directory on disk.
    pub(crate) fn local_for_dir(&self, dir: &Path) -> String {
        if let Some(rel) = path_to_import(&self.root_dir, dir) {
            return if rel.is_empty() {
                self.root_import.clone()
            } else {
                format!("{}/{rel}", self.root_import)
            };
        }
        if let Some(src) = self.env.gopath_src_for(dir) {
            if let Some(rel) = path_to_import(&src, dir) {
                return rel;
            }
        }
        if let Some(rel) = path_to_import(&self.env.goroot_src(), dir) {
            return rel;
        }
        dir.to_string_lossy().replace('\\', "/")
    }

    /// Classify every package still `Unknown`.
    fn classify(&mut self) {
        let vendor_import = self.vendor_import();
        let mut manifests: BTreeMap<PathBuf, Option<(String, Manifest)>> = BTreeMap::new();

        let keys: Vec<String> = self
            .packages
            .iter()
            .filter(|(_, p)| p.status.location == Location::Unknown)
            .map(|(k, _)| k.clone())
            .collect();

        for key in keys {
            let Some(pkg) = self.packages.get(&key) else { continue };
            let location = if has_path_prefix(&key, &vendor_import) {
                Location::Vendor
            } else if has_path_prefix(&key, &self.root_import) {
                Location::Local
            } else if self.listed_in_enclosing_manifest(pkg, &mut manifests) {
                Location::Vendor
            } else {
                Location::External
            };

            let record = (location == Location::Vendor)
                .then(|| self.manifest.find_local(&key))
                .flatten()
                .map(|r| (r.origin.clone(), r.tree));
            let in_tree = !self.manifest.tree_parents(&pkg.canonical).is_empty()
                && has_path_prefix(&key, &vendor_import);

            if let Some(pkg) = self.packages.get_mut(&key) {
                pkg.status.location = location;
                if let Some((origin, tree)) = record {
                    pkg.origin = origin;
                    pkg.include_tree = tree;
                }
                pkg.in_tree = in_tree;
            }
        }
    }

    fn listed_in_enclosing_manifest(
        &self,
        pkg: &Package,
        cache: &mut BTreeMap<PathBuf, Option<(String, Manifest)>>,
    ) -> bool {
        let Some((root, path)) = find_manifest(&pkg.dir) else {
            return false;
        };
        if root == self.root_dir {
            return false;
        }
        let entry = cache.entry(path.clone()).or_insert_with(|| match Manifest::load(&path) {
            Ok(manifest) => Some((self.local_for_dir(&root), manifest)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable manifest {}: {e:#}", path.display());
                None
            }
        });
        match entry {
            Some((root_import, manifest)) => manifest
                .find(&pkg.canonical)
                .is_some_and(|r| vendor_local_path(root_import, &r.path) == pkg.local),
            None => false,
        }
    }

    /// Records whose vendored directory has disappeared.
    fn add_missing_records(&mut self) {
        let vendor_dir = self.vendor_dir();
        let missing: Vec<(String, String, String, bool)> = self
            .manifest
            .package
            .iter()
            .filter(|r| !r.remove && !self.packages.contains_key(&r.local))
            .filter(|r| !import_to_path(&vendor_dir, &r.path).exists())
            .map(|r| (r.local.clone(), r.path.clone(), r.origin.clone(), r.tree))
            .collect();

        for (local, path, origin, tree) in missing {
            let pkg = Package {
                dir: import_to_path(&vendor_dir, &path),
                canonical: path,
                local: local.clone(),
                origin,
                include_tree: tree,
                status: Status {
                    location: Location::Vendor,
                    presence: Presence::Missing,
                    kind: PkgType::Normal,
                },
                ..Package::default()
            };
            self.packages.insert(local, pkg);
        }
    }

    /// Rebuild every package's reference set from the resolved imports.
    pub(crate) fn link_references(&mut self) {
        for pkg in self.packages.values_mut() {
            pkg.references.clear();
        }
        let edges: Vec<(String, String)> = self
            .packages
            .iter()
            .flat_map(|(key, pkg)| pkg.resolved.values().map(move |target| (target.clone(), key.clone())))
            .collect();
        for (target, importer) in edges {
            if target == importer {
                continue;
            }
            if let Some(pkg) = self.packages.get_mut(&target) {
                pkg.references.insert(importer);
            }
        }
    }

    fn unused_candidate(&self, key: &str, vendor_import: &str) -> bool {
        let Some(pkg) = self.packages.get(key) else {
            return false;
        };
        if pkg.status.location != Location::Vendor
            || pkg.status.presence != Presence::Normal
            || pkg.status.kind == PkgType::Program
            || pkg.in_tree
            || !has_path_prefix(key, vendor_import)
        {
            return false;
        }
        if pkg.include_tree {
            // References from inside the tree do not keep it alive.
            let subtree_used = self.packages.iter().any(|(k, p)| {
                has_path_prefix(k, key) && p.references.iter().any(|importer| !has_path_prefix(importer, key))
            });
            return !subtree_used;
        }
        if !pkg.references.is_empty() {
            return false;
        }
        true
    }

    /// Mark vendored packages nobody imports as unused, cascading through
    /// their own imports until nothing changes.
    pub(crate) fn detect_unused(&mut self) -> Result<()> {
        let vendor_import = self.vendor_import();
        let mut iteration = 0;
        loop {
            iteration += 1;
            self.loop_guard("unused detection", iteration)?;

            let unused: Vec<String> = self
                .packages
                .keys()
                .filter(|k| self.unused_candidate(k, &vendor_import))
                .cloned()
                .collect();
            if unused.is_empty() {
                return Ok(());
            }
            for key in &unused {
                tracing::debug!("Unused vendor package {key}");
                let targets: BTreeSet<String> = match self.packages.get_mut(key) {
                    Some(pkg) => {
                        pkg.status.presence = Presence::Unused;
                        pkg.resolved.values().cloned().collect()
                    }
                    None => continue,
                };
                for target in targets {
                    if let Some(dep) = self.packages.get_mut(&target) {
                        dep.references.remove(key);
                    }
                }
            }
        }
    }

    /// Remove unreferenced packages at `locations` from the graph, cascading
    /// through their imports. Returns the removed keys.
    pub(crate) fn prune_unreferenced(&mut self, locations: &[Location]) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        let mut iteration = 0;
        loop {
            iteration += 1;
            self.loop_guard("prune unreferenced", iteration)?;

            let victims: Vec<String> = self
                .packages
                .iter()
                .filter(|(_, p)| locations.contains(&p.status.location) && p.references.is_empty())
                .map(|(k, _)| k.clone())
                .collect();
            if victims.is_empty() {
                return Ok(removed);
            }
            for key in victims {
                let Some(pkg) = self.packages.remove(&key) else { continue };
                tracing::debug!("Pruned unreferenced package {key}");
                for target in pkg.resolved.values() {
                    if let Some(dep) = self.packages.get_mut(target) {
                        dep.references.remove(&key);
                    }
                }
                removed.push(key);
            }
        }
    }

    /// Update the graph after operations changed the vendor folder.
    ///
    /// `changed` pairs the key a package had before with the directory it now
    /// occupies (`None` when removed). Packages whose imports pointed at a
    /// changed key are re-resolved; externals left without references are
    /// pruned and unused detection runs again.
    pub(crate) fn refresh(&mut self, changed: &[(String, Option<(PathBuf, bool)>)]) -> Result<()> {
        let mut stale: BTreeSet<String> = BTreeSet::new();
        let mut pending = Pending::new();
        let root = self.root_dir.clone();

        for (old_key, new) in changed {
            stale.insert(old_key.clone());
            if let Some((dir, tree)) = new {
                let mut dirs = vec![dir.clone()];
                if *tree {
                    dirs = WalkDir::new(dir)
                        .sort_by_file_name()
                        .into_iter()
                        .filter_entry(|e| e.depth() == 0 || !skip_dir(&e.file_name().to_string_lossy()))
                        .filter_map(std::result::Result::ok)
                        .filter(|e| e.file_type().is_dir())
                        .map(|e| e.into_path())
                        .collect();
                }
                for dir in dirs.iter().filter(|d| has_go_files(d)) {
                    let local = self.local_for_dir(dir);
                    // Importers still resolving to the GOPATH copy must move over.
                    stale.insert(canonical_path(&local).to_string());
                    stale.insert(local.clone());
                    self.packages.remove(&local);
                    pending.extend(self.insert_package(&local, dir, &root)?);
                }
            } else {
                let removed: Vec<String> = self
                    .packages
                    .keys()
                    .filter(|k| has_path_prefix(k, old_key))
                    .cloned()
                    .collect();
                for key in removed {
                    self.packages.remove(&key);
                    stale.insert(key);
                }
            }
        }

        let dependents: Vec<String> = self
            .packages
            .iter()
            .filter(|(_, p)| p.resolved.values().any(|t| stale.contains(t)))
            .map(|(k, _)| k.clone())
            .collect();
        for key in dependents {
            if let Some(pkg) = self.packages.get_mut(&key) {
                pkg.resolved.clear();
                let imports = pkg.active_imports(&self.ignore_tags);
                pending.extend(imports.into_iter().map(|raw| (key.clone(), raw)));
            }
        }

        self.resolve_pending(pending)?;
        self.classify();

        for pkg in self.packages.values_mut() {
            if pkg.status.presence == Presence::Unused {
                pkg.status.presence = Presence::Normal;
            }
            pkg.in_tree = pkg.status.location == Location::Vendor
                && !self.manifest.tree_parents(&pkg.canonical).is_empty();
            if let Some(record) = self.manifest.find_local(&pkg.local) {
                pkg.origin = record.origin.clone();
                pkg.include_tree = record.tree;
            }
        }

        self.link_references();
        self.prune_unreferenced(&[Location::External, Location::NotFound])?;
        self.packages.retain(|_, p| {
            !(p.status.location == Location::Vendor && p.status.presence == Presence::Missing)
        });
        self.add_missing_records();
        self.detect_unused()
    }
}
