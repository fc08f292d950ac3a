//! The vendoring session.
//!
//! A [`Context`] holds everything one command works on: the Go environment,
//! the project root and its import path, the manifest, the package graph and
//! the pending operations. Commands drive it through a fixed sequence of
//! phases:
//!
//! 1. [`Context::load_packages`] walks the project and resolves every import
//! 2. [`Context::modify`] turns package specifiers into [`Operation`]s
//! 3. [`Context::check`] groups operations that collide into [`Conflict`]s
//! 4. [`Context::alter`] fetches, copies and removes, rewrites imports and
//!    saves the manifest
//!
//! The context is passed explicitly; there is no process wide state.

mod alter;
mod conflict;
pub mod copy;
mod fetch;
pub mod license;
mod modify;
mod package;
mod resolve;
mod rewrite;
pub mod status;
mod sync;

pub use conflict::{Conflict, ResolveStrategy};
pub use modify::{ModifyKind, ModifyOptions};
pub use package::{File, Package, canonical_path};
pub use status::{Location, PkgType, Presence, Status, StatusFilter, StatusGroup};

use crate::config::{GlobalConfig, GoEnv};
use crate::constants::{DEFAULT_LOOP_LIMIT, VENDOR_FOLDER};
use crate::core::VendorError;
use crate::manifest::{Manifest, find_manifest, manifest_path};
use crate::utils::fs::{normalize_path, path_to_import};
use crate::vcs::VcsChain;
use crate::vcs::remote::RemoteResolver;
use crate::version::VersionRequest;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// What an [`Operation`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Copy,
    Remove,
    Fetch,
}

/// Lifecycle of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Ready,
    /// Lost a conflict; never executed.
    Ignore,
    Done,
}

/// One planned change to the vendor folder.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub state: OpState,
    /// Canonical path of the vendored package.
    pub canonical: String,
    /// Import path the package is copied or fetched from.
    pub source: String,
    /// Local key of the package in the graph this operation came from.
    pub pkg: String,
    /// Directory copied from (Copy) or removed (Remove).
    pub src: PathBuf,
    /// Destination directory; empty for Remove.
    pub dest: PathBuf,
    /// File names not copied from the top directory.
    pub ignore_files: Vec<String>,
    pub tree: bool,
    pub uncommitted: bool,
    /// Version to fetch.
    pub version: Option<VersionRequest>,
    /// Exact revision to fetch, used by sync.
    pub revision: String,
    /// Revision info recorded into the manifest after a copy.
    pub revision_time: String,
}

impl Operation {
    fn new(kind: OpKind, canonical: &str, source: &str) -> Self {
        Self {
            kind,
            state: OpState::Ready,
            canonical: canonical.to_string(),
            source: source.to_string(),
            pkg: String::new(),
            src: PathBuf::new(),
            dest: PathBuf::new(),
            ignore_files: Vec::new(),
            tree: false,
            uncommitted: false,
            version: None,
            revision: String::new(),
            revision_time: String::new(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Copy => {
                write!(f, "copy {} -> {}", self.src.display(), self.dest.display())?;
                if !self.ignore_files.is_empty() {
                    write!(f, " (ignore {})", self.ignore_files.join(", "))?;
                }
                Ok(())
            }
            OpKind::Remove => write!(f, "remove {}", self.src.display()),
            OpKind::Fetch => {
                write!(f, "fetch {}", self.source)?;
                if let Some(version) = &self.version {
                    write!(f, "@{}", version.as_spec())?;
                } else if !self.revision.is_empty() {
                    write!(f, "@{}", self.revision)?;
                }
                write!(f, " -> {}", self.canonical)
            }
        }
    }
}

/// A vendoring session over one project.
#[derive(Debug)]
pub struct Context {
    pub env: GoEnv,
    /// Directory holding `vendor/`.
    pub root_dir: PathBuf,
    /// Import path of `root_dir`.
    pub root_import: String,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    /// Package graph keyed by local import path.
    pub packages: BTreeMap<String, Package>,
    pub operations: Vec<Operation>,
    /// Import path renames applied after the operations run.
    pub rewrite_rules: BTreeMap<String, String>,
    pub ignore_tags: Vec<String>,
    pub excluded: Vec<String>,
    pub insecure: bool,
    /// Iteration ceiling for every fixpoint loop.
    pub loop_limit: usize,
    pub vcs: VcsChain,
    pub remote: RemoteResolver,
    /// Local keys whose vendored copy needs its import comment stripped.
    pub(crate) stripped: Vec<String>,
    pub(crate) fetch_cache: fetch::FetchCache,
    loaded: bool,
}

impl Context {
    /// A session over `root_dir` with the given manifest.
    ///
    /// The project import path comes from the manifest `rootPath` when set,
    /// otherwise from the GOPATH entry containing `root_dir`.
    pub fn new(env: GoEnv, root_dir: &Path, manifest: Manifest) -> Result<Self> {
        let root_dir = normalize_path(root_dir);
        let root_import = if manifest.root_path.is_empty() {
            env.gopath_srcs()
                .iter()
                .find_map(|src| path_to_import(src, &root_dir).filter(|p| !p.is_empty()))
                .ok_or_else(|| VendorError::NotInGopath {
                    dir: root_dir.display().to_string(),
                })?
        } else {
            manifest.root_path.trim_end_matches('/').to_string()
        };

        let mut manifest = manifest;
        manifest.assign_local_paths(&root_import);

        let ignore_tags = manifest.ignore_tags();
        let excluded = manifest.excluded_prefixes();
        tracing::debug!(
            "Context root {} ({}), ignore tags {:?}, excluded {:?}",
            root_dir.display(),
            root_import,
            ignore_tags,
            excluded
        );

        Ok(Self {
            manifest_path: manifest_path(&root_dir),
            env,
            root_dir,
            root_import,
            manifest,
            packages: BTreeMap::new(),
            operations: Vec::new(),
            rewrite_rules: BTreeMap::new(),
            ignore_tags,
            excluded,
            insecure: false,
            loop_limit: DEFAULT_LOOP_LIMIT,
            vcs: VcsChain::default(),
            remote: RemoteResolver::default(),
            stripped: Vec::new(),
            fetch_cache: fetch::FetchCache::default(),
            loaded: false,
        })
    }

    /// Open the project containing `dir` by finding its manifest upward.
    pub fn open(env: GoEnv, dir: &Path) -> Result<Self> {
        let (root, path) = find_manifest(dir).ok_or_else(|| VendorError::MissingManifest {
            path: manifest_path(dir).display().to_string(),
        })?;
        let manifest = Manifest::load(&path)?;
        Self::new(env, &root, manifest)
    }

    /// Create `vendor/vendor.json` in `root_dir` unless it exists, then open it.
    pub fn init(env: GoEnv, root_dir: &Path, ignore: &str) -> Result<Self> {
        let path = manifest_path(root_dir);
        if path.exists() {
            tracing::info!("Manifest already exists at {}", path.display());
            return Self::new(env, root_dir, Manifest::load(&path)?);
        }
        let mut ctx = Self::new(env, root_dir, Manifest::new(ignore))?;
        ctx.write_manifest()?;
        Ok(ctx)
    }

    /// Apply settings from the global config.
    pub fn apply_config(&mut self, config: &GlobalConfig) {
        self.loop_limit = config.loop_limit;
        self.insecure |= config.insecure;
        self.remote = RemoteResolver::new(config.hosts.clone(), self.insecure);
    }

    pub fn set_insecure(&mut self, insecure: bool) {
        self.insecure = insecure;
        self.remote.insecure = insecure;
    }

    /// `root_dir/vendor`.
    #[must_use]
    pub fn vendor_dir(&self) -> PathBuf {
        self.root_dir.join(VENDOR_FOLDER)
    }

    /// `root_import/vendor`.
    #[must_use]
    pub fn vendor_import(&self) -> String {
        format!("{}/{VENDOR_FOLDER}", self.root_import)
    }

    /// Local key a package with this canonical path gets once vendored.
    #[must_use]
    pub fn vendor_local(&self, canonical: &str) -> String {
        format!("{}/{canonical}", self.vendor_import())
    }

    /// True if `path` lies under an excluded prefix.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|p| crate::utils::fs::has_path_prefix(path, p))
    }

    /// Load the package graph if it has not been loaded yet.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if !self.loaded {
            self.load_packages()?;
        }
        Ok(())
    }

    /// Packages sorted by local path, optionally filtered by status.
    #[must_use]
    pub fn list(&self, filter: &StatusFilter) -> Vec<&Package> {
        self.packages
            .values()
            .filter(|p| filter.is_empty() || filter.matches(&p.status))
            .collect()
    }

    /// Operations still to run.
    pub fn ready_operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.state == OpState::Ready)
    }

    /// Save the manifest to `vendor/vendor.json`.
    pub fn write_manifest(&mut self) -> Result<()> {
        self.manifest.save(&self.manifest_path)
    }

    fn loop_guard(&self, phase: &str, iteration: usize) -> Result<()> {
        if iteration > self.loop_limit {
            return Err(VendorError::InternalLoopLimit {
                phase: phase.to_string(),
                limit: self.loop_limit,
            }
            .into());
        }
        Ok(())
    }
}
