//! Packages and files in the dependency graph.

use super::status::{Location, PkgType, Status};
use crate::gosrc;
use crate::tags::TagSet;
use anyhow::{Context as _, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// A Go source file belonging to a [`Package`].
#[derive(Debug, Clone)]
pub struct File {
    pub path: PathBuf,
    pub package_name: String,
    /// Import paths in declaration order.
    pub imports: Vec<String>,
    /// Path asserted by `// import "..."` after the package clause.
    pub import_comment: Option<String>,
    pub tags: TagSet,
}

impl File {
    /// Parse the header of the file at `path`.
    pub fn parse(path: &Path) -> Result<Self> {
        let header = gosrc::parse_file(path)?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let tags = TagSet::for_file(&name, &header.build_lines, header.go_build.as_deref());
        Ok(Self {
            path: path.to_path_buf(),
            package_name: header.package_name.clone(),
            imports: header.import_paths().map(str::to_string).collect(),
            import_comment: header.import_comment.map(|c| c.path),
            tags,
        })
    }

    /// File name without directory.
    #[must_use]
    pub fn name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    #[must_use]
    pub fn excluded(&self, ignore_tags: &[String]) -> bool {
        self.tags.excluded(ignore_tags)
    }
}

/// A package in the dependency graph, keyed by its local import path.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Directory on disk; empty when not found.
    pub dir: PathBuf,
    /// Upstream identity: the local path with any `vendor/` prefix removed.
    pub canonical: String,
    /// Import path as seen from its location.
    pub local: String,
    /// Source root the package was found under.
    pub src_root: PathBuf,
    /// Where a vendored package was copied from, per the manifest.
    pub origin: String,
    pub status: Status,
    pub files: Vec<File>,
    /// Vendored together with its whole subtree.
    pub include_tree: bool,
    /// Lies below a tree-vendored package.
    pub in_tree: bool,
    /// Raw import path to the local key it resolved to.
    pub resolved: BTreeMap<String, String>,
    /// Local keys of packages importing this one. Rebuilt on every resolve.
    pub references: BTreeSet<String>,
}

impl Package {
    /// A package with no files yet.
    #[must_use]
    pub fn new(local: &str, dir: &Path, src_root: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            canonical: canonical_path(local).to_string(),
            local: local.to_string(),
            src_root: src_root.to_path_buf(),
            ..Self::default()
        }
    }

    /// A standard library package.
    #[must_use]
    pub fn standard(path: &str, dir: &Path, src_root: &Path) -> Self {
        let mut pkg = Self::new(path, dir, src_root);
        pkg.status = Status::new(Location::Standard);
        pkg
    }

    /// A package that could not be located.
    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self {
            canonical: canonical_path(path).to_string(),
            local: path.to_string(),
            status: Status::not_found(),
            ..Self::default()
        }
    }

    /// Parse every Go file directly inside `self.dir`.
    ///
    /// Files starting with `.` or `_` are skipped, as the Go tool does.
    /// Files that fail to parse are logged and skipped.
    pub fn scan_files(&mut self) -> Result<()> {
        self.files.clear();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read directory: {}", self.dir.display()))?;
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| is_go_source(p))
            .collect();
        paths.sort();

        for path in paths {
            match File::parse(&path) {
                Ok(file) => self.files.push(file),
                Err(e) => tracing::warn!("Skipping {}: {e:#}", path.display()),
            }
        }

        if self.package_name() == Some("main") {
            self.status.kind = PkgType::Program;
        }
        Ok(())
    }

    /// Package name taken from the first non-test file.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| !f.tags.is_test())
            .or_else(|| self.files.first())
            .map(|f| f.package_name.as_str())
    }

    /// Imports of the files not excluded by `ignore_tags`, deduplicated.
    #[must_use]
    pub fn active_imports(&self, ignore_tags: &[String]) -> BTreeSet<String> {
        self.files
            .iter()
            .filter(|f| !f.excluded(ignore_tags))
            .flat_map(|f| f.imports.iter().cloned())
            .collect()
    }

    /// Names of the files excluded by `ignore_tags`.
    #[must_use]
    pub fn ignored_files(&self, ignore_tags: &[String]) -> Vec<String> {
        self.files.iter().filter(|f| f.excluded(ignore_tags)).map(File::name).collect()
    }
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name.ends_with(".go") && !name.starts_with('.') && !name.starts_with('_')
}

/// Strip everything up to and including the last `vendor/` element.
///
/// ```rust
/// use gvend_cli::context::canonical_path;
///
/// assert_eq!(canonical_path("co1/pk1/vendor/co2/pk1"), "co2/pk1");
/// assert_eq!(canonical_path("vendor/co2/pk1"), "co2/pk1");
/// assert_eq!(canonical_path("co2/pk1"), "co2/pk1");
/// ```
#[must_use]
pub fn canonical_path(local: &str) -> &str {
    if let Some(index) = local.rfind("/vendor/") {
        return &local[index + "/vendor/".len()..];
    }
    local.strip_prefix("vendor/").unwrap_or(local)
}
