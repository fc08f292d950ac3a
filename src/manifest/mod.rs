//! The vendor manifest, `vendor/vendor.json`.
//!
//! The manifest records every vendored package: where it was copied from,
//! which revision, and a checksum of the copied tree used to detect drift.
//!
//! # Format
//!
//! ```json
//! {
//!     "comment": "",
//!     "ignore": "test github.com/legacy/",
//!     "package": [
//!         {
//!             "path": "github.com/pkg/errors",
//!             "revision": "645ef00459ed84a119197bfb8d8205042c6df63d",
//!             "revisionTime": "2017-02-13T20:30:04Z",
//!             "checksumSHA256": "Yf0Gi6pvNjqe-7ewCqcrQr6BHo2JMhRaJZlTBnldXk0"
//!         }
//!     ],
//!     "rootPath": "example.com/project"
//! }
//! ```
//!
//! The `ignore` string mixes two kinds of words: build tags (files carrying
//! them are not copied) and package path prefixes, recognised by containing a
//! `/`, which are excluded from vendoring entirely.
//!
//! Records carry two transient flags, `add` and `remove`, used by a single
//! command's edit session and never written to disk. See
//! [`Manifest::save`] for how they are applied.

mod helpers;
mod manifest_io;

pub use helpers::{find_manifest, manifest_path};

use crate::utils::fs::has_path_prefix;
use serde::{Deserialize, Serialize};

/// Top level of `vendor.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Free text comment, preserved as is.
    #[serde(default)]
    pub comment: String,

    /// Whitespace separated build tags and excluded package prefixes.
    #[serde(default)]
    pub ignore: String,

    /// Vendor records, sorted by local then canonical path on save.
    #[serde(default)]
    pub package: Vec<VendorRecord>,

    /// Import path of the project root, for projects outside a GOPATH.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_path: String,
}

/// One vendored package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRecord {
    /// Import path the package was copied from, when it differs from `path`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,

    /// Canonical import path; the package lives at `vendor/<path>`.
    pub path: String,

    /// Import path under which the project sees this package. Derived from
    /// the project root when the manifest is loaded into a context.
    #[serde(skip)]
    pub local: String,

    /// Whole subtree vendored as one unit.
    #[serde(default, skip_serializing_if = "is_false")]
    pub tree: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision: String,

    /// RFC 3339 timestamp of the revision.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision_time: String,

    /// Base64 SHA-256 of the copied tree, or the uncommitted marker.
    #[serde(rename = "checksumSHA256", default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// Added during the current session.
    #[serde(skip)]
    pub add: bool,

    /// Scheduled for removal on save.
    #[serde(skip)]
    pub remove: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl VendorRecord {
    /// A fresh record for `path`, flagged as added this session.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            add: true,
            ..Self::default()
        }
    }

    /// The import path the package was copied from (`origin` or `path`).
    #[must_use]
    pub fn source_path(&self) -> &str {
        if self.origin.is_empty() { &self.path } else { &self.origin }
    }
}

impl Manifest {
    /// An empty manifest ignoring the given build tags.
    #[must_use]
    pub fn new(ignore: &str) -> Self {
        Self {
            ignore: ignore.to_string(),
            ..Self::default()
        }
    }

    /// Build tags from the `ignore` string.
    #[must_use]
    pub fn ignore_tags(&self) -> Vec<String> {
        self.ignore
            .split_whitespace()
            .filter(|word| !word.contains('/'))
            .map(str::to_string)
            .collect()
    }

    /// Package path prefixes from the `ignore` string, without trailing `/`.
    #[must_use]
    pub fn excluded_prefixes(&self) -> Vec<String> {
        self.ignore
            .split_whitespace()
            .filter(|word| word.contains('/'))
            .map(|word| word.trim_end_matches('/').to_string())
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// True if `path` falls under an excluded prefix.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes().iter().any(|prefix| has_path_prefix(path, prefix))
    }

    /// Fill in each record's local path from the project import path.
    pub fn assign_local_paths(&mut self, root_import: &str) {
        for record in &mut self.package {
            record.local = vendor_local_path(root_import, &record.path);
        }
    }

    /// Record with the given canonical path, ignoring records being removed.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&VendorRecord> {
        self.package.iter().find(|r| r.path == path && !r.remove)
    }

    /// Mutable variant of [`Self::find`].
    pub fn find_mut(&mut self, path: &str) -> Option<&mut VendorRecord> {
        self.package.iter_mut().find(|r| r.path == path && !r.remove)
    }

    /// Record whose local path is `local`.
    #[must_use]
    pub fn find_local(&self, local: &str) -> Option<&VendorRecord> {
        self.package.iter().find(|r| r.local == local && !r.remove)
    }

    /// Returns the record for `path`, creating it (flagged `add`) if needed.
    pub fn upsert(&mut self, path: &str) -> &mut VendorRecord {
        if let Some(index) = self.package.iter().position(|r| r.path == path && !r.remove) {
            return &mut self.package[index];
        }
        self.package.push(VendorRecord::new(path));
        let last = self.package.len() - 1;
        &mut self.package[last]
    }

    /// Flag the record for `path` for removal. Returns false if absent.
    pub fn mark_removed(&mut self, path: &str) -> bool {
        match self.find_mut(path) {
            Some(record) => {
                record.remove = true;
                true
            }
            None => false,
        }
    }

    /// Tree records whose path is a strict ancestor of `path`.
    #[must_use]
    pub fn tree_parents(&self, path: &str) -> Vec<String> {
        self.package
            .iter()
            .filter(|r| r.tree && !r.remove && r.path != path && has_path_prefix(path, &r.path))
            .map(|r| r.path.clone())
            .collect()
    }

    /// Records strictly below `path`.
    #[must_use]
    pub fn children(&self, path: &str) -> Vec<String> {
        self.package
            .iter()
            .filter(|r| !r.remove && r.path != path && has_path_prefix(&r.path, path))
            .map(|r| r.path.clone())
            .collect()
    }

    /// Drop removed records, clear session flags and sort for writing.
    pub fn normalize(&mut self) {
        self.package.retain(|r| !r.remove);
        for record in &mut self.package {
            record.add = false;
        }
        self.package
            .sort_by(|a, b| a.local.cmp(&b.local).then_with(|| a.path.cmp(&b.path)));
    }
}

/// `root_import/vendor/path`, or `vendor/path` when the root import is empty.
#[must_use]
pub fn vendor_local_path(root_import: &str, path: &str) -> String {
    if root_import.is_empty() {
        format!("{}/{path}", crate::constants::VENDOR_FOLDER)
    } else {
        format!("{root_import}/{}/{path}", crate::constants::VENDOR_FOLDER)
    }
}
