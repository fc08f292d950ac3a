//! Version control backends.
//!
//! The vendoring core needs two things from version control: revision
//! information for a package directory (is it dirty, which revision, when),
//! and for fetching, the ability to clone a repository, list its labels and
//! check out a revision. Each tool implements [`Vcs`]; a [`VcsChain`] tries
//! them in order and the first backend that recognises a directory wins.

mod bzr;
mod command;
mod git;
mod hg;
pub mod remote;
mod svn;

pub use bzr::Bzr;
pub use command::{VcsCommand, VcsCommandOutput};
pub use git::Git;
pub use hg::Hg;
pub use svn::Svn;

use crate::version::Label;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Revision information for a directory under version control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsInfo {
    /// Uncommitted changes exist in the directory.
    pub dirty: bool,
    pub revision: String,
    pub revision_time: Option<DateTime<Utc>>,
}

/// A version control tool.
pub trait Vcs {
    /// Tool name as used in `go-import` meta tags (`git`, `hg`, `bzr`, `svn`).
    fn name(&self) -> &'static str;

    /// Metadata directory marking a checkout (`.git`, `.hg`, ...).
    fn marker(&self) -> &'static str;

    /// Revision info for `dir`, or `None` if it is not under this tool.
    fn find_info(&self, dir: &Path) -> Result<Option<VcsInfo>>;

    /// Clone `url` into `dest`.
    fn create(&self, url: &str, dest: &Path) -> Result<()>;

    /// Check out `revision` (a label or revision id) in `repo`.
    fn checkout(&self, repo: &Path, revision: &str) -> Result<()>;

    /// Branches and tags of the repository at `repo`.
    fn labels(&self, repo: &Path) -> Result<Vec<Label>>;

    /// The checkout root containing `dir`, found by walking upward.
    fn repo_root(&self, dir: &Path) -> Option<PathBuf> {
        dir.ancestors().find(|d| d.join(self.marker()).exists()).map(Path::to_path_buf)
    }
}

/// Ordered list of backends; the first that recognises a directory answers.
pub struct VcsChain {
    backends: Vec<Box<dyn Vcs>>,
}

impl Default for VcsChain {
    fn default() -> Self {
        Self {
            backends: vec![Box::new(Git), Box::new(Hg), Box::new(Bzr), Box::new(Svn)],
        }
    }
}

impl std::fmt::Debug for VcsChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("VcsChain").field("backends", &names).finish()
    }
}

impl VcsChain {
    /// A chain with the given backends.
    pub fn new(backends: Vec<Box<dyn Vcs>>) -> Self {
        Self { backends }
    }

    /// A chain that recognises nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Revision info from the first backend recognising `dir`.
    pub fn find_info(&self, dir: &Path) -> Result<Option<VcsInfo>> {
        for backend in &self.backends {
            if let Some(info) = backend.find_info(dir)? {
                tracing::debug!(
                    "{} {}: revision {} dirty={}",
                    backend.name(),
                    dir.display(),
                    info.revision,
                    info.dirty
                );
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    /// Backend by tool name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&dyn Vcs> {
        self.backends.iter().find(|b| b.name() == name).map(AsRef::as_ref)
    }

    /// Backend whose checkout contains `dir`.
    #[must_use]
    pub fn detect(&self, dir: &Path) -> Option<&dyn Vcs> {
        self.backends.iter().find(|b| b.repo_root(dir).is_some()).map(AsRef::as_ref)
    }
}

/// Parse an RFC 3339 timestamp into UTC.
pub(crate) fn parse_rfc3339(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim()).ok().map(|t| t.with_timezone(&Utc))
}
