//! Mercurial backend.

use super::{Vcs, VcsCommand, VcsInfo, parse_rfc3339};
use crate::version::Label;
use anyhow::Result;
use std::path::Path;

pub struct Hg;

impl Vcs for Hg {
    fn name(&self) -> &'static str {
        "hg"
    }

    fn marker(&self) -> &'static str {
        ".hg"
    }

    fn find_info(&self, dir: &Path) -> Result<Option<VcsInfo>> {
        if self.repo_root(dir).is_none() {
            return Ok(None);
        }
        let status = VcsCommand::new("hg").args(["status", "."]).current_dir(dir).execute_stdout()?;
        let log = VcsCommand::new("hg")
            .args(["log", "-l", "1", "--template", "{node}\\n{date|rfc3339date}", "."])
            .current_dir(dir)
            .execute_stdout()?;

        let mut lines = log.lines();
        Ok(Some(VcsInfo {
            dirty: !status.is_empty(),
            revision: lines.next().unwrap_or_default().to_string(),
            revision_time: lines.next().and_then(parse_rfc3339),
        }))
    }

    fn create(&self, url: &str, dest: &Path) -> Result<()> {
        VcsCommand::new("hg")
            .args(["clone", "-q", "-U", url])
            .arg(dest.display().to_string())
            .with_context(url)
            .execute_success()
    }

    fn checkout(&self, repo: &Path, revision: &str) -> Result<()> {
        VcsCommand::new("hg").args(["update", "-q", "-r", revision]).current_dir(repo).execute_success()
    }

    fn labels(&self, repo: &Path) -> Result<Vec<Label>> {
        let branches = VcsCommand::new("hg").args(["branches", "-q"]).current_dir(repo).execute_stdout()?;
        let tags = VcsCommand::new("hg").args(["tags", "-q"]).current_dir(repo).execute_stdout()?;
        let mut labels: Vec<Label> = branches.lines().map(|b| Label::branch(b.trim())).collect();
        labels.extend(tags.lines().map(str::trim).filter(|t| *t != "tip").map(Label::tag));
        Ok(labels)
    }
}
