//! Bazaar backend.

use super::{Vcs, VcsCommand, VcsInfo};
use crate::version::Label;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

pub struct Bzr;

impl Vcs for Bzr {
    fn name(&self) -> &'static str {
        "bzr"
    }

    fn marker(&self) -> &'static str {
        ".bzr"
    }

    fn find_info(&self, dir: &Path) -> Result<Option<VcsInfo>> {
        if self.repo_root(dir).is_none() {
            return Ok(None);
        }
        let status = VcsCommand::new("bzr").args(["status", "-S", "."]).current_dir(dir).execute_stdout()?;
        let info = VcsCommand::new("bzr")
            .args(["version-info", "--custom", "--template={revision_id}\\n{date}"])
            .current_dir(dir)
            .execute_stdout()?;

        let mut lines = info.lines();
        Ok(Some(VcsInfo {
            dirty: !status.is_empty(),
            revision: lines.next().unwrap_or_default().to_string(),
            revision_time: lines.next().and_then(parse_bzr_date),
        }))
    }

    fn create(&self, url: &str, dest: &Path) -> Result<()> {
        VcsCommand::new("bzr")
            .args(["branch", "-q", url])
            .arg(dest.display().to_string())
            .with_context(url)
            .execute_success()
    }

    fn checkout(&self, repo: &Path, revision: &str) -> Result<()> {
        let spec = if revision.contains('@') { format!("revid:{revision}") } else { revision.to_string() };
        VcsCommand::new("bzr").args(["update", "-q", "-r", &spec]).current_dir(repo).execute_success()
    }

    fn labels(&self, repo: &Path) -> Result<Vec<Label>> {
        let tags = VcsCommand::new("bzr").arg("tags").current_dir(repo).execute_stdout()?;
        Ok(tags
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(Label::tag)
            .collect())
    }
}

/// Bazaar prints dates as `2016-01-02 03:04:05 +0100`.
fn parse_bzr_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
