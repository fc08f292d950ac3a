//! Subversion backend.

use super::{Vcs, VcsCommand, VcsInfo};
use crate::version::Label;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

pub struct Svn;

impl Vcs for Svn {
    fn name(&self) -> &'static str {
        "svn"
    }

    fn marker(&self) -> &'static str {
        ".svn"
    }

    fn find_info(&self, dir: &Path) -> Result<Option<VcsInfo>> {
        if self.repo_root(dir).is_none() {
            return Ok(None);
        }
        let status = VcsCommand::new("svn").args(["status", "-q", "."]).current_dir(dir).execute_stdout()?;
        let info = VcsCommand::new("svn").args(["info", "."]).current_dir(dir).execute_stdout()?;
        let (revision, revision_time) = parse_info(&info);
        Ok(Some(VcsInfo {
            dirty: !status.is_empty(),
            revision,
            revision_time,
        }))
    }

    fn create(&self, url: &str, dest: &Path) -> Result<()> {
        VcsCommand::new("svn")
            .args(["checkout", "-q", url])
            .arg(dest.display().to_string())
            .with_context(url)
            .execute_success()
    }

    fn checkout(&self, repo: &Path, revision: &str) -> Result<()> {
        VcsCommand::new("svn").args(["update", "-q", "-r", revision]).current_dir(repo).execute_success()
    }

    fn labels(&self, repo: &Path) -> Result<Vec<Label>> {
        let mut labels = Vec::new();
        for (folder, make) in [("^/branches", Label::branch as fn(String) -> Label), ("^/tags", Label::tag as fn(String) -> Label)] {
            let listing = VcsCommand::new("svn").args(["ls", folder]).current_dir(repo).execute_stdout()?;
            labels.extend(
                listing
                    .lines()
                    .map(|l| l.trim().trim_end_matches('/').to_string())
                    .filter(|l| !l.is_empty())
                    .map(make),
            );
        }
        Ok(labels)
    }
}

fn parse_info(info: &str) -> (String, Option<DateTime<Utc>>) {
    let mut revision = String::new();
    let mut time = None;
    for line in info.lines() {
        if let Some(rev) = line.strip_prefix("Last Changed Rev:") {
            revision = rev.trim().to_string();
        } else if let Some(date) = line.strip_prefix("Last Changed Date:") {
            // "2016-01-02 03:04:05 +0100 (Sat, 02 Jan 2016)"
            let stamp: String = date.trim().splitn(4, ' ').take(3).collect::<Vec<_>>().join(" ");
            time = DateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S %z")
                .ok()
                .map(|t| t.with_timezone(&Utc));
        }
    }
    (revision, time)
}
