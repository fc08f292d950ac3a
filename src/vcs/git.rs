//! git backend.

use super::{Vcs, VcsCommand, VcsInfo, parse_rfc3339};
use crate::version::Label;
use anyhow::Result;
use std::path::Path;

pub struct Git;

impl Vcs for Git {
    fn name(&self) -> &'static str {
        "git"
    }

    fn marker(&self) -> &'static str {
        ".git"
    }

    fn find_info(&self, dir: &Path) -> Result<Option<VcsInfo>> {
        if self.repo_root(dir).is_none() {
            return Ok(None);
        }
        let status = VcsCommand::new("git")
            .args(["status", "--porcelain", "--", "."])
            .current_dir(dir)
            .execute_stdout()?;
        let log = VcsCommand::new("git")
            .args(["log", "-n", "1", "--format=%H%n%cI", "--", "."])
            .current_dir(dir)
            .execute_stdout()?;

        let mut lines = log.lines();
        let revision = lines.next().unwrap_or_default().to_string();
        let revision_time = lines.next().and_then(parse_rfc3339);
        Ok(Some(VcsInfo {
            dirty: !status.is_empty(),
            revision,
            revision_time,
        }))
    }

    fn create(&self, url: &str, dest: &Path) -> Result<()> {
        VcsCommand::new("git")
            .args(["clone", "-q", url])
            .arg(dest.display().to_string())
            .env("GIT_TERMINAL_PROMPT", "0")
            .with_context(url)
            .execute_success()
    }

    fn checkout(&self, repo: &Path, revision: &str) -> Result<()> {
        VcsCommand::new("git")
            .args(["checkout", "-q", revision])
            .current_dir(repo)
            .execute_success()
    }

    fn labels(&self, repo: &Path) -> Result<Vec<Label>> {
        let refs = VcsCommand::new("git")
            .args(["for-each-ref", "--format=%(refname)", "refs/tags", "refs/remotes/origin"])
            .current_dir(repo)
            .execute_stdout()?;
        Ok(parse_refs(&refs))
    }
}

fn parse_refs(output: &str) -> Vec<Label> {
    output
        .lines()
        .filter_map(|line| {
            if let Some(tag) = line.strip_prefix("refs/tags/") {
                Some(Label::tag(tag))
            } else {
                line.strip_prefix("refs/remotes/origin/")
                    .filter(|branch| *branch != "HEAD")
                    .map(Label::branch)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::LabelSource;

    #[test]
    fn test_parse_refs() {
        let labels = parse_refs(
            "refs/remotes/origin/HEAD\nrefs/remotes/origin/master\nrefs/remotes/origin/v1\nrefs/tags/v1.0.1\n",
        );
        let pairs: Vec<_> = labels.iter().map(|l| (l.text.as_str(), l.source)).collect();
        assert_eq!(
            pairs,
            vec![
                ("master", LabelSource::Branch),
                ("v1", LabelSource::Branch),
                ("v1.0.1", LabelSource::Tag),
            ]
        );
    }

    #[test]
    fn test_find_info_on_real_repo() {
        if which::which("git").is_err() {
            return;
        }
        let temp = tempfile::tempdir().unwrap();
        let repo = temp.path();
        let git = |args: &[&str]| {
            VcsCommand::new("git")
                .args(["-c", "user.name=t", "-c", "user.email=t@example.com"])
                .args(args.iter().copied())
                .current_dir(repo)
                .execute_success()
                .unwrap();
        };
        git(&["init", "-q"]);
        std::fs::write(repo.join("a.go"), "package a\n").unwrap();
        git(&["add", "a.go"]);
        git(&["commit", "-q", "-m", "init"]);

        let info = Git.find_info(repo).unwrap().unwrap();
        assert!(!info.dirty);
        assert_eq!(info.revision.len(), 40);
        assert!(info.revision_time.is_some());

        std::fs::write(repo.join("a.go"), "package a // changed\n").unwrap();
        assert!(Git.find_info(repo).unwrap().unwrap().dirty);
    }

    #[test]
    fn test_outside_repo() {
        let temp = tempfile::tempdir().unwrap();
        if Git.repo_root(temp.path()).is_some() {
            return;
        }
        assert!(Git.find_info(temp.path()).unwrap().is_none());
    }
}
