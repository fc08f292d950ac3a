//! Mapping an import path to the repository that hosts it.
//!
//! Well known hosts are resolved from static rules. Configured host overrides
//! come next, and anything else is discovered by fetching
//! `https://<path>?go-get=1` and reading its `go-import` meta tag.

use crate::constants::META_DISCOVERY_TIMEOUT;
use crate::core::VendorError;
use crate::utils::fs::has_path_prefix;
use anyhow::{Context, Result};
use regex::Regex;
use reqwest::blocking::Client;
use std::collections::BTreeMap;

/// Repository hosting an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    /// Import path of the repository root.
    pub root: String,
    /// VCS tool name.
    pub vcs: String,
    /// Clone URL.
    pub url: String,
}

/// Resolver for repository roots.
#[derive(Debug, Clone, Default)]
pub struct RemoteResolver {
    /// Repository root import path to clone URL (git), from the global config.
    pub hosts: BTreeMap<String, String>,
    /// Allow plain HTTP discovery.
    pub insecure: bool,
}

impl RemoteResolver {
    pub fn new(hosts: BTreeMap<String, String>, insecure: bool) -> Self {
        Self { hosts, insecure }
    }

    /// Repository root for `import_path`.
    pub fn resolve(&self, import_path: &str) -> Result<RepoRoot> {
        if let Some(root) = static_root(import_path) {
            return Ok(root);
        }
        if let Some(root) = self.configured_root(import_path) {
            return Ok(root);
        }
        self.discover(import_path)
    }

    fn configured_root(&self, import_path: &str) -> Option<RepoRoot> {
        self.hosts
            .iter()
            .filter(|(root, _)| has_path_prefix(import_path, root))
            .max_by_key(|(root, _)| root.len())
            .map(|(root, url)| RepoRoot {
                root: root.clone(),
                vcs: "git".to_string(),
                url: url.clone(),
            })
    }

    fn discover(&self, import_path: &str) -> Result<RepoRoot> {
        let client = Client::builder()
            .user_agent(concat!("gvend/", env!("CARGO_PKG_VERSION")))
            .timeout(META_DISCOVERY_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let mut schemes = vec!["https"];
        if self.insecure {
            schemes.push("http");
        }

        let mut last_error = None;
        for scheme in schemes {
            let url = format!("{scheme}://{import_path}?go-get=1");
            tracing::debug!("Discovering repository for {import_path} via {url}");
            match client.get(&url).send().and_then(|r| r.error_for_status()).and_then(|r| r.text()) {
                Ok(body) => {
                    if let Some(root) = parse_go_import(&body, import_path) {
                        return Ok(root);
                    }
                    last_error = Some(format!("no go-import meta tag at {url}"));
                }
                Err(e) => last_error = Some(format!("{url}: {e}")),
            }
        }

        Err(VendorError::UnknownVcs {
            path: format!(
                "{import_path} ({})",
                last_error.unwrap_or_else(|| "discovery failed".to_string())
            ),
        }
        .into())
    }
}

fn static_root(import_path: &str) -> Option<RepoRoot> {
    let parts: Vec<&str> = import_path.split('/').collect();
    let git = |root: String, url: String| RepoRoot {
        root,
        vcs: "git".to_string(),
        url,
    };

    match parts.as_slice() {
        [host @ ("github.com" | "bitbucket.org" | "gitlab.com"), user, repo, ..] => {
            let root = format!("{host}/{user}/{repo}");
            Some(git(root.clone(), format!("https://{root}")))
        }
        ["golang.org", "x", name, ..] => Some(git(
            format!("golang.org/x/{name}"),
            format!("https://go.googlesource.com/{name}"),
        )),
        ["gopkg.in", first, rest @ ..] => {
            // gopkg.in/pkg.v1 or gopkg.in/user/pkg.v1
            let root = if first.contains(".v") {
                format!("gopkg.in/{first}")
            } else {
                let second = rest.first()?;
                format!("gopkg.in/{first}/{second}")
            };
            Some(git(root.clone(), format!("https://{root}")))
        }
        _ => None,
    }
}

/// Find the `go-import` meta tag whose root is a prefix of `import_path`.
fn parse_go_import(body: &str, import_path: &str) -> Option<RepoRoot> {
    let re =
        Regex::new(r#"(?is)<meta\s+name\s*=\s*["']go-import["']\s+content\s*=\s*["']([^"']+)["']"#)
            .ok()?;
    re.captures_iter(body).find_map(|cap| {
        let mut fields = cap[1].split_whitespace();
        let root = fields.next()?;
        let vcs = fields.next()?;
        let url = fields.next()?;
        if vcs == "mod" || !has_path_prefix(import_path, root) {
            return None;
        }
        Some(RepoRoot {
            root: root.to_string(),
            vcs: vcs.to_string(),
            url: url.to_string(),
        })
    })
}
