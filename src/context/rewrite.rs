//! Rewriting import paths in project sources.
//!
//! Two things trigger a rewrite: rename rules (`old/prefix` to `new/prefix`,
//! added when migrating from another layout) and freshly vendored packages,
//! whose `// import "..."` comments must go because the Go tool rejects them
//! inside a vendor folder.

use super::Context;
use super::status::Location;
use crate::gosrc::{parse_header, rewrite_source};
use crate::utils::fs::{atomic_write, has_path_prefix};
use anyhow::{Context as _, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

/// Apply the longest matching rule to `path`. An empty replacement drops the
/// prefix entirely.
fn apply_rules(rules: &BTreeMap<String, String>, path: &str) -> Option<String> {
    let (old, new) = rules
        .iter()
        .filter(|(old, _)| has_path_prefix(path, old))
        .max_by_key(|(old, _)| old.len())?;
    let rest = &path[old.len()..];
    if new.is_empty() {
        let rest = rest.trim_start_matches('/');
        return (!rest.is_empty()).then(|| rest.to_string());
    }
    Some(format!("{new}{rest}"))
}

impl Context {
    /// Rewrite project files. Returns how many files changed.
    pub(crate) fn rewrite_imports(&mut self) -> Result<usize> {
        let rules = self.rewrite_rules.clone();
        let stripped: BTreeSet<String> = std::mem::take(&mut self.stripped).into_iter().collect();

        let mut targets: BTreeMap<PathBuf, bool> = BTreeMap::new();
        for pkg in self.packages.values() {
            if matches!(pkg.status.location, Location::Standard | Location::NotFound | Location::External)
                || !pkg.dir.starts_with(&self.root_dir)
            {
                continue;
            }
            let strip = stripped.contains(&pkg.local);
            let refers_changed = pkg.resolved.values().any(|t| stripped.contains(t));
            for file in &pkg.files {
                let renamed = file.imports.iter().any(|i| apply_rules(&rules, i).is_some());
                if strip || renamed || refers_changed {
                    let entry = targets.entry(file.path.clone()).or_insert(false);
                    *entry |= strip;
                }
            }
        }

        let mut count = 0;
        for (path, strip) in targets {
            let source =
                fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            let header = match parse_header(&source) {
                Ok(header) => header,
                Err(e) => {
                    tracing::warn!("Not rewriting {}: {e:#}", path.display());
                    continue;
                }
            };
            if let Some(updated) = rewrite_source(&source, &header, |p| apply_rules(&rules, p), strip) {
                if updated != source {
                    atomic_write(&path, updated.as_bytes())?;
                    tracing::debug!("Rewrote {}", path.display());
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GoEnv;
    use crate::manifest::Manifest;

    #[test]
    fn test_apply_rules_longest_prefix() {
        let mut rules = BTreeMap::new();
        rules.insert("co1/pk1/Godeps/_workspace/src".to_string(), String::new());
        rules.insert("co1/pk1/internal".to_string(), "co1/pk1/vendor".to_string());
        rules.insert("co1/pk1/internal/co2".to_string(), "co2".to_string());

        assert_eq!(apply_rules(&rules, "co1/pk1/internal/co2/pk1").as_deref(), Some("co2/pk1"));
        assert_eq!(apply_rules(&rules, "co1/pk1/internal/x").as_deref(), Some("co1/pk1/vendor/x"));
        assert_eq!(apply_rules(&rules, "co1/pk1/internalx"), None);
        assert_eq!(apply_rules(&rules, "co1/pk1/Godeps/_workspace/src/co3/x").as_deref(), Some("co3/x"));
    }

    #[test]
    fn test_rewrite_imports_in_project() {
        let temp = tempfile::tempdir().unwrap();
        let gopath = temp.path().join("gopath");
        let root = gopath.join("src/co1/pk1");
        fs::create_dir_all(root.join("internal/co2/pk1")).unwrap();
        fs::write(root.join("main.go"), "package main\n\nimport \"co1/pk1/internal/co2/pk1\"\n").unwrap();
        fs::write(root.join("internal/co2/pk1/pk1.go"), "package pk1\n").unwrap();

        let env = GoEnv::new(temp.path().join("goroot"), vec![gopath]);
        let mut ctx = Context::new(env, &root, Manifest::new("")).unwrap();
        ctx.load_packages().unwrap();
        ctx.rewrite_rules.insert("co1/pk1/internal".to_string(), String::new());

        assert_eq!(ctx.rewrite_imports().unwrap(), 1);
        let main = fs::read_to_string(root.join("main.go")).unwrap();
        assert_eq!(main, "package main\n\nimport \"co2/pk1\"\n");
    }
}
