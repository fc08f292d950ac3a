//! Migration from godep.

use super::{move_tree, record_vendored};
use crate::context::Context;
use crate::core::VendorError;
use crate::utils::fs::remove_dir_all;
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Godeps {
    #[serde(default)]
    import_path: String,
    #[serde(default)]
    deps: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Dependency {
    import_path: String,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    rev: String,
}

pub(super) fn migrate(ctx: &mut Context) -> Result<()> {
    let godeps_dir = ctx.root_dir.join("Godeps");
    let file = godeps_dir.join("Godeps.json");
    let content = fs::read_to_string(&file).map_err(|_| VendorError::MissingManifest {
        path: file.display().to_string(),
    })?;
    let godeps: Godeps = serde_json::from_str(&content).map_err(|e| VendorError::ManifestParseError {
        file: file.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::info!("Migrating {} godep dependencies of {}", godeps.deps.len(), godeps.import_path);

    let workspace = godeps_dir.join("_workspace").join("src");
    if workspace.is_dir() {
        let vendor_dir = ctx.vendor_dir();
        for entry in fs::read_dir(&workspace).with_context(|| format!("Failed to read {}", workspace.display()))? {
            let entry = entry?;
            move_tree(&entry.path(), &vendor_dir.join(entry.file_name()))?;
        }
    }

    for dep in &godeps.deps {
        let local = ctx.vendor_local(&dep.import_path);
        let record = ctx.manifest.upsert(&dep.import_path);
        record.local = local;
        record.revision.clone_from(&dep.rev);
        record.comment.clone_from(&dep.comment);
    }
    record_vendored(ctx)?;

    ctx.rewrite_rules.insert(format!("{}/Godeps/_workspace/src", ctx.root_import), String::new());
    remove_dir_all(&godeps_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_godeps() {
        let json = r#"{
            "ImportPath": "co1/pk1",
            "GoVersion": "go1.6",
            "Deps": [
                {"ImportPath": "co2/pk1", "Comment": "v1.0.0", "Rev": "abc123"},
                {"ImportPath": "co3/pk1", "Rev": "def456"}
            ]
        }"#;
        let godeps: Godeps = serde_json::from_str(json).unwrap();
        assert_eq!(godeps.import_path, "co1/pk1");
        assert_eq!(godeps.deps.len(), 2);
        assert_eq!(godeps.deps[0].comment, "v1.0.0");
        assert_eq!(godeps.deps[1].rev, "def456");
    }
}
