//! A temporary Go workspace for tests.

use crate::config::GoEnv;
use crate::constants::DEFAULT_IGNORE;
use crate::context::Context;
use crate::utils::fs::import_to_path;
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Standard library packages created in every workspace GOROOT.
const FAKE_STD: &[(&str, &str)] = &[
    ("fmt", "package fmt\n\nimport \"io\"\n"),
    ("io", "package io\n"),
    ("os", "package os\n"),
    ("strings", "package strings\n"),
];

/// A temp dir laid out as `goroot/` plus a single `gopath/`.
///
/// The directory is deleted when the workspace is dropped.
pub struct GoWorkspace {
    temp: TempDir,
}

impl GoWorkspace {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp workspace")?;
        let ws = Self { temp };
        for (import, content) in FAKE_STD {
            let file = format!("{}.go", import.rsplit('/').next().unwrap_or(import));
            ws.write_file(&ws.goroot_src(), import, &file, content)?;
        }
        fs::create_dir_all(ws.gopath_src())?;
        Ok(ws)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn goroot(&self) -> PathBuf {
        self.path().join("goroot")
    }

    pub fn gopath(&self) -> PathBuf {
        self.path().join("gopath")
    }

    pub fn goroot_src(&self) -> PathBuf {
        self.goroot().join("src")
    }

    pub fn gopath_src(&self) -> PathBuf {
        self.gopath().join("src")
    }

    /// Environment pointing at this workspace only.
    pub fn env(&self) -> GoEnv {
        GoEnv::new(self.goroot(), vec![self.gopath()])
    }

    /// Directory of `import` under the GOPATH.
    pub fn dir(&self, import: &str) -> PathBuf {
        import_to_path(&self.gopath_src(), import)
    }

    /// Write a Go source file into the package at `import`.
    pub fn write_go(&self, import: &str, file: &str, content: &str) -> Result<PathBuf> {
        self.write_file(&self.gopath_src(), import, file, content)
    }

    /// Write any file into the directory of `import`.
    pub fn write_file(&self, src: &Path, import: &str, file: &str, content: &str) -> Result<PathBuf> {
        let dir = import_to_path(src, import);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(file);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, import: &str, file: &str) -> Result<String> {
        let path = self.dir(import).join(file);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Initialize a manifest for the project at `import` and open it.
    pub fn init_project(&self, import: &str) -> Result<Context> {
        Context::init(self.env(), &self.dir(import), DEFAULT_IGNORE)
    }

    /// Open an already initialized project at `import`.
    pub fn open_project(&self, import: &str) -> Result<Context> {
        Context::open(self.env(), &self.dir(import))
    }
}
