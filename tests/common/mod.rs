//! Shared helpers for the gvend integration tests.

// Not every test module uses every helper.
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use gvend_cli::context::Context;
use gvend_cli::test_utils::{GoWorkspace, init_test_logging};
use gvend_cli::vcs::VcsChain;
use std::path::PathBuf;

/// Import path of the project every test vendors into.
pub const PROJECT: &str = "co1/pk1";

/// A Go workspace holding the `co1/pk1` project.
pub struct TestProject {
    pub ws: GoWorkspace,
}

impl TestProject {
    /// A project whose main package imports `imports`.
    pub fn new(imports: &[&str]) -> Result<Self> {
        init_test_logging(None);
        let ws = GoWorkspace::new()?;
        ws.write_go(PROJECT, "main.go", &main_source(imports))?;
        Ok(Self { ws })
    }

    pub fn root(&self) -> PathBuf {
        self.ws.dir(PROJECT)
    }

    pub fn vendor(&self) -> PathBuf {
        self.root().join("vendor")
    }

    /// Write a library package at `import` that imports `imports`.
    pub fn library(&self, import: &str, imports: &[&str]) -> Result<()> {
        let name = import.rsplit('/').next().unwrap_or(import);
        self.ws.write_go(import, &format!("{name}.go"), &package_source(name, imports))?;
        Ok(())
    }

    /// Replace the imports of the project's main package.
    pub fn set_imports(&self, imports: &[&str]) -> Result<()> {
        self.ws.write_go(PROJECT, "main.go", &main_source(imports))?;
        Ok(())
    }

    /// Initialize the manifest and open a session without VCS backends.
    pub fn context(&self) -> Result<Context> {
        let mut ctx = self.ws.init_project(PROJECT)?;
        ctx.vcs = VcsChain::empty();
        Ok(ctx)
    }

    /// `gvend` running in the project root against this workspace only.
    pub fn gvend(&self) -> Command {
        let mut cmd = Command::cargo_bin("gvend").expect("gvend binary");
        cmd.current_dir(self.root())
            .env("GOPATH", self.ws.gopath())
            .env("GOROOT", self.ws.goroot())
            .env("HOME", self.ws.path().join("home"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

pub fn package_source(name: &str, imports: &[&str]) -> String {
    let mut source = format!("package {name}\n");
    if !imports.is_empty() {
        source.push_str("\nimport (\n");
        for import in imports {
            source.push_str(&format!("\t\"{import}\"\n"));
        }
        source.push_str(")\n");
    }
    source
}

pub fn main_source(imports: &[&str]) -> String {
    format!("{}\nfunc main() {{}}\n", package_source("main", imports))
}
