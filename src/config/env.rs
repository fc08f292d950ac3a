//! Go toolchain environment: GOROOT, GOPATH, GOOS and GOARCH.
//!
//! The engine never reads process environment directly; a [`GoEnv`] is built
//! once by the CLI (or by tests) and injected into the vendoring context.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Go environment the resolver searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoEnv {
    /// GOROOT directory (the standard library lives in `goroot/src`).
    pub goroot: PathBuf,
    /// GOPATH entries in search order.
    pub gopath: Vec<PathBuf>,
    /// Target operating system.
    pub goos: String,
    /// Target architecture.
    pub goarch: String,
}

impl GoEnv {
    /// Build an environment with explicit paths and host OS/arch.
    pub fn new(goroot: impl Into<PathBuf>, gopath: Vec<PathBuf>) -> Self {
        Self {
            goroot: goroot.into(),
            gopath,
            goos: host_goos().to_string(),
            goarch: host_goarch().to_string(),
        }
    }

    /// Read the environment of the current process.
    ///
    /// `GOPATH` entries are expanded with `~` and `$VAR` substitution and
    /// default to `$HOME/go`. `GOROOT` falls back to `go env GOROOT` and then
    /// to `/usr/local/go`.
    pub fn from_env() -> Result<Self> {
        let gopath = match std::env::var_os("GOPATH") {
            Some(raw) if !raw.is_empty() => {
                let mut entries = Vec::new();
                for entry in std::env::split_paths(&raw) {
                    let text = entry.to_string_lossy();
                    let expanded = shellexpand::full(&text)
                        .with_context(|| format!("Failed to expand GOPATH entry '{text}'"))?;
                    entries.push(PathBuf::from(expanded.as_ref()));
                }
                entries
            }
            _ => {
                let home = dirs::home_dir()
                    .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
                vec![home.join("go")]
            }
        };

        let goroot = match std::env::var_os("GOROOT") {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => detect_goroot().unwrap_or_else(|| PathBuf::from("/usr/local/go")),
        };

        let goos = std::env::var("GOOS").unwrap_or_else(|_| host_goos().to_string());
        let goarch = std::env::var("GOARCH").unwrap_or_else(|_| host_goarch().to_string());

        tracing::debug!(
            "Go environment: GOROOT={} GOPATH={:?} GOOS={} GOARCH={}",
            goroot.display(),
            gopath,
            goos,
            goarch
        );

        Ok(Self {
            goroot,
            gopath,
            goos,
            goarch,
        })
    }

    /// `GOROOT/src`.
    #[must_use]
    pub fn goroot_src(&self) -> PathBuf {
        self.goroot.join("src")
    }

    /// `src` directory of every GOPATH entry, in search order.
    #[must_use]
    pub fn gopath_srcs(&self) -> Vec<PathBuf> {
        self.gopath.iter().map(|p| p.join("src")).collect()
    }

    /// The GOPATH `src` directory containing `dir`, if any.
    #[must_use]
    pub fn gopath_src_for(&self, dir: &Path) -> Option<PathBuf> {
        self.gopath_srcs().into_iter().find(|src| dir.starts_with(src))
    }
}

fn detect_goroot() -> Option<PathBuf> {
    let go = which::which("go").ok()?;
    let output = Command::new(go).args(["env", "GOROOT"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() { None } else { Some(PathBuf::from(root)) }
}

/// Host operating system in GOOS spelling.
#[must_use]
pub fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Host architecture in GOARCH spelling.
#[must_use]
pub fn host_goarch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        other => other,
    }
}
