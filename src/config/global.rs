//! Global configuration file management.
//!
//! The optional global configuration lives at `~/.gvend/config.toml`
//! (`%LOCALAPPDATA%\gvend\config.toml` on Windows). It carries user-wide
//! defaults that do not belong in a project's vendor manifest.
//!
//! ```toml
//! # Build tags written into new manifests by `gvend init`
//! ignore = "test appengine"
//!
//! # Allow plain HTTP during remote import-path discovery
//! insecure = false
//!
//! # Iteration ceiling for resolver fixpoint loops
//! loop-limit = 10000
//!
//! # Import-path prefixes mapped straight to repository URLs
//! [hosts]
//! "git.example.com/team" = "https://git.example.com/team"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_IGNORE, DEFAULT_LOOP_LIMIT};
use crate::utils::fs::safe_write;

fn default_ignore() -> String {
    DEFAULT_IGNORE.to_string()
}

const fn default_loop_limit() -> usize {
    DEFAULT_LOOP_LIMIT
}

fn is_default_ignore(ignore: &String) -> bool {
    ignore == DEFAULT_IGNORE
}

const fn is_default_loop_limit(limit: &usize) -> bool {
    *limit == DEFAULT_LOOP_LIMIT
}

/// User-wide gvend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Ignore string written into new manifests.
    #[serde(default = "default_ignore", skip_serializing_if = "is_default_ignore")]
    pub ignore: String,

    /// Whether remote discovery may fall back to plain HTTP.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure: bool,

    /// Iteration ceiling for resolver loops.
    #[serde(default = "default_loop_limit", skip_serializing_if = "is_default_loop_limit")]
    pub loop_limit: usize,

    /// Import-path prefix to repository URL overrides used by fetch.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hosts: BTreeMap<String, String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            insecure: false,
            loop_limit: default_loop_limit(),
            hosts: BTreeMap::new(),
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_with_optional(None)
    }

    /// Load from `path` if given, otherwise from the default location.
    pub fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a specific configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Write the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;
        safe_write(path, &content)
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// Platform-specific default config path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("gvend")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".gvend")
        };

        Ok(config_dir.join("config.toml"))
    }
}
