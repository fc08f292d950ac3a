//! gvend - vendoring for Go projects
//!
//! gvend copies the external packages a Go project imports into the
//! project's `vendor/` folder and records where each came from, at which
//! revision, and with which content hash, in `vendor/vendor.json`.
//!
//! # Architecture Overview
//!
//! A command opens a [`context::Context`] for the project and drives it
//! through fixed phases:
//!
//! 1. **Resolve**: walk the project, parse every Go file header, and follow
//!    imports through `vendor/` folders, the project, GOROOT and GOPATH,
//!    building a graph of packages with a status each
//! 2. **Plan**: turn package specifiers (`path/...`, `path::origin`,
//!    `path@v1`) or status selectors (`+external`) into operations
//! 3. **Check**: group operations writing the same destination into
//!    conflicts and settle them
//! 4. **Alter**: fetch, copy and remove, strip import comments and apply
//!    rename rules, then save the manifest
//!
//! # Core Modules
//!
//! - [`context`] - the session, package graph, resolver, planner and copy engine
//! - [`manifest`] - `vendor/vendor.json` records
//! - [`gosrc`] - Go source header parser and import rewriter
//! - [`tags`] - build constraint evaluation
//! - [`version`] - matching `@version` requests against branches and tags
//! - [`vcs`] - git, hg, bzr and svn backends and remote repository discovery
//! - [`migrate`] - conversion from godep and `internal/` layouts
//!
//! ## Supporting Modules
//!
//! - [`cli`] - the `gvend` command line
//! - [`config`] - Go environment and the global config file
//! - [`core`] - error types and user-facing error reporting
//! - [`pkgspec`] - package specifier parsing
//! - [`utils`] - atomic writes, path helpers and the project lock
//!
//! # Example
//!
//! ```rust,no_run
//! use gvend_cli::config::GoEnv;
//! use gvend_cli::context::{Context, ModifyKind, ModifyOptions};
//! use gvend_cli::pkgspec::PkgSpec;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let env = GoEnv::from_env()?;
//! let mut ctx = Context::open(env, Path::new("."))?;
//! let spec = PkgSpec::parse("github.com/pkg/errors", None)?;
//! ctx.modify(&spec, ModifyKind::Add, ModifyOptions::default())?;
//! ctx.alter()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod core;
pub mod gosrc;
pub mod manifest;
pub mod migrate;
pub mod pkgspec;
pub mod tags;
pub mod utils;
pub mod vcs;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
