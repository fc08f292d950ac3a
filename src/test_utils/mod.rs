//! Test utilities for gvend
//!
//! Helpers shared by unit and integration tests: a throwaway Go workspace
//! with its own GOROOT and GOPATH, a thin git wrapper for building fixture
//! repositories, and one-time logging setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use gvend_cli::test_utils::GoWorkspace;
//!
//! let ws = GoWorkspace::new().unwrap();
//! ws.write_go("co1/pk1", "main.go", "package main\n\nimport \"co2/pk1\"\n").unwrap();
//! ws.write_go("co2/pk1", "pk1.go", "package pk1\n").unwrap();
//! let ctx = ws.init_project("co1/pk1").unwrap();
//! assert_eq!(ctx.root_import, "co1/pk1");
//! ```

pub mod git_helper;
pub mod workspace;

pub use git_helper::TestGit;
pub use workspace::GoWorkspace;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None` the `RUST_LOG` variable
/// decides; when it is unset tests stay silent.
///
/// ```bash
/// RUST_LOG=gvend_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
