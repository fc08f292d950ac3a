//! File system utilities used by the vendoring engine.
//!
//! # Key Features
//!
//! - **Atomic operations**: Files are written via temp-and-rename so a crash
//!   cannot corrupt a previously valid file
//! - **Import path bridging**: Conversions between slash-separated import paths
//!   and platform paths
//! - **Cleanup helpers**: Removal of emptied vendor directories
//!
//! # Examples
//!
//! ```rust,no_run
//! use gvend_cli::utils::fs::{ensure_dir, safe_write, import_to_path};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let dir = import_to_path(Path::new("vendor"), "github.com/pkg/errors");
//! ensure_dir(&dir)?;
//! safe_write(&dir.join("doc.go"), "package errors\n")?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod paths;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, has_go_files, remove_dir_all, remove_empty_parents};
pub use paths::{find_upward, has_path_prefix, import_to_path, normalize_path, path_to_import};
