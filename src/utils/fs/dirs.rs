//! Directory operations for creating, inspecting, and removing directories.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Returns an error if the path exists but is not a directory, or creation fails.
///
/// # Examples
///
/// ```rust,no_run
/// use gvend_cli::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("vendor/github.com/pkg/errors"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Recursively removes a directory and all its contents.
///
/// Missing directories are not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Returns true when the directory holds at least one `.go` file.
#[must_use]
pub fn has_go_files(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        name.ends_with(".go")
            && !name.starts_with('.')
            && entry.file_type().map(|t| t.is_file()).unwrap_or(false)
    })
}

/// Removes `dir` and then each parent that is left empty, stopping at `stop`.
///
/// `stop` itself is never removed. Non-empty directories end the walk.
pub fn remove_empty_parents(dir: &Path, stop: &Path) -> Result<()> {
    let mut current = dir.to_path_buf();
    while current.starts_with(stop) && current != stop {
        let is_empty = match fs::read_dir(&current) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !current.pop() {
                    break;
                }
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", current.display()));
            }
        };
        if !is_empty {
            break;
        }
        fs::remove_dir(&current)
            .with_context(|| format!("Failed to remove directory: {}", current.display()))?;
        if !current.pop() {
            break;
        }
    }
    Ok(())
}
