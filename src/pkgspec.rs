//! Package specifiers.
//!
//! ```text
//! path[/...|/^][::origin][@[=]version]
//! ```
//!
//! - `/...` matches every known package below `path`
//! - `/^` vendors `path` with its whole subtree
//! - `::origin` copies the package from another import path
//! - `@version` selects a revision through the label matcher
//!
//! Paths starting with `.` are relative to the import path of the working
//! directory.

use crate::core::VendorError;
use crate::version::VersionRequest;
use anyhow::Result;
use std::fmt;

const MATCH_TREE_SUFFIX: &str = "/...";
const INCLUDE_TREE_SUFFIX: &str = "/^";

/// A parsed package specifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PkgSpec {
    pub path: String,
    /// Import path to copy from; empty when the path itself is the source.
    pub origin: String,
    /// `None` when no `@` was given.
    pub version: Option<VersionRequest>,
    pub match_tree: bool,
    pub include_tree: bool,
}

fn invalid(spec: &str, reason: &str) -> anyhow::Error {
    VendorError::InvalidSpecifier {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl PkgSpec {
    /// Parse a specifier. `cwd_import` is the import path of the working
    /// directory, used for relative paths.
    pub fn parse(text: &str, cwd_import: Option<&str>) -> Result<Self> {
        let raw = text.trim().replace('\\', "/");
        let mut spec = Self::default();

        let rest = match raw.split_once('@') {
            Some((rest, version)) => {
                if version.contains('@') || version.chars().any(char::is_whitespace) {
                    return Err(invalid(text, "malformed version"));
                }
                if version == "=" {
                    return Err(invalid(text, "empty exact version"));
                }
                spec.version = Some(VersionRequest::parse(version));
                rest
            }
            None => raw.as_str(),
        };

        let mut path = match rest.split_once("::") {
            Some((path, origin)) => {
                let origin = origin.trim_end_matches('/');
                if origin.is_empty() {
                    return Err(invalid(text, "empty origin"));
                }
                spec.origin = origin.to_string();
                path
            }
            None => rest,
        };

        path = path.trim_end_matches('/');
        if let Some(stripped) = path.strip_suffix(MATCH_TREE_SUFFIX) {
            spec.match_tree = true;
            path = stripped;
        } else if path == "..." {
            spec.match_tree = true;
            path = ".";
        } else if let Some(stripped) = path.strip_suffix(INCLUDE_TREE_SUFFIX) {
            spec.include_tree = true;
            path = stripped;
        }

        let path = path.trim_end_matches('/');
        spec.path = if path == "." || path.starts_with("./") || path == ".." || path.starts_with("../") {
            let Some(base) = cwd_import else {
                return Err(invalid(text, "relative path outside a GOPATH"));
            };
            join_relative(base, path).ok_or_else(|| invalid(text, "relative path escapes root"))?
        } else {
            path.to_string()
        };

        if spec.path.is_empty() {
            return Err(invalid(text, "empty path"));
        }
        Ok(spec)
    }

    /// The import path to copy from.
    #[must_use]
    pub fn source(&self) -> &str {
        if self.origin.is_empty() { &self.path } else { &self.origin }
    }

    #[must_use]
    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }
}

fn join_relative(base: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for element in rel.split('/') {
        match element {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

impl fmt::Display for PkgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.match_tree {
            f.write_str(MATCH_TREE_SUFFIX)?;
        } else if self.include_tree {
            f.write_str(INCLUDE_TREE_SUFFIX)?;
        }
        if !self.origin.is_empty() {
            write!(f, "::{}", self.origin)?;
        }
        if let Some(version) = &self.version {
            write!(f, "@{}", version.as_spec())?;
        }
        Ok(())
    }
}
