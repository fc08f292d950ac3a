//! Version requests and label matching.
//!
//! A package specifier may carry `@version`. The version is matched against
//! the branch and tag names of the package's repository by
//! [`find_label`]; when no label matches, the fetcher treats the version as a
//! raw revision.
//!
//! - `@v1` picks the best label starting with `v1` followed by `.` or `-`
//! - `@=v1.2` picks the label named exactly `v1.2`
//! - a bare `@` means the latest revision of the default branch

mod label;

pub use label::{Label, LabelSource, compare_labels, find_label};

/// Parsed `@version` part of a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    /// Latest revision on the default branch.
    Latest,
    /// Best label matching the prefix.
    Prefix(String),
    /// Label with exactly this name.
    Exact(String),
}

impl VersionRequest {
    /// Parse the text after `@`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            Self::Latest
        } else if let Some(exact) = text.strip_prefix('=') {
            Self::Exact(exact.to_string())
        } else {
            Self::Prefix(text.to_string())
        }
    }

    /// The version text as written in a specifier, without `@`.
    #[must_use]
    pub fn as_spec(&self) -> String {
        match self {
            Self::Latest => String::new(),
            Self::Prefix(p) => p.clone(),
            Self::Exact(e) => format!("={e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_request() {
        assert_eq!(VersionRequest::parse(""), VersionRequest::Latest);
        assert_eq!(VersionRequest::parse("v1"), VersionRequest::Prefix("v1".into()));
        assert_eq!(VersionRequest::parse("=v1.2"), VersionRequest::Exact("v1.2".into()));
        assert_eq!(VersionRequest::parse("=v1.2").as_spec(), "=v1.2");
    }
}
