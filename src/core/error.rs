//! Error handling for gvend
//!
//! This module provides the typed error enum used by the vendoring core and the
//! user-friendly reporting layer used by the CLI. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so callers can match on the failure kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Resolution**: [`VendorError::NotFoundInSearchPath`], [`VendorError::NotInGopath`]
//! - **Manifest**: [`VendorError::MissingManifest`], [`VendorError::ManifestParseError`]
//! - **Planning**: [`VendorError::TreeChildren`], [`VendorError::TreeParents`],
//!   [`VendorError::PackageAlreadyExists`], [`VendorError::DirtyWorkingTree`],
//!   [`VendorError::InvalidSpecifier`], [`VendorError::UnresolvedConflict`]
//! - **Verification**: [`VendorError::ChecksumMismatch`]
//! - **Internal**: [`VendorError::InternalLoopLimit`], [`VendorError::FetchLoopLimit`]
//!
//! Operations in the core return [`anyhow::Result`] and attach path context with
//! `.with_context(...)`. Typed errors survive the trip and can be recovered with
//! `downcast_ref::<VendorError>()`, which is what [`user_friendly_error`] does.
//!
//! # Examples
//!
//! ```rust,no_run
//! use gvend_cli::core::{VendorError, ErrorContext};
//!
//! let context = ErrorContext::new(VendorError::MissingManifest {
//!     path: "vendor/vendor.json".to_string(),
//! })
//! .with_suggestion("Run 'gvend init' first");
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The main error type for vendoring operations.
///
/// Each variant names one failure mode. Variants that concern several packages
/// carry the full list so the CLI can report every offender at once.
#[derive(Error, Debug, Clone)]
pub enum VendorError {
    /// A requested package could not be located in GOROOT, GOPATH or the project.
    #[error("Package '{path}' not found in any search path")]
    NotFoundInSearchPath {
        /// Import path that was searched for
        path: String,
    },

    /// The project directory is not inside a GOPATH and the manifest declares no root path.
    #[error("Directory '{dir}' is not inside any GOPATH and no rootPath is set")]
    NotInGopath {
        /// The directory that was examined
        dir: String,
    },

    /// The vendor manifest does not exist.
    #[error("Vendor manifest not found: {path}")]
    MissingManifest {
        /// Expected manifest location
        path: String,
    },

    /// The vendor manifest exists but cannot be decoded.
    #[error("Invalid vendor manifest {file}: {reason}")]
    ManifestParseError {
        /// Path to the manifest
        file: String,
        /// Decoder message
        reason: String,
    },

    /// The source working tree has uncommitted changes.
    #[error("Working tree for '{path}' has uncommitted changes")]
    DirtyWorkingTree {
        /// Import path of the package being copied
        path: String,
    },

    /// A tree package would contain packages that are vendored on their own.
    #[error("Tree package '{path}' has vendored child packages: {}", .children.join(", "))]
    TreeChildren {
        /// The tree package
        path: String,
        /// Vendored packages below it
        children: Vec<String>,
    },

    /// A package would be nested under a package vendored as a tree.
    #[error("Package '{path}' is nested under tree packages: {}", .parents.join(", "))]
    TreeParents {
        /// The package being modified
        path: String,
        /// Tree packages above it
        parents: Vec<String>,
    },

    /// The destination already holds a copy of the package.
    #[error("Package '{path}' already exists in the vendor folder")]
    PackageAlreadyExists {
        /// Canonical path of the package
        path: String,
    },

    /// Update or remove was requested for a package that is not vendored.
    #[error("Package '{path}' is not vendored")]
    PackageNotVendored {
        /// Canonical path of the package
        path: String,
    },

    /// Vendored packages no longer match the recorded checksum.
    #[error("Vendored packages are out of date: {}", .paths.join(", "))]
    ChecksumMismatch {
        /// Canonical paths whose hash differs or is missing
        paths: Vec<String>,
    },

    /// Two or more operations target the same destination and nothing picked a winner.
    #[error("Unresolved conflicts: {}", describe_conflicts(.conflicts))]
    UnresolvedConflict {
        /// Canonical path and the candidate origins for each conflict
        conflicts: Vec<(String, Vec<String>)>,
    },

    /// A package specifier could not be parsed.
    #[error("Invalid package specifier '{spec}': {reason}")]
    InvalidSpecifier {
        /// The raw specifier text
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// A removal targeted a path outside the vendor folder.
    #[error("Refusing to remove '{path}': not inside the vendor folder")]
    RemoveOutsideVendor {
        /// The offending directory
        path: String,
    },

    /// A fixpoint loop exceeded its iteration ceiling.
    #[error("Internal loop limit of {limit} reached while {phase}; please report this as a bug")]
    InternalLoopLimit {
        /// Name of the loop that ran away
        phase: String,
        /// The ceiling that was hit
        limit: usize,
    },

    /// Fetching kept discovering new packages to download.
    #[error("Fetch loop limit of {limit} reached")]
    FetchLoopLimit {
        /// The ceiling that was hit
        limit: usize,
    },

    /// No VCS backend recognised a repository.
    #[error("No version control system found for '{path}'")]
    UnknownVcs {
        /// Directory or import path examined
        path: String,
    },

    /// A VCS command returned a non-zero exit code.
    #[error("{vcs} {operation} failed")]
    VcsCommandError {
        /// Backend name (git, hg, bzr, svn)
        vcs: String,
        /// The sub-command that failed
        operation: String,
        /// Captured stderr
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(Arc<std::io::Error>),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl From<std::io::Error> for VendorError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(Arc::new(error))
    }
}

fn describe_conflicts(conflicts: &[(String, Vec<String>)]) -> String {
    conflicts
        .iter()
        .map(|(path, origins)| format!("{path} <- [{}]", origins.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error wrapper that adds user-facing suggestions and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: VendorError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: VendorError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Typed [`VendorError`]s anywhere in the chain get a tailored suggestion; IO
/// errors are mapped by kind; everything else keeps its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(vendor_error) = error.chain().find_map(|e| e.downcast_ref::<VendorError>()) {
        return create_error_context(vendor_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(VendorError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check ownership and permissions of the project and GOPATH directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(VendorError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(VendorError::Other {
        message,
    })
}

fn create_error_context(error: VendorError) -> ErrorContext {
    match &error {
        VendorError::NotFoundInSearchPath { path } => {
            let details = format!("'{path}' is not in GOROOT, any GOPATH entry, or the project tree");
            ErrorContext::new(error)
                .with_suggestion("Download it with 'gvend fetch <path>' or 'go get', or check the spelling")
                .with_details(details)
        }
        VendorError::NotInGopath { .. } => ErrorContext::new(error)
            .with_suggestion("Move the project under $GOPATH/src or set \"rootPath\" in vendor/vendor.json")
            .with_details("The project import path is derived from its location inside GOPATH"),
        VendorError::MissingManifest { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'gvend init' in the project root to create vendor/vendor.json"),
        VendorError::DirtyWorkingTree { .. } => ErrorContext::new(error)
            .with_suggestion("Commit the changes first, or pass --uncommitted to copy them anyway")
            .with_details("Uncommitted copies are recorded with a placeholder checksum"),
        VendorError::TreeChildren { .. } => ErrorContext::new(error)
            .with_suggestion("Remove the child packages from the vendor folder before adding the tree"),
        VendorError::TreeParents { .. } => ErrorContext::new(error)
            .with_suggestion("The parent tree already includes this package; update the parent instead"),
        VendorError::PackageAlreadyExists { .. } => ErrorContext::new(error)
            .with_suggestion("Use 'gvend update' to refresh an existing vendored package"),
        VendorError::ChecksumMismatch { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'gvend sync' to restore the recorded revisions")
            .with_details("The vendored files differ from the checksum recorded in vendor/vendor.json"),
        VendorError::UnresolvedConflict { .. } => ErrorContext::new(error)
            .with_suggestion("Pick an origin with '::origin', or rerun with --short or --long")
            .with_details("No operations were applied"),
        VendorError::InternalLoopLimit { .. } => ErrorContext::new(error)
            .with_details("This indicates a bug in the resolver, not a problem with your project"),
        VendorError::VcsCommandError { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Check that the VCS tool is installed and the repository is reachable")
                .with_details(details)
        }
        _ => ErrorContext::new(error),
    }
}
