//! Global constants used throughout the gvend codebase.
//!
//! This module contains file names, loop ceilings, timeouts and other values
//! that are used across multiple modules. Defining them centrally keeps magic
//! numbers discoverable.

use std::time::Duration;

/// Name of the folder holding vendored packages inside the project root.
pub const VENDOR_FOLDER: &str = "vendor";

/// File name of the vendor manifest, stored inside [`VENDOR_FOLDER`].
pub const MANIFEST_FILE: &str = "vendor.json";

/// Lock file held while a mutating command runs.
pub const LOCK_FILE: &str = ".gvend.lock";

/// Default iteration ceiling for every fixpoint and worklist loop.
///
/// Resolution of a real project converges in far fewer iterations; hitting this
/// value means the resolver is cycling and surfaces as
/// [`crate::core::VendorError::InternalLoopLimit`].
pub const DEFAULT_LOOP_LIMIT: usize = 10_000;

/// Maximum number of fetch/copy rounds before giving up on a fetch chain.
pub const FETCH_LOOP_LIMIT: usize = 1_000;

/// Placeholder checksum recorded when a dirty working tree is copied.
pub const UNCOMMITTED_CHECKSUM: &str = "uncommitted";

/// Build tags ignored by default in a freshly initialised manifest.
pub const DEFAULT_IGNORE: &str = "test";

/// Timeout for remote import-path discovery requests.
pub const META_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Import paths that are always treated as part of the standard library.
pub const RESERVED_STD_PATHS: &[&str] = &["C", "appengine", "appengine_internal"];

/// Files whose name starts with one of these (case-insensitive) are copied as
/// legal notices when a package is vendored.
pub const LICENSE_PREFIXES: &[&str] =
    &["license", "licence", "copying", "unlicense", "copyright", "copyleft", "legal", "notice", "disclaimer", "patent", "third-party", "thirdparty"];
