//! Integration test suite for gvend
//!
//! End-to-end tests over a throwaway GOROOT and GOPATH. Most tests drive the
//! library API; `cli` runs the binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **vendor_flow**: add, update, remove and the manifest they leave behind
//! - **unused**: unused detection and cleanup
//! - **conflicts**: several sources for one vendored path
//! - **checksum**: verify and status against modified vendor folders
//! - **build_tags**: ignored tags and excluded prefixes
//! - **migrate**: godep and internal layouts
//! - **fetch**: fetching tagged versions from a local git repository
//! - **uncommitted**: copying from a git working tree with local edits
//! - **cli**: the `gvend` binary

#[path = "../common/mod.rs"]
mod common;

mod build_tags;
mod checksum;
mod cli;
mod conflicts;
mod fetch;
mod migrate;
mod uncommitted;
mod unused;
mod vendor_flow;
