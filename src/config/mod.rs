//! Configuration: the Go environment and the optional global config file.
//!
//! Project-level settings (ignored build tags, excluded packages, the project
//! root path) live in the vendor manifest, see [`crate::manifest`].

mod env;
mod global;

pub use env::{GoEnv, host_goarch, host_goos};
pub use global::GlobalConfig;
