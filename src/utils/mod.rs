//! Cross-cutting utilities: filesystem helpers and the project lock.

pub mod fs;
pub mod lock;

pub use fs::{atomic_write, ensure_dir, normalize_path, safe_write};
pub use lock::ProjectLock;
