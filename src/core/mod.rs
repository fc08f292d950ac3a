//! Core types shared by every gvend module.
//!
//! Currently this is the error layer: the typed [`VendorError`] enum used by the
//! vendoring engine and the [`ErrorContext`] wrapper the CLI prints.

pub mod error;

pub use error::{ErrorContext, VendorError, user_friendly_error};
