//! Handoff native layer - C-ABI entry points that allocate and release
//!
//! Every entry point either hands back a fully populated allocation or the
//! null sentinel. Every allocation shape has exactly one matching release
//! function, and every release function treats null as a no-op.
//!
//! # Safety
//!
//! All exported functions are `unsafe` as they deal with raw pointers
//! and cross-language boundaries. Callers must ensure:
//! - Every non-null allocation is released exactly once, with the count it was produced with
//! - Input text is null-terminated
//! - Nothing reads through an address after it has been released

#![warn(missing_docs)]

#[macro_use]
mod error;
mod api;
mod memory;
mod scrape;
mod sequence;
mod spellcheck;
mod types;
mod users;

// Re-export public API
pub use api::*;
pub use error::NativeError;
pub use memory::{handoff_clear_error, handoff_last_error, handoff_string_free};
pub use scrape::*;
pub use sequence::*;
pub use spellcheck::*;
pub use types::{Site, Suggestion, User};
pub use users::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let version = handoff_version();
        assert!(!version.is_null());
    }
}
