//! Handoff marshaller - the caller's side of the boundary
//!
//! The marshaller declares its own `#[repr(C)]` view of every native
//! record, calls entry points through an explicit [`NativeLibrary`] handle,
//! and copies results into owned Rust values. Each native address is held
//! by an [`Acquired`] guard from the moment it arrives, so it is released
//! exactly once on every path out of a call, and never when the native
//! side returned null.
//!
//! ```no_run
//! use handoff_marshal::{MarshalConfig, Marshaller};
//!
//! let marshaller = Marshaller::from_config(MarshalConfig::default().merge_with_env())?;
//! let sites = marshaller.scrape_batch(&["https://example.com", "not a url"])?;
//! assert!(sites.len() <= 2);
//! # Ok::<(), handoff_marshal::MarshalError>(())
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod guard;
pub mod library;
#[cfg(feature = "linked")]
mod linked;
pub mod pool;
pub mod records;

pub use client::Marshaller;
pub use config::{ConcurrencyConfig, LibraryConfig, MarshalConfig};
pub use decode::{decode_text, Degenerate, ForeignRecord};
pub use error::{MarshalError, Result};
pub use guard::Acquired;
pub use library::{platform, NativeLibrary, Origin, Platform, Symbols};
pub use pool::PoolOptions;
pub use records::{RawSite, RawSuggestion, RawUser, Site, Suggestion, User};
