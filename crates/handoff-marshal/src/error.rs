//! Error types for the marshaller
//!
//! Every failure the application sees is one of these. Decode anomalies are
//! not: invalid text is repaired, never reported.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for marshaller operations
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Domain errors raised by the marshaller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarshalError {
    /// The entry point returned the null sentinel
    #[error("{entry_point} produced no value for {input}: {reason}")]
    Sentinel {
        /// Entry point that failed
        entry_point: &'static str,
        /// Caller input that could not be served
        input: String,
        /// Reason reported by the native side
        reason: String,
    },

    /// An element of an array result was unusable under strict mode
    #[error("{entry_point} element {index} ({label}) errored")]
    Degenerate {
        /// Entry point that produced the array
        entry_point: &'static str,
        /// Position of the first unusable element
        index: usize,
        /// Identifying label, usually the input at that position
        label: String,
    },

    /// Input was rejected before any native call
    #[error("invalid input for {entry_point}: {reason}")]
    InvalidInput {
        /// Entry point that would have been called
        entry_point: &'static str,
        /// Why the input could not be encoded
        reason: String,
    },

    /// No library file matched in any search path
    #[error("library {name} not found in {searched:?}")]
    LibraryNotFound {
        /// File name searched for
        name: String,
        /// Directories searched
        searched: Vec<PathBuf>,
    },

    /// The library exists but could not be loaded
    #[error("failed to load {path}: {reason}")]
    LoadFailed {
        /// Library path
        path: PathBuf,
        /// Loader complaint
        reason: String,
    },

    /// A required entry point is missing from the library
    #[error("symbol {symbol} not found in {path}")]
    SymbolNotFound {
        /// Library path
        path: PathBuf,
        /// Missing symbol name
        symbol: &'static str,
    },

    /// No library naming rule exists for this platform
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A concurrent call did not finish in time
    #[error("call for {input} timed out after {after:?}")]
    Timeout {
        /// Caller input of the timed-out call
        input: String,
        /// Configured timeout
        after: Duration,
    },

    /// A worker task panicked or was cancelled
    #[error("worker failed for {input}: {reason}")]
    Worker {
        /// Caller input of the failed call
        input: String,
        /// Join failure
        reason: String,
    },
}

impl MarshalError {
    /// Whether this error came back from a native call, as opposed to
    /// loading, input validation or scheduling
    pub fn is_domain(&self) -> bool {
        matches!(self, MarshalError::Sentinel { .. } | MarshalError::Degenerate { .. })
    }
}
