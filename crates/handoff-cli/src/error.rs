//! Error types and handling for the CLI
//!
//! Each variant maps to its own process exit code.

use std::io;
use std::path::PathBuf;

use handoff_marshal::MarshalError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A native call failed or produced a degenerate record
    #[error("{0}")]
    Marshal(MarshalError),

    /// Input the native side cannot accept, such as an interior NUL
    #[error("Invalid arguments: {0}")]
    InvalidArgs(MarshalError),

    /// The native library could not be found or opened
    #[error("Library error: {0}")]
    Library(MarshalError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Some calls in a concurrent run failed
    #[error("{failed} of {total} calls failed")]
    Partial { failed: usize, total: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<MarshalError> for Error {
    fn from(error: MarshalError) -> Self {
        match error {
            MarshalError::LibraryNotFound { .. }
            | MarshalError::LoadFailed { .. }
            | MarshalError::SymbolNotFound { .. }
            | MarshalError::UnsupportedPlatform(_) => Self::Library(error),
            MarshalError::InvalidInput { .. } => Self::InvalidArgs(error),
            other => Self::Marshal(other),
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Marshal(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Library(_) => 7,
            Self::Partial { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
