//! Marshaller configuration
//!
//! Everything has a default, so an empty document is a valid config.
//! Environment variables override whatever was loaded.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default native library name, without platform prefix or extension
pub const DEFAULT_LIBRARY_NAME: &str = "handoff_native";

/// Default worker count for concurrent calls
pub const DEFAULT_WORKERS: usize = 10;

/// Top-level marshaller configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalConfig {
    /// Raise on the first degenerate array element instead of dropping it
    pub fail_on_error: bool,

    /// Which native library to use
    pub library: LibraryConfig,

    /// Concurrent call settings
    pub concurrency: ConcurrencyConfig,
}

/// Native library location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library name, resolved through the platform naming table
    pub name: String,

    /// Exact library path, bypassing the search
    pub path: Option<PathBuf>,

    /// Directories searched before the working directory
    pub search_paths: Vec<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LIBRARY_NAME.to_string(),
            path: None,
            search_paths: Vec::new(),
        }
    }
}

/// Worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Maximum native calls in flight
    pub workers: usize,

    /// Per-call timeout in seconds; unset means wait indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout_secs: None,
        }
    }
}

impl ConcurrencyConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl MarshalConfig {
    /// Apply `HANDOFF_*` environment overrides
    pub fn merge_with_env(self) -> Self {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    ///
    /// Unparseable values are ignored with a warning.
    pub fn merge_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("HANDOFF_FAIL_ON_ERROR") {
            match parse_bool(&value) {
                Some(flag) => self.fail_on_error = flag,
                None => tracing::warn!(value = %value, "ignoring HANDOFF_FAIL_ON_ERROR"),
            }
        }

        if let Some(path) = lookup("HANDOFF_LIBRARY_PATH") {
            self.library.path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("HANDOFF_WORKERS") {
            match value.parse::<usize>() {
                Ok(workers) if workers > 0 => self.concurrency.workers = workers,
                _ => tracing::warn!(value = %value, "ignoring HANDOFF_WORKERS"),
            }
        }

        if let Some(value) = lookup("HANDOFF_TIMEOUT_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => self.concurrency.timeout_secs = Some(secs),
                Err(_) => tracing::warn!(value = %value, "ignoring HANDOFF_TIMEOUT_SECS"),
            }
        }

        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MarshalConfig::default();
        assert!(!config.fail_on_error);
        assert_eq!(config.library.name, DEFAULT_LIBRARY_NAME);
        assert_eq!(config.concurrency.workers, DEFAULT_WORKERS);
        assert_eq!(config.concurrency.timeout(), None);
    }

    #[test]
    fn test_partial_document() {
        let config: MarshalConfig =
            serde_json::from_str(r#"{"fail_on_error": true, "concurrency": {"timeout_secs": 3}}"#).unwrap();
        assert!(config.fail_on_error);
        assert_eq!(config.concurrency.workers, DEFAULT_WORKERS);
        assert_eq!(config.concurrency.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("HANDOFF_FAIL_ON_ERROR", "yes"),
            ("HANDOFF_LIBRARY_PATH", "/opt/lib/libhandoff_native.so"),
            ("HANDOFF_WORKERS", "0"),
            ("HANDOFF_TIMEOUT_SECS", "7"),
        ]
        .into_iter()
        .collect();

        let config = MarshalConfig::default().merge_with(|key| env.get(key).map(|v| v.to_string()));
        assert!(config.fail_on_error);
        assert_eq!(config.library.path, Some(PathBuf::from("/opt/lib/libhandoff_native.so")));
        assert_eq!(config.concurrency.workers, DEFAULT_WORKERS);
        assert_eq!(config.concurrency.timeout_secs, Some(7));
    }
}
