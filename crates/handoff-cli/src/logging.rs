//! Logging setup for the handoff CLI
//!
//! This module provides:
//! - Verbosity to level mapping
//! - Environment and config file overrides
//! - Console or file output in compact, full or JSON format
//! - Performance timing spans

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Optional file output path; stderr when unset
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Include span close events
    pub span_events: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "full" => Some(Self::Full),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            file: None,
            thread_ids: false,
            source_location: false,
            span_events: false,
        }
    }
}

impl LogSettings {
    /// Create logging settings from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut settings = Self::default();

        match verbosity {
            0 => {}
            1 => {
                settings.level = "info".to_string();
            }
            2 => {
                settings.level = "debug".to_string();
                settings.source_location = true;
            }
            _ => {
                settings.level = "trace".to_string();
                settings.format = LogFormat::Full;
                settings.source_location = true;
                settings.thread_ids = true;
                settings.span_events = true;
            }
        }

        settings
    }

    /// Apply the `logging` section of the config file
    pub fn merge_with_config(mut self, config: &LoggingConfig) -> Self {
        if let Some(level) = &config.level {
            self.level = level.clone();
        }
        if let Some(format) = config.format.as_deref().and_then(LogFormat::parse) {
            self.format = format;
        }
        if let Some(file) = &config.file {
            self.file = Some(file.clone());
        }
        self
    }

    /// Apply `RUST_LOG`, `HANDOFF_LOG_FORMAT` and `HANDOFF_LOG_FILE`
    pub fn merge_with_env(self) -> Self {
        self.merge_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    pub fn merge_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rust_log) = lookup("RUST_LOG") {
            self.level = rust_log;
        }

        if let Some(format) = lookup("HANDOFF_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(parsed) => self.format = parsed,
                None => eprintln!("Invalid log format: {}, using default", format),
            }
        }

        if let Some(file) = lookup("HANDOFF_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }

        self
    }
}

/// Initialize the global logging system
///
/// The returned guard flushes the log file when dropped, so it must live
/// until the process is about to exit.
pub fn init_logging(settings: LogSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&settings.level)
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", settings.level, e)))?;

    let (writer, guard, ansi) = match &settings.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (writer, Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
    };

    let span_events = if settings.span_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let installed = match settings.format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(settings.thread_ids)
                .with_file(settings.source_location)
                .with_line_number(settings.source_location)
                .with_span_events(span_events)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_thread_ids(settings.thread_ids)
                .with_file(settings.source_location)
                .with_line_number(settings.source_location)
                .with_span_events(span_events)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Full => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(settings.thread_ids)
                .with_file(settings.source_location)
                .with_line_number(settings.source_location)
                .with_span_events(span_events)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    installed.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(settings = ?settings, "logging initialized");
    Ok(guard)
}

fn file_writer(path: &Path) -> Result<(BoxMakeWriter, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::config(format!("Log file path has no file name: {}", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), guard))
}

/// Create a span for a timed operation
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation: operation.to_string(),
            }
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation: operation.to_string(),
            }
        }

        /// Get elapsed time without finishing the timer
        pub fn elapsed(&self) -> std::time::Duration {
            self.start.elapsed()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "operation completed"
            );
        }
    }
}
