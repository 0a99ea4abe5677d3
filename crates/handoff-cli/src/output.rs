//! Output formatting and writing utilities
//!
//! Results are printed as JSON, YAML, or a human-readable listing. Every
//! value printed here is already an owned copy; native memory is gone by
//! the time output happens.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use handoff_marshal::{Site, Suggestion, User};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

/// Longest body excerpt shown in human output
const BODY_PREVIEW: usize = 72;

/// Values with a human-readable rendering
pub trait HumanReadable {
    /// Render as one or more lines
    fn human(&self, use_color: bool) -> String;
}

impl HumanReadable for i32 {
    fn human(&self, _use_color: bool) -> String {
        self.to_string()
    }
}

impl HumanReadable for String {
    fn human(&self, _use_color: bool) -> String {
        self.clone()
    }
}

impl HumanReadable for User {
    fn human(&self, use_color: bool) -> String {
        let name = if use_color {
            self.name.bold().to_string()
        } else {
            self.name.clone()
        };
        format!("{} ({}) <{}>", name, self.age, self.email)
    }
}

impl HumanReadable for Suggestion {
    fn human(&self, use_color: bool) -> String {
        if self.is_exact() {
            let mark = if use_color { "✓".green().to_string() } else { "ok".to_string() };
            format!("{} {}", mark, self.word)
        } else {
            format!("{} ({:.1}%)", self.word, self.likelihood)
        }
    }
}

impl HumanReadable for Site {
    fn human(&self, use_color: bool) -> String {
        let url = if use_color {
            self.url.bright_blue().to_string()
        } else {
            self.url.clone()
        };
        let server = if self.server.is_empty() { "-" } else { &self.server };
        format!(
            "{}\n  {}://{}:{}  server: {}  type: {}\n  {}",
            url,
            self.protocol,
            self.domain,
            self.port,
            server,
            self.content_type,
            preview(&self.body)
        )
    }
}

fn preview(body: &str) -> String {
    let flat: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > BODY_PREVIEW {
        let cut: String = flat.chars().take(BODY_PREVIEW).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize + HumanReadable>(&self, value: &T, use_color: bool) -> Result<String>;

    /// Format a list of values
    fn format_list<T: Serialize + HumanReadable>(&self, values: &[T], use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize + HumanReadable>(&self, value: &T, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(value.human(use_color)),
        }
    }

    fn format_list<T: Serialize + HumanReadable>(&self, values: &[T], use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(values)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(values)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(values)?),
            OutputFormat::Human => Ok(values
                .iter()
                .enumerate()
                .map(|(i, v)| format!("{:>3}. {}", i, v.human(use_color)))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(format: OutputFormat, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color: false,
            show_progress: false,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write one value in the configured format
    pub fn data<T: Serialize + HumanReadable>(&mut self, value: &T) -> Result<()> {
        trace!(format = ?self.format, "writing value");
        let formatted = self.format.format(value, self.use_color)?;
        self.emit(&formatted)
    }

    /// Write a list of values in the configured format
    pub fn list<T: Serialize + HumanReadable>(&mut self, values: &[T]) -> Result<()> {
        trace!(format = ?self.format, count = values.len(), "writing list");
        let formatted = self.format.format_list(values, self.use_color)?;
        self.emit(&formatted)
    }

    fn emit(&mut self, formatted: &str) -> Result<()> {
        // YAML output already ends with a newline
        if formatted.ends_with('\n') {
            write!(self.writer, "{}", formatted)?;
            self.writer.flush()?;
            Ok(())
        } else {
            self.writeln(formatted)
        }
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

fn default_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Clonable in-memory sink
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn user() -> User {
        User {
            name: "Grace Hopper".to_string(),
            age: 85,
            email: "grace@example.com".to_string(),
        }
    }

    #[test]
    fn test_human_user() {
        assert_eq!(user().human(false), "Grace Hopper (85) <grace@example.com>");
    }

    #[test]
    fn test_human_suggestions() {
        let exact = Suggestion {
            word: "water".to_string(),
            likelihood: 0.0,
        };
        let close = Suggestion {
            word: "water".to_string(),
            likelihood: 93.33,
        };
        assert_eq!(exact.human(false), "ok water");
        assert_eq!(close.human(false), "water (93.3%)");
    }

    #[test]
    fn test_body_preview_is_flattened_and_cut() {
        assert_eq!(preview("<p>\n  hi  </p>"), "<p> hi </p>");
        let long = "x".repeat(200);
        assert_eq!(preview(&long).chars().count(), BODY_PREVIEW + 1);
    }

    #[test]
    fn test_json_list() {
        let sink = Sink::default();
        let mut out = OutputWriter::with_writer(OutputFormat::Json, false, Box::new(sink.clone()));
        out.list(&[1i32, 1, 2, 3]).unwrap();
        assert_eq!(sink.contents(), "[1,1,2,3]\n");
    }

    #[test]
    fn test_yaml_value() {
        let sink = Sink::default();
        let mut out = OutputWriter::with_writer(OutputFormat::Yaml, false, Box::new(sink.clone()));
        out.data(&user()).unwrap();
        let parsed: User = serde_yaml::from_str(&sink.contents()).unwrap();
        assert_eq!(parsed, user());
    }

    #[test]
    fn test_quiet_suppresses_info_only() {
        let sink = Sink::default();
        let mut out = OutputWriter::with_writer(OutputFormat::Human, true, Box::new(sink.clone()));
        out.info("loading").unwrap();
        out.section("Results").unwrap();
        out.warning("dropped 1").unwrap();
        out.list(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(sink.contents(), "WARNING: dropped 1\n  0. a\n  1. b\n");
    }

    #[test]
    fn test_machine_formats_skip_messages() {
        let sink = Sink::default();
        let mut out = OutputWriter::with_writer(OutputFormat::Json, false, Box::new(sink.clone()));
        out.info("loading").unwrap();
        out.warning("dropped").unwrap();
        assert!(sink.contents().is_empty());
    }
}
