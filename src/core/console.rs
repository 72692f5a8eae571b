//! Development-mode console mirroring
//!
//! Prints every entry as it is logged. DEBUG and INFO go to stdout, WARN and
//! ERROR to stderr. Output never goes back through the logger.

use super::log_entry::LogEntry;
use chrono::SecondsFormat;
#[cfg(feature = "console")]
use colored::Colorize;

#[derive(Debug, Clone)]
pub struct ConsoleMirror {
    use_colors: bool,
}

impl ConsoleMirror {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn mirror(&self, entry: &LogEntry) {
        let line = self.format_text(entry);
        if entry.level.is_stderr() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// Format as `[timestamp] [LEVEL] message key=value...`
    pub fn format_text(&self, entry: &LogEntry) -> String {
        let level_str = self.format_level(entry);
        let base = format!(
            "[{}] [{}] {}",
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level_str,
            entry.message
        );

        if entry.context.is_empty() {
            base
        } else {
            format!("{} {}", base, entry.context.format_fields())
        }
    }

    fn format_level(&self, entry: &LogEntry) -> String {
        let padded = format!("{:5}", entry.level.to_str());
        if self.use_colors {
            Self::colorize(padded, entry)
        } else {
            padded
        }
    }

    #[cfg(feature = "console")]
    fn colorize(padded: String, entry: &LogEntry) -> String {
        padded.color(entry.level.color_code()).to_string()
    }

    #[cfg(not(feature = "console"))]
    fn colorize(padded: String, _entry: &LogEntry) -> String {
        padded
    }
}

impl Default for ConsoleMirror {
    fn default() -> Self {
        Self::new()
    }
}
