//! Log entry and batch structures

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name stamped into the `logger` field of every entry
pub const LOGGER_NAME: &str = "log_shipper";

/// Keys owned by the entry itself; context fields never override them
pub const RESERVED_FIELDS: [&str; 4] = ["timestamp", "level", "logger", "message"];

/// One structured log record
///
/// Serializes as a flat JSON object: the four reserved keys followed by the
/// context fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger: String,
    pub message: String,
    #[serde(flatten)]
    pub context: LogContext,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: LOGGER_NAME.to_string(),
            message: message.into(),
            context: LogContext::new(),
        }
    }

    /// Merge context fields into the entry, skipping reserved keys
    pub fn with_context(mut self, context: LogContext) -> Self {
        for (key, value) in context.fields() {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            self.context.add_field(key.clone(), value.clone());
        }
        self
    }

    /// Escape line breaks and tabs so one entry can never render as several lines
    pub(crate) fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }
}

/// Ordered snapshot of buffered entries delivered in one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogBatch {
    pub entries: Vec<LogEntry>,
}

impl LogBatch {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_context::FieldValue;

    #[test]
    fn test_new_entry_defaults() {
        let entry = LogEntry::new(LogLevel::Info, "");
        assert_eq!(entry.logger, LOGGER_NAME);
        assert_eq!(entry.message, "");
        assert!(entry.context.is_empty());
    }

    #[test]
    fn test_context_cannot_override_reserved_fields() {
        let entry = LogEntry::new(LogLevel::Warn, "disk low").with_context(
            LogContext::new()
                .with_field("level", "DEBUG")
                .with_field("message", "spoofed")
                .with_field("timestamp", "1970-01-01T00:00:00Z")
                .with_field("logger", "other")
                .with_field("service", "billing"),
        );

        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.message, "disk low");
        assert_eq!(entry.logger, LOGGER_NAME);
        assert_eq!(entry.context.len(), 1);
        assert_eq!(entry.context.get("service"), Some(&FieldValue::from("billing")));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::new(LogLevel::Error, "payment failed")
            .with_context(LogContext::new().with_http("POST", "/api/pay", 502));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["logger"], LOGGER_NAME);
        assert_eq!(json["message"], "payment failed");
        assert_eq!(json["status_code"], 502);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_entry_deserializes_extra_keys_into_context() {
        let json = serde_json::json!({
            "timestamp": "2024-05-01T12:00:00Z",
            "level": "INFO",
            "logger": LOGGER_NAME,
            "message": "hello",
            "request_id": "r-1",
        });
        let entry: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.context.get("request_id"), Some(&FieldValue::from("r-1")));
    }

    #[test]
    fn test_batch_body_shape() {
        let batch = LogBatch::new(vec![LogEntry::new(LogLevel::Info, "a")]);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["entries"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_sanitize_message() {
        let sanitized = LogEntry::sanitize_message("line1\nline2\r\tend");
        assert_eq!(sanitized, "line1\\nline2\\r\\tend");
    }
}
