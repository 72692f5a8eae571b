//! Structured logging context for key-value fields
//!
//! This module provides:
//! - `LogContext`: Per-entry structured fields
//! - `LoggerContext`: Persistent fields merged into every entry
//! - `ContextGuard`: RAII guard for scoped context

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u16> for FieldValue {
    fn from(i: u16) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Context for structured logging with key-value fields
///
/// Serializes as a plain JSON object so it can be flattened into a log entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogContext {
    fields: HashMap<String, FieldValue>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    /// Record where the log call originated
    pub fn with_location(self, module: &str, function: &str, line: u32) -> Self {
        self.with_field("module", module)
            .with_field("function", function)
            .with_field("line", line)
    }

    /// Record the HTTP exchange a log line refers to
    pub fn with_http(self, method: &str, path: &str, status: u16) -> Self {
        self.with_field("method", method)
            .with_field("path", path)
            .with_field("status_code", status)
    }

    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.with_field("request_id", request_id.into())
    }

    pub fn with_client_ip(self, client_ip: impl Into<String>) -> Self {
        self.with_field("client_ip", client_ip.into())
    }

    /// Get a single field
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get all fields
    pub fn fields(&self) -> &HashMap<String, FieldValue> {
        &self.fields
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Format fields as key=value pairs, sorted by key
    pub fn format_fields(&self) -> String {
        let mut pairs: Vec<_> = self.fields.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

/// Logger-level persistent context for structured logging
///
/// `LoggerContext` stores fields that persist across all log entries, such as
/// the service name or deployment environment. Fields supplied at the call
/// site take priority over these defaults.
///
/// Thread-safe: Can be safely shared across threads.
///
/// # Example
///
/// ```
/// use log_shipper::LoggerContext;
///
/// let ctx = LoggerContext::new();
/// ctx.set("service", "crm-dashboard");
/// ctx.set("environment", "production");
///
/// let fields = ctx.get_fields();
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LoggerContext {
    fields: Arc<RwLock<HashMap<String, FieldValue>>>,
}

impl LoggerContext {
    /// Create a new empty logger context
    pub fn new() -> Self {
        Self {
            fields: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set a field in the context
    ///
    /// If the field already exists, it will be overwritten.
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.write().insert(key.into(), value.into());
    }

    /// Get a clone of all fields
    pub fn get_fields(&self) -> HashMap<String, FieldValue> {
        self.fields.read().clone()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }

    /// Get the number of fields in the context
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Merge context fields into a LogContext
    ///
    /// Entry-level fields take priority over logger-level fields.
    pub fn merge_into(&self, log_context: &mut LogContext) {
        let fields = self.fields.read();
        for (key, value) in fields.iter() {
            if !log_context.fields.contains_key(key) {
                log_context.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Set a field that is removed again when the returned guard drops
    #[must_use = "the field is removed as soon as the guard is dropped"]
    pub fn scoped<K, V>(&self, key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        self.set(key.clone(), value);
        ContextGuard::new(Arc::clone(&self.fields), key)
    }
}

impl Default for LoggerContext {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for scoped context fields
///
/// When dropped, automatically removes the field from the logger context.
///
/// # Example
///
/// ```no_run
/// use log_shipper::{Logger, LoggerConfig};
///
/// let logger = Logger::new(LoggerConfig::default()).unwrap();
/// {
///     let _guard = logger.scoped_field("request_id", "abc-123");
///     logger.info("Processing request"); // carries request_id
/// }
/// logger.info("Request finished"); // no request_id
/// ```
pub struct ContextGuard {
    context: Arc<RwLock<HashMap<String, FieldValue>>>,
    key: String,
}

impl ContextGuard {
    pub(crate) fn new(context: Arc<RwLock<HashMap<String, FieldValue>>>, key: String) -> Self {
        Self { context, key }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.context.write().remove(&self.key);
    }
}
