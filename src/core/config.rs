//! Logger configuration
//!
//! Captured once when the logger is built and immutable afterwards. The
//! serialized keys follow the camelCase option names used by the ingestion
//! side (`apiEndpoint`, `maxBufferSize`, ...).

use super::error::{LoggerError, Result};
use super::overflow_policy::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8000/api/logs";
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 100;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_WORKERS: usize = 2;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_BUFFERED_ENTRIES: usize = 10_000;
pub const DEFAULT_SERVICE_NAME: &str = "log_shipper";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Delivery URL for batches
    #[serde(rename = "apiEndpoint")]
    pub api_endpoint: String,

    /// Buffered entry count that triggers an immediate flush
    #[serde(rename = "maxBufferSize")]
    pub max_buffer_size: usize,

    #[serde(rename = "flushInterval")]
    pub flush_interval_ms: u64,

    /// Delivery attempts per flush cycle
    #[serde(rename = "maxRetries")]
    pub max_retries: u32,

    /// Linear backoff base; attempt `n` waits `n * retry_delay`
    #[serde(rename = "retryDelay")]
    pub retry_delay_ms: u64,

    #[serde(rename = "maxWorkers")]
    pub max_workers: usize,

    /// Mirror every entry to stdout/stderr
    #[serde(rename = "isDevelopment")]
    pub is_development: bool,

    #[serde(rename = "requestTimeout")]
    pub request_timeout_ms: u64,

    /// Hard cap on buffered entries, including re-queued ones
    #[serde(rename = "maxBufferedEntries")]
    pub max_buffered_entries: usize,

    #[serde(rename = "overflowPolicy")]
    pub overflow_policy: OverflowPolicy,

    /// Default `service` field of every entry
    #[serde(rename = "serviceName")]
    pub service_name: String,

    /// gzip request bodies
    pub compress: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_workers: DEFAULT_MAX_WORKERS,
            is_development: false,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_buffered_entries: DEFAULT_MAX_BUFFERED_ENTRIES,
            overflow_policy: OverflowPolicy::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            compress: false,
        }
    }
}

impl LoggerConfig {
    /// Parse a JSON document; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger config",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&contents)
    }

    /// Reject zero-valued numeric options and an empty endpoint
    pub fn validate(&self) -> Result<()> {
        const COMPONENT: &str = "LoggerConfig";

        if self.api_endpoint.trim().is_empty() {
            return Err(LoggerError::config(COMPONENT, "apiEndpoint must not be empty"));
        }

        let positive = [
            ("maxBufferSize", self.max_buffer_size as u64),
            ("flushInterval", self.flush_interval_ms),
            ("maxRetries", u64::from(self.max_retries)),
            ("retryDelay", self.retry_delay_ms),
            ("maxWorkers", self.max_workers as u64),
            ("requestTimeout", self.request_timeout_ms),
            ("maxBufferedEntries", self.max_buffered_entries as u64),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(LoggerError::config(
                    COMPONENT,
                    format!("{} must be positive", name),
                ));
            }
        }

        if self.max_buffered_entries < self.max_buffer_size {
            return Err(LoggerError::config(
                COMPONENT,
                format!(
                    "maxBufferedEntries ({}) must be at least maxBufferSize ({})",
                    self.max_buffered_entries, self.max_buffer_size
                ),
            ));
        }

        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `environment` field stamped on every entry
    pub fn environment(&self) -> &'static str {
        if self.is_development {
            "development"
        } else {
            "production"
        }
    }
}
