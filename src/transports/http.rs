//! HTTP transport for remote log ingestion
//!
//! POSTs each batch as `{ "entries": [...] }` JSON. Any non-2xx answer, a
//! connection failure or a timeout counts as a failed attempt.

use super::Transport;
use crate::core::{LogBatch, LoggerConfig, LoggerError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Write;
use std::time::Duration;

/// Transport that ships batches to an HTTP endpoint
///
/// # Example
///
/// ```no_run
/// use log_shipper::transports::{HttpTransport, Transport};
/// use log_shipper::{LogBatch, LogEntry, LogLevel};
/// use std::time::Duration;
///
/// let mut transport = HttpTransport::new("http://127.0.0.1:8000/api/logs", Duration::from_secs(5))
///     .expect("Failed to build HTTP client");
///
/// let batch = LogBatch::new(vec![LogEntry::new(LogLevel::Info, "lead created")]);
/// transport.deliver(&batch).expect("endpoint rejected batch");
/// ```
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    compress: bool,
}

impl HttpTransport {
    /// Create a transport whose every request is bounded by `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be initialized
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            compress: false,
        })
    }

    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        Ok(Self::new(config.api_endpoint.clone(), config.request_timeout())?
            .with_compression(config.compress))
    }

    /// gzip request bodies
    ///
    /// Default: disabled
    #[must_use]
    pub fn with_compression(mut self, enable: bool) -> Self {
        self.compress = enable;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn encode(&self, batch: &LogBatch) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(batch)?;
        if !self.compress {
            return Ok(json);
        }
        let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 4), Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }
}

impl Transport for HttpTransport {
    fn deliver(&mut self, batch: &LogBatch) -> Result<()> {
        let body = self.encode(batch)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json");
        if self.compress {
            request = request.header(CONTENT_ENCODING, "gzip");
        }

        let response = request.body(body).send()?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LoggerError::delivery_status(&self.endpoint, status.as_u16()))
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogEntry, LogLevel};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn batch() -> LogBatch {
        LogBatch::new(vec![
            LogEntry::new(LogLevel::Info, "first"),
            LogEntry::new(LogLevel::Error, "second"),
        ])
    }

    #[test]
    fn test_deliver_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/logs")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Regex(
                r#"^\{"entries":\[.*"message":"first".*"message":"second".*\]\}$"#.to_string(),
            ))
            .with_status(202)
            .create();

        let mut transport =
            HttpTransport::new(format!("{}/api/logs", server.url()), Duration::from_secs(2)).unwrap();
        transport.deliver(&batch()).unwrap();

        mock.assert();
    }

    #[test]
    fn test_non_2xx_is_an_error() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/api/logs").with_status(503).create();

        let mut transport =
            HttpTransport::new(format!("{}/api/logs", server.url()), Duration::from_secs(2)).unwrap();
        let err = transport.deliver(&batch()).unwrap_err();

        assert!(matches!(err, LoggerError::DeliveryStatus { status: 503, .. }));
        mock.assert();
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut transport =
            HttpTransport::new(format!("http://{}/api/logs", addr), Duration::from_millis(500)).unwrap();
        let err = transport.deliver(&batch()).unwrap_err();
        assert!(matches!(err, LoggerError::Http(_)));
    }

    #[test]
    fn test_gzip_encoding() {
        let transport = HttpTransport::new("http://localhost/api/logs", Duration::from_secs(1))
            .unwrap()
            .with_compression(true);

        let body = transport.encode(&batch()).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(body.as_slice()).read_to_string(&mut decoded).unwrap();

        let parsed: LogBatch = serde_json::from_str(&decoded).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.entries[1].message, "second");
    }

    #[test]
    fn test_from_config() {
        let config = LoggerConfig {
            api_endpoint: "https://logs.example.com/ingest".to_string(),
            compress: true,
            ..LoggerConfig::default()
        };
        let transport = HttpTransport::from_config(&config).unwrap();
        assert_eq!(transport.endpoint(), "https://logs.example.com/ingest");
        assert!(transport.compress);
        assert_eq!(transport.name(), "http");
    }
}
