//! Error types for the log shipper

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (connect, timeout, body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Delivery to '{endpoint}' rejected with status {status}")]
    DeliveryStatus { endpoint: String, status: u16 },

    /// Every attempt of a flush cycle failed
    #[error("Delivery failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<LoggerError>,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Worker rejected a message
    #[error("Malformed worker message: {0}")]
    MalformedMessage(String),

    /// Worker pool no longer accepts jobs
    #[error("Worker pool terminated")]
    WorkerPoolTerminated,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a non-2xx delivery error
    pub fn delivery_status(endpoint: impl Into<String>, status: u16) -> Self {
        LoggerError::DeliveryStatus {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Wrap the last attempt's error once the retry budget is spent
    pub fn retries_exhausted(attempts: u32, last: LoggerError) -> Self {
        LoggerError::RetriesExhausted {
            attempts,
            source: Box::new(last),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a malformed worker message error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        LoggerError::MalformedMessage(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
