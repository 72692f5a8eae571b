//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. A leading
//! `context: <LogContext>,` attaches structured fields.
//!
//! # Examples
//!
//! ```
//! use log_shipper::prelude::*;
//! use log_shipper::{info, warn};
//!
//! let logger = Logger::with_transport(LoggerConfig::default(), MemoryTransport::new()).unwrap();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! warn!(logger, context: LogContext::new().with_request_id("r-1"), "Slow request: {}ms", 950);
//! # logger.shutdown();
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use log_shipper::prelude::*;
/// # let logger = Logger::with_transport(LoggerConfig::default(), MemoryTransport::new()).unwrap();
/// use log_shipper::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, context: $ctx:expr, $($arg:tt)+) => {
        $logger.log_with_context($level, format!($($arg)+), $ctx)
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, context: $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, context: $ctx, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, context: $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, context: $ctx, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, context: $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, context: $ctx, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use log_shipper::prelude::*;
/// # let logger = Logger::with_transport(LoggerConfig::default(), MemoryTransport::new()).unwrap();
/// use log_shipper::error;
/// error!(logger, "Failed to load tenant {}", "acme");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, context: $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, context: $ctx, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
