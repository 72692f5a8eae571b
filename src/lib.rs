//! # Log Shipper
//!
//! A buffered structured logger that ships ordered batches of log entries to
//! an HTTP ingestion endpoint.
//!
//! ## Features
//!
//! - **Fire-and-forget**: log calls never block on delivery
//! - **Ordered batches**: entries leave in the order they were logged
//! - **Retry with linear backoff**: failed batches are re-queued, not dropped
//! - **Bounded memory**: a hard cap with a configurable eviction policy
//! - **Worker pool**: off-thread validation and enrichment of entries

pub mod core;
pub mod macros;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        ContextGuard, FieldValue, FlushOutcome, LogBatch, LogContext, LogEntry, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerContext, LoggerError, LoggerMetrics, LoggerState,
        OverflowCallback, OverflowPolicy, Result,
    };
    pub use crate::transports::{HttpTransport, MemoryTransport, Transport};
}

pub use crate::core::{
    ConsoleMirror, ContextGuard, FieldValue, FlushController, FlushOutcome, LinearBackoff,
    LogBatch, LogContext, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerContext,
    LoggerError, LoggerMetrics, LoggerState, OverflowCallback, OverflowPolicy, Result,
    WorkerPool, WorkerRequest, WorkerResponse, LOGGER_NAME, RESERVED_FIELDS,
};
pub use crate::transports::{HttpTransport, MemoryTransport, Transport};
