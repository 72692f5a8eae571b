//! Core logger types

pub mod config;
pub mod console;
pub mod error;
pub mod flush;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod worker_pool;

pub use config::LoggerConfig;
pub use console::ConsoleMirror;
pub use error::{LoggerError, Result};
pub use flush::{FlushController, FlushOutcome, LinearBackoff, Sleeper};
pub use log_context::{ContextGuard, FieldValue, LogContext, LoggerContext};
pub use log_entry::{LogBatch, LogEntry, LOGGER_NAME, RESERVED_FIELDS};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerState};
pub use metrics::LoggerMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use worker_pool::{WorkerPool, WorkerRequest, WorkerResponse};
