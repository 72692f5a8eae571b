//! Logger facade
//!
//! Log calls build the entry on the caller's thread, mirror it to the console
//! in development mode, and hand it to the flusher thread over a bounded
//! channel. The flusher thread owns the [`FlushController`] and is the only
//! place where buffering, batching and delivery happen.

use super::{
    config::LoggerConfig,
    console::ConsoleMirror,
    error::{LoggerError, Result},
    flush::{FlushController, FlushOutcome},
    log_context::{ContextGuard, FieldValue, LogContext, LoggerContext},
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    overflow_policy::{alert_dropped, OverflowCallback, OverflowPolicy},
    worker_pool::WorkerPool,
};
use crate::transports::{HttpTransport, Transport};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Lifecycle of a logger; `ShuttingDown` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Active,
    ShuttingDown,
}

enum Command {
    Entry(LogEntry),
    Flush(Sender<FlushOutcome>),
    Shutdown(Sender<bool>),
}

pub struct Logger {
    config: Arc<LoggerConfig>,
    /// Defaults merged into every entry (service, environment, scoped fields)
    context: LoggerContext,
    sender: Sender<Command>,
    flusher: Mutex<Option<thread::JoinHandle<()>>>,
    workers: WorkerPool,
    console: Option<ConsoleMirror>,
    metrics: Arc<LoggerMetrics>,
    state: RwLock<LoggerState>,
    on_overflow: Option<OverflowCallback>,
}

impl Logger {
    /// Create a logger shipping to `config.api_endpoint` over HTTP
    pub fn new(config: LoggerConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Self::start(config, transport, None)
    }

    /// Create a logger delivering through a custom transport
    pub fn with_transport<T: Transport + 'static>(config: LoggerConfig, transport: T) -> Result<Self> {
        Self::start(config, transport, None)
    }

    fn start<T: Transport + 'static>(
        config: LoggerConfig,
        transport: T,
        on_overflow: Option<OverflowCallback>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let metrics = Arc::new(LoggerMetrics::new());

        let workers = WorkerPool::new(config.max_workers, Arc::clone(&metrics))?;

        let controller = FlushController::new(transport, &config, Arc::clone(&metrics))
            .with_overflow_callback(on_overflow.clone());
        let (sender, receiver) = bounded(config.max_buffered_entries);
        let interval = config.flush_interval();

        let handle = thread::Builder::new()
            .name("log-flusher".to_string())
            .spawn(move || Self::run_flusher(controller, receiver, interval))
            .map_err(|e| {
                LoggerError::io_operation("spawning log flusher", "flusher thread could not start", e)
            })?;

        let context = LoggerContext::new();
        context.set("service", config.service_name.clone());
        context.set("environment", config.environment());

        let console = config.is_development.then(ConsoleMirror::new);

        Ok(Self {
            config,
            context,
            sender,
            flusher: Mutex::new(Some(handle)),
            workers,
            console,
            metrics,
            state: RwLock::new(LoggerState::Active),
            on_overflow,
        })
    }

    /// Flusher thread: owns the buffer, reacts to commands and the ticker
    fn run_flusher<T: Transport>(
        mut controller: FlushController<T>,
        receiver: Receiver<Command>,
        interval: Duration,
    ) {
        let ticker = tick(interval);

        loop {
            select! {
                recv(receiver) -> command => match command {
                    Ok(Command::Entry(entry)) => {
                        controller.push(entry);
                    }
                    Ok(Command::Flush(ack)) => {
                        let _ = ack.send(controller.flush());
                    }
                    Ok(Command::Shutdown(ack)) => {
                        // Entries queued before the command still get the final drain
                        for command in receiver.try_iter() {
                            match command {
                                Command::Entry(entry) => {
                                    controller.push(entry);
                                }
                                Command::Flush(ack) => {
                                    let _ = ack.send(FlushOutcome::Skipped);
                                }
                                Command::Shutdown(ack) => {
                                    let _ = ack.send(true);
                                }
                            }
                        }
                        let _ = ack.send(controller.shutdown());
                        return;
                    }
                    Err(_) => {
                        controller.shutdown();
                        return;
                    }
                },
                recv(ticker) -> _ => {
                    controller.tick();
                }
            }
        }
    }

    /// Install the process-wide logger once
    ///
    /// Later calls return the already installed logger and ignore their
    /// configuration.
    pub fn install(config: LoggerConfig) -> Result<&'static Logger> {
        if let Some(logger) = GLOBAL.get() {
            return Ok(logger);
        }
        let logger = Logger::new(config)?;
        Ok(GLOBAL.get_or_init(|| logger))
    }

    /// The process-wide logger, if installed
    pub fn global() -> Option<&'static Logger> {
        GLOBAL.get()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with_context(level, message, LogContext::new());
    }

    /// Log with structured context fields
    ///
    /// Call-site fields override logger defaults such as `service`.
    pub fn log_with_context(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: LogContext,
    ) {
        let mut fields = context;
        self.context.merge_into(&mut fields);

        let entry = LogEntry::new(level, message).with_context(fields);
        if let Some(ref console) = self.console {
            console.mirror(&entry);
        }
        self.send_entry(entry);
    }

    /// Hand the entry to the flusher thread without blocking
    fn send_entry(&self, entry: LogEntry) {
        self.metrics.record_logged();

        // Held across the send so nothing enters the channel once the final drain starts
        let state = self.state.read();
        if *state == LoggerState::ShuttingDown {
            self.metrics.record_dropped();
            return;
        }

        match self.sender.try_send(Command::Entry(entry)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.metrics.record_queue_full();
                let previous = self.metrics.record_dropped();
                alert_dropped(previous, 1, "Log queue full", self.on_overflow.as_ref());
            }
            Err(TrySendError::Disconnected(_)) => {
                // Flusher thread gone
                self.metrics.record_dropped();
            }
        }
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn debug_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Debug, message, context);
    }

    pub fn info_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Info, message, context);
    }

    pub fn warn_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Warn, message, context);
    }

    pub fn error_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Error, message, context);
    }

    /// Add a default field for the lifetime of the returned guard
    ///
    /// # Example
    ///
    /// ```
    /// use log_shipper::{Logger, LoggerConfig, transports::MemoryTransport};
    ///
    /// let logger = Logger::with_transport(LoggerConfig::default(), MemoryTransport::new()).unwrap();
    /// {
    ///     let _guard = logger.scoped_field("request_id", "abc-123");
    ///     logger.info("Processing request");
    /// }
    /// logger.shutdown();
    /// ```
    pub fn scoped_field<K, V>(&self, key: K, value: V) -> ContextGuard
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.context.scoped(key, value)
    }

    /// Logger-level default fields
    pub fn context(&self) -> &LoggerContext {
        &self.context
    }

    /// Flush now and wait for the outcome
    ///
    /// Returns `Skipped` once the logger is shutting down.
    pub fn flush(&self) -> FlushOutcome {
        let (ack, outcome) = bounded(1);
        if self.sender.send(Command::Flush(ack)).is_err() {
            return FlushOutcome::Skipped;
        }
        outcome.recv().unwrap_or(FlushOutcome::Skipped)
    }

    /// Stop the worker pool, drain the buffer once and stop the flusher
    ///
    /// Blocks until the final flush settles; an in-flight delivery is never
    /// aborted. Returns `true` when every buffered entry was delivered.
    /// Calling it again returns `true` immediately.
    pub fn shutdown(&self) -> bool {
        let mut flusher = self.flusher.lock();
        let Some(handle) = flusher.take() else {
            return true;
        };

        *self.state.write() = LoggerState::ShuttingDown;
        self.workers.terminate();

        let (ack, drained) = bounded(1);
        let drained = match self.sender.send(Command::Shutdown(ack)) {
            Ok(()) => drained.recv().unwrap_or(false),
            Err(_) => false,
        };

        if let Err(e) = handle.join() {
            eprintln!("[LOGGER ERROR] Log flusher thread panicked during shutdown: {:?}", e);
            return false;
        }

        drained
    }

    pub fn state(&self) -> LoggerState {
        *self.state.read()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Background workers for off-thread entry processing
    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use log_shipper::prelude::*;
/// use log_shipper::transports::MemoryTransport;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .api_endpoint("https://logs.example.com/ingest")
///     .max_buffer_size(50)
///     .flush_interval(Duration::from_secs(2))
///     .max_retries(3)
///     .retry_delay(Duration::from_millis(500))
///     .overflow_policy(OverflowPolicy::DropOldest)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} logs dropped", count);
///     }))
///     .transport(MemoryTransport::new())
///     .build()
///     .unwrap();
/// logger.shutdown();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    transport: Option<Box<dyn Transport>>,
    on_overflow: Option<OverflowCallback>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            transport: None,
            on_overflow: None,
        }
    }

    /// Start from a complete configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.api_endpoint = endpoint.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.config.max_buffer_size = size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval_ms = interval.as_millis() as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    /// Mirror every entry to the console
    #[must_use = "builder methods return a new value"]
    pub fn development(mut self, enable: bool) -> Self {
        self.config.is_development = enable;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_buffered_entries(mut self, cap: usize) -> Self {
        self.config.max_buffered_entries = cap;
        self
    }

    /// Set the eviction policy applied at `max_buffered_entries`
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress(mut self, enable: bool) -> Self {
        self.config.compress = enable;
        self
    }

    /// Deliver through a custom transport instead of HTTP
    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Set a callback for drop notifications
    ///
    /// The parameter is the total count of dropped entries.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        self.config.validate()?;
        let transport: Box<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::from_config(&self.config)?),
        };
        Logger::start(self.config, transport, self.on_overflow)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
