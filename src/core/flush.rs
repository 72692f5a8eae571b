//! Buffer and flush controller
//!
//! Accumulates entries in push order, snapshots them into a [`LogBatch`] on
//! flush, and drives the transport with linear backoff. A batch whose retries
//! are exhausted goes back to the front of the buffer for the next cycle.
//!
//! The controller is owned by a single thread and every mutating operation
//! takes `&mut self`, so two flushes can never overlap.

use super::error::{LoggerError, Result};
use super::log_entry::{LogBatch, LogEntry};
use super::metrics::LoggerMetrics;
use super::overflow_policy::{alert_dropped, OverflowCallback, OverflowPolicy};
use super::config::LoggerConfig;
use crate::transports::Transport;
use std::sync::Arc;
use std::time::Duration;

/// Blocking wait between retry attempts
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Retry delay growing linearly with the attempt number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
}

impl LinearBackoff {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay after failed attempt `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt)
    }
}

/// Result of one flush cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered
    Empty,
    /// Flushing is disabled while shutting down
    Skipped,
    /// The batch reached the endpoint on attempt `attempts`
    Delivered { entries: usize, attempts: u32 },
    /// Every attempt failed; entries are back at the front of the buffer
    Requeued { entries: usize },
}

impl FlushOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, FlushOutcome::Delivered { .. })
    }
}

pub struct FlushController<T: Transport> {
    transport: T,
    buffer: Vec<LogEntry>,
    max_buffer_size: usize,
    max_buffered_entries: usize,
    max_retries: u32,
    backoff: LinearBackoff,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<LoggerMetrics>,
    sleeper: Sleeper,
    shutting_down: bool,
    /// Set after a requeue; size-triggered flushes wait for the next tick
    backing_off: bool,
}

impl<T: Transport> FlushController<T> {
    pub fn new(transport: T, config: &LoggerConfig, metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            transport,
            buffer: Vec::with_capacity(config.max_buffer_size),
            max_buffer_size: config.max_buffer_size,
            max_buffered_entries: config.max_buffered_entries,
            max_retries: config.max_retries,
            backoff: LinearBackoff::new(config.retry_delay()),
            overflow_policy: config.overflow_policy,
            on_overflow: None,
            metrics,
            sleeper: Arc::new(std::thread::sleep),
            shutting_down: false,
            backing_off: false,
        }
    }

    #[must_use]
    pub fn with_overflow_callback(mut self, callback: Option<OverflowCallback>) -> Self {
        self.on_overflow = callback;
        self
    }

    /// Replace the retry wait, e.g. to observe delays in tests
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered entries, oldest first
    pub fn buffered(&self) -> &[LogEntry] {
        &self.buffer
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Append an entry; flushes at once when the size threshold is reached
    pub fn push(&mut self, entry: LogEntry) -> Option<FlushOutcome> {
        if self.buffer.len() >= self.max_buffered_entries
            && self.overflow_policy == OverflowPolicy::DropNewest
        {
            self.record_dropped(1);
            return None;
        }

        self.buffer.push(entry);
        self.enforce_cap();

        if self.buffer.len() >= self.max_buffer_size && !self.backing_off {
            Some(self.flush())
        } else {
            None
        }
    }

    /// Periodic trigger; also lifts the post-requeue pause
    pub fn tick(&mut self) -> FlushOutcome {
        self.backing_off = false;
        self.flush()
    }

    pub fn flush(&mut self) -> FlushOutcome {
        if self.shutting_down {
            return FlushOutcome::Skipped;
        }
        self.flush_buffer()
    }

    /// Final drain; later calls find the controller already shut down
    ///
    /// Returns `true` when nothing is left behind.
    pub fn shutdown(&mut self) -> bool {
        if self.shutting_down {
            return self.buffer.is_empty();
        }
        self.shutting_down = true;

        match self.flush_buffer() {
            FlushOutcome::Requeued { .. } => {
                let lost = self.buffer.len();
                eprintln!(
                    "[LOGGER ERROR] Final flush via {} failed, {} buffered log entries lost.",
                    self.transport.name(),
                    lost
                );
                self.buffer.clear();
                self.record_dropped(lost);
                false
            }
            _ => true,
        }
    }

    fn flush_buffer(&mut self) -> FlushOutcome {
        if self.buffer.is_empty() {
            return FlushOutcome::Empty;
        }

        let batch = LogBatch::new(std::mem::take(&mut self.buffer));
        let entries = batch.len();

        match self.deliver_with_retry(&batch) {
            Ok(attempts) => {
                self.metrics.record_delivered(entries);
                self.backing_off = false;
                FlushOutcome::Delivered { entries, attempts }
            }
            Err(err) => {
                eprintln!(
                    "[LOGGER ERROR] {}; re-queued {} log entries for the next flush.",
                    err, entries
                );
                self.requeue(batch);
                self.metrics.record_requeued();
                self.backing_off = true;
                FlushOutcome::Requeued { entries }
            }
        }
    }

    /// Returns the 1-based attempt that succeeded
    fn deliver_with_retry(&mut self, batch: &LogBatch) -> Result<u32> {
        let mut attempt = 1;
        loop {
            match self.transport.deliver(batch) {
                Ok(()) => return Ok(attempt),
                Err(err) => {
                    self.metrics.record_failed_attempt();
                    eprintln!(
                        "[LOGGER WARNING] Delivery attempt {}/{} via {} failed: {}",
                        attempt,
                        self.max_retries,
                        self.transport.name(),
                        err
                    );
                    if attempt >= self.max_retries {
                        return Err(LoggerError::retries_exhausted(attempt, err));
                    }
                    (self.sleeper)(self.backoff.delay(attempt));
                    attempt += 1;
                }
            }
        }
    }

    /// Put a failed batch back ahead of entries pushed since the snapshot
    fn requeue(&mut self, batch: LogBatch) {
        let mut restored = batch.into_entries();
        restored.append(&mut self.buffer);
        self.buffer = restored;
        self.enforce_cap();
    }

    fn enforce_cap(&mut self) {
        let excess = self.buffer.len().saturating_sub(self.max_buffered_entries);
        if excess == 0 {
            return;
        }
        match self.overflow_policy {
            OverflowPolicy::DropOldest => {
                self.buffer.drain(..excess);
            }
            OverflowPolicy::DropNewest => {
                self.buffer.truncate(self.max_buffered_entries);
            }
        }
        self.record_dropped(excess);
    }

    fn record_dropped(&self, count: usize) {
        let previous = self.metrics.record_dropped_many(count);
        alert_dropped(
            previous,
            count as u64,
            "Log buffer full",
            self.on_overflow.as_ref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use crate::transports::MemoryTransport;
    use parking_lot::Mutex;

    fn config(max_buffer_size: usize, max_retries: u32) -> LoggerConfig {
        LoggerConfig {
            max_buffer_size,
            max_retries,
            retry_delay_ms: 100,
            ..LoggerConfig::default()
        }
    }

    fn controller(
        config: &LoggerConfig,
    ) -> (FlushController<MemoryTransport>, MemoryTransport, Arc<Mutex<Vec<Duration>>>) {
        let transport = MemoryTransport::new();
        let delays = Arc::new(Mutex::new(Vec::new()));
        let delays_clone = Arc::clone(&delays);
        let controller = FlushController::new(
            transport.clone(),
            config,
            Arc::new(LoggerMetrics::new()),
        )
        .with_sleeper(Arc::new(move |delay| delays_clone.lock().push(delay)));
        (controller, transport, delays)
    }

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, message)
    }

    fn messages(entries: &[LogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_linear_backoff() {
        let backoff = LinearBackoff::new(Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(5), Duration::from_millis(500));
    }

    #[test]
    fn test_flush_empty_buffer() {
        let (mut controller, transport, _) = controller(&config(10, 3));
        assert_eq!(controller.flush(), FlushOutcome::Empty);
        assert_eq!(transport.attempts(), 0);
    }

    #[test]
    fn test_threshold_triggers_flush() {
        let (mut controller, transport, _) = controller(&config(3, 3));

        let mut a = LogEntry::new(LogLevel::Info, "A");
        a.context.add_field("k", 1);
        assert_eq!(controller.push(a), None);
        assert_eq!(controller.push(LogEntry::new(LogLevel::Warn, "B")), None);
        let outcome = controller.push(LogEntry::new(LogLevel::Error, "C"));

        assert_eq!(outcome, Some(FlushOutcome::Delivered { entries: 3, attempts: 1 }));
        assert!(controller.is_empty());

        let batches = transport.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(messages(&batches[0].entries), vec!["A", "B", "C"]);
        let levels: Vec<_> = batches[0].entries.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error]);
    }

    #[test]
    fn test_retry_bound_and_linear_delays() {
        let (mut controller, transport, delays) = controller(&config(100, 4));
        transport.fail_always(true);

        controller.push(entry("x"));
        assert_eq!(controller.flush(), FlushOutcome::Requeued { entries: 1 });

        assert_eq!(transport.attempts(), 4);
        assert_eq!(
            *delays.lock(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
            ]
        );
        assert_eq!(controller.metrics.failed_attempts(), 4);
        assert_eq!(controller.metrics.requeued_batches(), 1);
    }

    #[test]
    fn test_requeue_then_redeliver_once_in_order() {
        let (mut controller, transport, delays) = controller(&config(100, 2));
        transport.fail_next(2);

        controller.push(entry("1"));
        controller.push(entry("2"));
        assert_eq!(controller.flush(), FlushOutcome::Requeued { entries: 2 });
        assert_eq!(*delays.lock(), vec![Duration::from_millis(100)]);

        controller.push(entry("3"));
        assert_eq!(messages(controller.buffered()), vec!["1", "2", "3"]);

        assert_eq!(
            controller.flush(),
            FlushOutcome::Delivered { entries: 3, attempts: 1 }
        );
        assert_eq!(transport.batches().len(), 1);
        assert_eq!(messages(&transport.delivered_entries()), vec!["1", "2", "3"]);
        assert_eq!(transport.attempts(), 3);
        assert_eq!(controller.metrics.failed_attempts(), 2);
    }

    #[test]
    fn test_requeue_pauses_threshold_until_tick() {
        let (mut controller, transport, _) = controller(&config(2, 1));
        transport.fail_next(1);

        controller.push(entry("a"));
        assert_eq!(
            controller.push(entry("b")),
            Some(FlushOutcome::Requeued { entries: 2 })
        );

        // Over threshold, but no new attempt until the timer fires
        assert_eq!(controller.push(entry("c")), None);
        assert_eq!(transport.attempts(), 1);

        assert_eq!(
            controller.tick(),
            FlushOutcome::Delivered { entries: 3, attempts: 1 }
        );
        assert_eq!(messages(&transport.delivered_entries()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drop_oldest_cap() {
        let config = LoggerConfig {
            max_buffer_size: 100,
            max_buffered_entries: 100,
            ..LoggerConfig::default()
        };
        let (mut controller, _, _) = controller(&config);
        controller.backing_off = true;

        for i in 0..105 {
            controller.push(entry(&i.to_string()));
        }

        assert_eq!(controller.len(), 100);
        assert_eq!(controller.buffered()[0].message, "5");
        assert_eq!(controller.metrics.dropped_count(), 5);
    }

    #[test]
    fn test_drop_newest_cap() {
        let config = LoggerConfig {
            max_buffer_size: 100,
            max_buffered_entries: 100,
            overflow_policy: OverflowPolicy::DropNewest,
            ..LoggerConfig::default()
        };
        let (mut controller, _, _) = controller(&config);
        controller.backing_off = true;

        for i in 0..105 {
            controller.push(entry(&i.to_string()));
        }

        assert_eq!(controller.len(), 100);
        assert_eq!(controller.buffered()[99].message, "99");
        assert_eq!(controller.metrics.dropped_count(), 5);
    }

    #[test]
    fn test_shutdown_drains_once() {
        let (mut controller, transport, _) = controller(&config(100, 3));
        controller.push(entry("last words"));

        assert!(controller.shutdown());
        assert_eq!(transport.batches().len(), 1);

        // Flushes are disabled now, pushes still buffer
        controller.push(entry("late"));
        assert_eq!(controller.flush(), FlushOutcome::Skipped);

        assert!(!controller.shutdown());
        assert_eq!(transport.attempts(), 1);
    }

    #[test]
    fn test_shutdown_failure_counts_lost_entries() {
        let (mut controller, transport, _) = controller(&config(100, 2));
        transport.fail_always(true);
        controller.push(entry("a"));
        controller.push(entry("b"));

        assert!(!controller.shutdown());
        assert!(controller.is_empty());
        assert_eq!(controller.metrics.dropped_count(), 2);
        assert_eq!(transport.attempts(), 2);
    }
}
