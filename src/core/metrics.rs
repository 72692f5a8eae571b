//! Logger metrics for observability
//!
//! Counters for monitoring shipper health: accepted and delivered entries,
//! failed delivery attempts, re-queued batches and dropped entries.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use log_shipper::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_logged();
/// metrics.record_delivered(1);
///
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.entries_delivered(), 1);
/// assert_eq!(metrics.batches_delivered(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Log calls made, whether or not the entry was kept
    total_logged: AtomicU64,

    /// Entries acknowledged by the endpoint
    entries_delivered: AtomicU64,

    /// Successful delivery requests
    batches_delivered: AtomicU64,

    /// Delivery attempts that failed (network, timeout, non-2xx)
    failed_attempts: AtomicU64,

    /// Flush cycles that exhausted retries and re-queued their batch
    requeued_batches: AtomicU64,

    /// Entries lost to eviction, a full queue, or a stopped logger
    dropped_count: AtomicU64,

    /// Number of times the command queue was full
    queue_full_events: AtomicU64,

    /// Error replies from workers, panics included
    worker_errors: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            entries_delivered: AtomicU64::new(0),
            batches_delivered: AtomicU64::new(0),
            failed_attempts: AtomicU64::new(0),
            requeued_batches: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            worker_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn entries_delivered(&self) -> u64 {
        self.entries_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_delivered(&self) -> u64 {
        self.batches_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn requeued_batches(&self) -> u64 {
        self.requeued_batches.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn worker_errors(&self) -> u64 {
        self.worker_errors.load(Ordering::Relaxed)
    }

    /// Record an accepted entry
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a successful batch of `entries` entries
    #[inline]
    pub fn record_delivered(&self, entries: usize) {
        self.entries_delivered
            .fetch_add(entries as u64, Ordering::Relaxed);
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed_attempt(&self) -> u64 {
        self.failed_attempts.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_requeued(&self) -> u64 {
        self.requeued_batches.fetch_add(1, Ordering::Relaxed)
    }

    /// Record one dropped entry, returning the previous total
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.record_dropped_many(1)
    }

    /// Record several dropped entries, returning the previous total
    #[inline]
    pub fn record_dropped_many(&self, count: usize) -> u64 {
        self.dropped_count.fetch_add(count as u64, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_worker_error(&self) -> u64 {
        self.worker_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0) of accepted entries
    ///
    /// Returns 0.0 if nothing has been logged.
    pub fn drop_rate(&self) -> f64 {
        let total = self.total_logged() as f64;
        if total == 0.0 {
            0.0
        } else {
            (self.dropped_count() as f64 / total * 100.0).min(100.0)
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.total_logged.store(0, Ordering::Relaxed);
        self.entries_delivered.store(0, Ordering::Relaxed);
        self.batches_delivered.store(0, Ordering::Relaxed);
        self.failed_attempts.store(0, Ordering::Relaxed);
        self.requeued_batches.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.queue_full_events.store(0, Ordering::Relaxed);
        self.worker_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            total_logged: AtomicU64::new(self.total_logged()),
            entries_delivered: AtomicU64::new(self.entries_delivered()),
            batches_delivered: AtomicU64::new(self.batches_delivered()),
            failed_attempts: AtomicU64::new(self.failed_attempts()),
            requeued_batches: AtomicU64::new(self.requeued_batches()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
            worker_errors: AtomicU64::new(self.worker_errors()),
        }
    }
}
