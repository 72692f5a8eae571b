//! Eviction policies for the bounded log buffer
//!
//! The buffer keeps failed batches for redelivery, so a long endpoint outage
//! would grow it without limit. Once `max_buffered_entries` is reached, the
//! policy decides which entries are given up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Policy applied when the buffer exceeds its hard cap
///
/// # Example
///
/// ```
/// use log_shipper::OverflowPolicy;
///
/// assert_eq!(OverflowPolicy::default(), OverflowPolicy::DropOldest);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Evict from the front of the buffer (the oldest entries)
    ///
    /// Keeps the most recent picture of the application.
    #[default]
    DropOldest,

    /// Reject new entries while the buffer is full
    ///
    /// Keeps the earliest entries, e.g. the lead-up to an incident.
    DropNewest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when entries are dropped. The parameter is the total count of
/// dropped entries so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Alert on the first drop and every 1000th thereafter
pub(crate) fn should_alert(previous_dropped: u64, newly_dropped: u64) -> bool {
    let total = previous_dropped + newly_dropped;
    previous_dropped == 0 || total / 1000 > previous_dropped / 1000
}

/// Report dropped entries on stderr and through the callback
pub(crate) fn alert_dropped(
    previous_dropped: u64,
    newly_dropped: u64,
    reason: &str,
    on_overflow: Option<&OverflowCallback>,
) {
    if newly_dropped == 0 || !should_alert(previous_dropped, newly_dropped) {
        return;
    }
    let total = previous_dropped + newly_dropped;
    eprintln!("[LOGGER WARNING] {}, {} log entries dropped so far.", reason, total);
    if let Some(callback) = on_overflow {
        callback(total);
    }
}
