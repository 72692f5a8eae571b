//! In-process transport that records batches
//!
//! Useful for tests and local development. Clones share the same recording,
//! so a handle kept by the caller observes what the flusher thread delivered.

use super::Transport;
use crate::core::{LogBatch, LogEntry, LoggerError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Recording {
    batches: Vec<LogBatch>,
    attempts: usize,
    fail_next: usize,
    fail_always: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Recording>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` delivery attempts
    pub fn fail_next(&self, count: usize) {
        self.inner.lock().fail_next = count;
    }

    /// Fail every attempt until switched off
    pub fn fail_always(&self, enable: bool) {
        self.inner.lock().fail_always = enable;
    }

    /// Successfully delivered batches, in delivery order
    pub fn batches(&self) -> Vec<LogBatch> {
        self.inner.lock().batches.clone()
    }

    /// All delivered entries, flattened in delivery order
    pub fn delivered_entries(&self) -> Vec<LogEntry> {
        self.inner
            .lock()
            .batches
            .iter()
            .flat_map(|batch| batch.entries.iter().cloned())
            .collect()
    }

    /// Delivery attempts, failed ones included
    pub fn attempts(&self) -> usize {
        self.inner.lock().attempts
    }
}

impl Transport for MemoryTransport {
    fn deliver(&mut self, batch: &LogBatch) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.attempts += 1;

        if inner.fail_always {
            return Err(LoggerError::other("memory transport: forced failure"));
        }
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(LoggerError::other("memory transport: scripted failure"));
        }

        inner.batches.push(batch.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
