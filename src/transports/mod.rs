//! Delivery channels for log batches

pub mod http;
pub mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::core::{LogBatch, Result};

/// Destination for flushed batches
///
/// A transport performs exactly one delivery attempt per call; retry and
/// backoff belong to the flush controller that drives it.
pub trait Transport: Send {
    fn deliver(&mut self, batch: &LogBatch) -> Result<()>;
    fn name(&self) -> &str;
}

impl Transport for Box<dyn Transport> {
    fn deliver(&mut self, batch: &LogBatch) -> Result<()> {
        (**self).deliver(batch)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
