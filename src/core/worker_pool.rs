//! Background worker pool for per-entry processing
//!
//! Workers share one job queue and no other state. Requests and replies are
//! plain serializable messages:
//!
//! - request: `{ "type": "process", "entry": { ... } }`
//! - reply: `{ "type": "processed", "entry": { ... } }` or
//!   `{ "type": "error", "error": "..." }`
//!
//! A worker answers a malformed request with an error reply and keeps
//! serving; a panic while handling a job is caught, reported on stderr and
//! turned into an error reply.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::metrics::LoggerMetrics;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    Process { entry: LogEntry },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResponse {
    Processed { entry: LogEntry },
    Error { error: String },
}

impl WorkerResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, WorkerResponse::Error { .. })
    }
}

struct Job {
    message: serde_json::Value,
    reply: Sender<WorkerResponse>,
}

/// Handle one raw message the way a worker does
///
/// Well-formed entries come back with control characters in the message
/// escaped and a `worker` field naming the handler.
pub fn handle_message(worker_id: usize, message: serde_json::Value) -> WorkerResponse {
    let request: WorkerRequest = match serde_json::from_value(message) {
        Ok(request) => request,
        Err(e) => {
            return WorkerResponse::Error {
                error: format!("invalid worker message: {}", e),
            }
        }
    };

    match request {
        WorkerRequest::Process { mut entry } => {
            entry.message = LogEntry::sanitize_message(&entry.message);
            entry.context.add_field("worker", worker_id as i64);
            WorkerResponse::Processed { entry }
        }
    }
}

/// Fixed-size pool of named worker threads
pub struct WorkerPool {
    size: usize,
    sender: Mutex<Option<Sender<Job>>>,
    handles: Mutex<Vec<thread::JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
}

impl WorkerPool {
    /// Spawn exactly `size` workers
    pub fn new(size: usize, metrics: Arc<LoggerMetrics>) -> Result<Self> {
        if size == 0 {
            return Err(LoggerError::config("WorkerPool", "size must be positive"));
        }

        let (sender, receiver) = unbounded::<Job>();
        let mut handles = Vec::with_capacity(size);

        for worker_id in 0..size {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("log-worker-{}", worker_id))
                .spawn(move || Self::run_worker(worker_id, receiver))
                .map_err(|e| {
                    LoggerError::io_operation(
                        "spawning log worker",
                        format!("worker {} could not start", worker_id),
                        e,
                    )
                })?;
            handles.push(handle);
        }

        Ok(Self {
            size,
            sender: Mutex::new(Some(sender)),
            handles: Mutex::new(handles),
            metrics,
        })
    }

    fn run_worker(worker_id: usize, receiver: Receiver<Job>) {
        for job in receiver.iter() {
            let Job { message, reply } = job;
            let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handle_message(worker_id, message)
            }));

            let response = match response {
                Ok(response) => response,
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Log worker #{} panicked: {}. Worker keeps running.",
                        worker_id, panic_msg
                    );
                    WorkerResponse::Error {
                        error: format!("worker panicked: {}", panic_msg),
                    }
                }
            };

            // The caller may have stopped waiting
            let _ = reply.send(response);
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_terminated(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Queue a raw message; the reply arrives on the returned receiver
    pub fn dispatch(&self, message: serde_json::Value) -> Result<Receiver<WorkerResponse>> {
        let (reply, response) = bounded(1);
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(LoggerError::WorkerPoolTerminated)?;
        sender
            .send(Job { message, reply })
            .map_err(|_| LoggerError::WorkerPoolTerminated)?;
        Ok(response)
    }

    /// Send a raw message and wait for the reply
    ///
    /// Error replies are reported on stderr and returned, not raised.
    pub fn process(&self, message: serde_json::Value) -> Result<WorkerResponse> {
        let response = self
            .dispatch(message)?
            .recv()
            .map_err(|_| LoggerError::WorkerPoolTerminated)?;

        if let WorkerResponse::Error { ref error } = response {
            self.metrics.record_worker_error();
            eprintln!("[LOGGER WARNING] Log worker rejected message: {}", error);
        }
        Ok(response)
    }

    /// Run an entry through a worker and return the processed copy
    pub fn process_entry(&self, entry: &LogEntry) -> Result<LogEntry> {
        let message = serde_json::to_value(WorkerRequest::Process {
            entry: entry.clone(),
        })?;
        match self.process(message)? {
            WorkerResponse::Processed { entry } => Ok(entry),
            WorkerResponse::Error { error } => Err(LoggerError::malformed(error)),
        }
    }

    /// Stop every worker and wait for them to exit
    ///
    /// Returns `false` if the pool was already terminated.
    pub fn terminate(&self) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            return false;
        };
        drop(sender);

        let handles = std::mem::take(&mut *self.handles.lock());
        for (idx, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Log worker #{} exited abnormally", idx);
            }
        }
        true
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate();
    }
}
