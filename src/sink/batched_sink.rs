//! Batched sink: accumulates formatted records and writes them as one batch
//! on a size trigger, a time trigger, or an explicit flush, retrying a
//! failed batch write with exponential backoff before giving up and
//! reporting it to `on_batch_error` (§4.5).

use crate::formatter::Formatter;
use crate::record::Record;
use crate::transport::Transport;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::base::Sink;

struct Queue {
    records: VecDeque<Record>,
    shutdown: bool,
    force_flush: bool,
}

/// Configuration for [`BatchedSink`].
pub struct BatchedSinkConfig {
    pub name: String,
    pub batch_size: usize,
    pub batch_interval: Duration,
    pub queue_capacity: usize,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for BatchedSinkConfig {
    fn default() -> Self {
        Self {
            name: "batched".to_string(),
            batch_size: 100,
            batch_interval: Duration::from_secs(1),
            queue_capacity: 10_000,
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

pub struct BatchedSink {
    name: String,
    queue: Arc<Mutex<Queue>>,
    not_empty: Arc<Condvar>,
    dropped: Arc<AtomicU64>,
    stopped: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
    flushed_batches: Arc<AtomicU64>,
}

impl BatchedSink {
    pub fn new(
        config: BatchedSinkConfig,
        formatter: Box<dyn Formatter>,
        transport: Box<dyn Transport>,
        on_batch_error: Option<Box<dyn Fn(&[Record], &str) + Send + Sync>>,
        on_flush: Option<Box<dyn Fn(usize) + Send + Sync>>,
    ) -> Self {
        let queue = Arc::new(Mutex::new(Queue { records: VecDeque::new(), shutdown: false, force_flush: false }));
        let not_empty = Arc::new(Condvar::new());
        let dropped = Arc::new(AtomicU64::new(0));
        let flushed_batches = Arc::new(AtomicU64::new(0));

        let worker = {
            let queue = queue.clone();
            let not_empty = not_empty.clone();
            let flushed_batches = flushed_batches.clone();
            let batch_size = config.batch_size;
            let batch_interval = config.batch_interval;
            let max_retries = config.max_retries;
            let retry_backoff = config.retry_backoff;

            std::thread::spawn(move || loop {
                let batch = {
                    let mut guard = queue.lock();
                    while guard.records.len() < batch_size && !guard.force_flush && !guard.shutdown {
                        if not_empty.wait_for(&mut guard, batch_interval).timed_out() {
                            break;
                        }
                    }
                    guard.force_flush = false;
                    let take = guard.records.len().min(batch_size);
                    guard.records.drain(..take).collect::<Vec<_>>()
                };

                if batch.is_empty() {
                    let done = queue.lock().shutdown;
                    if done {
                        break;
                    }
                    continue;
                }

                let mut body = Vec::new();
                for record in &batch {
                    body.extend_from_slice(&formatter.format(record));
                    body.push(b'\n');
                }

                let mut attempt = 0;
                loop {
                    match transport.write(&body) {
                        Ok(()) => break,
                        Err(e) => {
                            if attempt >= max_retries {
                                if let Some(cb) = &on_batch_error {
                                    cb(&batch, &e.to_string());
                                }
                                break;
                            }
                            std::thread::sleep(retry_backoff * 2u32.pow(attempt));
                            attempt += 1;
                        }
                    }
                }

                flushed_batches.fetch_add(1, Ordering::SeqCst);
                if let Some(cb) = &on_flush {
                    cb(batch.len());
                }

                let done = {
                    let guard = queue.lock();
                    guard.shutdown && guard.records.is_empty()
                };
                if done {
                    break;
                }
            })
        };

        Self {
            name: config.name,
            queue,
            not_empty,
            dropped,
            stopped: AtomicBool::new(false),
            worker: Mutex::new(Some(worker)),
            flushed_batches,
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn flushed_batch_count(&self) -> u64 {
        self.flushed_batches.load(Ordering::SeqCst)
    }

    fn push(&self, record: Record, capacity: usize) {
        let mut guard = self.queue.lock();
        if guard.records.len() >= capacity {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            return;
        }
        guard.records.push_back(record);
        drop(guard);
        self.not_empty.notify_one();
    }

    /// Force an immediate flush of whatever is queued, without waiting for
    /// `batch_size` or `batch_interval`.
    pub fn flush_now(&self) {
        {
            let mut guard = self.queue.lock();
            guard.force_flush = true;
        }
        self.not_empty.notify_one();
    }

    /// Idempotent: stop accepting further drains, flush what remains, and
    /// join the worker thread. Safe to call more than once.
    pub fn stop_and_flush(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        {
            let mut guard = self.queue.lock();
            guard.shutdown = true;
            guard.force_flush = true;
        }
        self.not_empty.notify_all();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BatchedSink {
    fn drop(&mut self) {
        self.stop_and_flush();
    }
}

/// Queue capacity used by the `Sink::offer` plumbing; configured once at
/// construction and stored redundantly here since `Queue` itself has none.
pub struct BatchedSinkHandle {
    sink: Arc<BatchedSink>,
    queue_capacity: usize,
}

impl BatchedSinkHandle {
    pub fn new(sink: BatchedSink, queue_capacity: usize) -> Self {
        Self { sink: Arc::new(sink), queue_capacity }
    }
}

impl Sink for BatchedSinkHandle {
    fn name(&self) -> &str {
        &self.sink.name
    }

    fn offer(&self, record: &Record) {
        self.sink.push(record.clone(), self.queue_capacity);
    }

    fn flush(&self) {
        self.sink.flush_now();
    }
}
