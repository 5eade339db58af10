//! Asynchronous sink wrapper: records are queued and a background thread
//! drains them into an inner [`Sink`], so the calling thread never blocks
//! on formatting or I/O (§4.5, P4). Grounded in the buffered background
//! writer pattern this crate's predecessor used for its async file writer,
//! generalized to a bounded queue with a pluggable overflow policy.

use super::base::Sink;
use crate::record::Record;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// What happens when the queue is full and a new record arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Block the caller until room is available.
    Block,
    /// Discard the incoming record.
    DropNewest,
    /// Discard the oldest queued record to make room for the incoming one.
    DropOldest,
}

enum Item {
    Record(Record),
    /// A flush barrier: the worker marks `processed` with this token's id
    /// once every record queued before it has been drained.
    Flush(u64),
}

struct Queue {
    items: VecDeque<Item>,
    shutdown: bool,
}

/// A sink that hands records to a background thread for draining into an
/// inner sink.
pub struct AsyncSink {
    inner: Arc<dyn Sink>,
    capacity: usize,
    overflow: OverflowPolicy,
    queue: Arc<Mutex<Queue>>,
    not_empty: Arc<Condvar>,
    not_full: Arc<Condvar>,
    dropped: Arc<AtomicU64>,
    flush_counter: Arc<AtomicU64>,
    processed: Arc<AtomicU64>,
    flush_done: Arc<Condvar>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl AsyncSink {
    pub fn new(inner: Arc<dyn Sink>, capacity: usize, overflow: OverflowPolicy) -> Self {
        let queue = Arc::new(Mutex::new(Queue { items: VecDeque::with_capacity(capacity.min(1024)), shutdown: false }));
        let not_empty = Arc::new(Condvar::new());
        let not_full = Arc::new(Condvar::new());
        let flush_done = Arc::new(Condvar::new());
        let dropped = Arc::new(AtomicU64::new(0));
        let flush_counter = Arc::new(AtomicU64::new(0));
        let processed = Arc::new(AtomicU64::new(0));

        let worker_handle = {
            let queue = queue.clone();
            let not_empty = not_empty.clone();
            let not_full = not_full.clone();
            let flush_done = flush_done.clone();
            let processed = processed.clone();
            let inner = inner.clone();
            std::thread::spawn(move || loop {
                let item = {
                    let mut guard = queue.lock();
                    loop {
                        if let Some(item) = guard.items.pop_front() {
                            not_full.notify_one();
                            break Some(item);
                        }
                        if guard.shutdown {
                            break None;
                        }
                        not_empty.wait(&mut guard);
                    }
                };
                match item {
                    Some(Item::Record(record)) => inner.offer(&record),
                    Some(Item::Flush(token)) => {
                        processed.store(token, Ordering::SeqCst);
                        flush_done.notify_all();
                    }
                    None => break,
                }
            })
        };

        Self {
            inner,
            capacity: capacity.max(1),
            overflow,
            queue,
            not_empty,
            not_full,
            dropped,
            flush_counter,
            processed,
            flush_done,
            worker: Mutex::new(Some(worker_handle)),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    fn push(&self, item: Item) {
        let mut guard = self.queue.lock();
        match self.overflow {
            OverflowPolicy::Block => {
                while guard.items.len() >= self.capacity && !guard.shutdown {
                    self.not_full.wait(&mut guard);
                }
                guard.items.push_back(item);
            }
            OverflowPolicy::DropNewest => {
                if guard.items.len() >= self.capacity {
                    self.dropped.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                guard.items.push_back(item);
            }
            OverflowPolicy::DropOldest => {
                if guard.items.len() >= self.capacity {
                    guard.items.pop_front();
                    self.dropped.fetch_add(1, Ordering::SeqCst);
                }
                guard.items.push_back(item);
            }
        }
        drop(guard);
        self.not_empty.notify_one();
    }

    /// Block until every record enqueued before this call has been drained
    /// into the inner sink and flushed.
    pub fn flush_blocking(&self) {
        let token = self.flush_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.push(Item::Flush(token));
        let mut guard = self.queue.lock();
        while self.processed.load(Ordering::SeqCst) < token {
            self.flush_done.wait(&mut guard);
        }
    }

    /// Signal shutdown, wake the worker, and join it. Safe to call more
    /// than once.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        {
            let mut guard = self.queue.lock();
            guard.shutdown = true;
        }
        self.not_empty.notify_all();
        self.not_full.notify_all();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Sink for AsyncSink {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn offer(&self, record: &Record) {
        self.push(Item::Record(record.clone()));
    }

    fn flush(&self) {
        self.flush_blocking();
        self.inner.flush();
    }
}
