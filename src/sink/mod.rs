//! Sinks: named destinations the logger fans a record out to (§4.5, §6).

pub mod async_sink;
pub mod base;
pub mod batched_sink;
pub mod rolling;

pub use async_sink::{AsyncSink, OverflowPolicy};
pub use base::{BaseSink, Sink};
pub use batched_sink::{BatchedSink, BatchedSinkConfig, BatchedSinkHandle};
pub use rolling::RollingFileSink;
