//! # minta-log - Structured Application Logging Core
//!
//! A structured, high-throughput logging core: a template engine with
//! FNV-1a fingerprinting, process/thread context propagation, an ordered
//! filter chain with two string DSLs, and a multi-sink architecture
//! (synchronous, async-queued, batched, and rolling-file).
//!
//! ## Architecture
//!
//! The library is organized into focused modules:
//! - `template`: placeholder grammar, binding discipline, pipe transforms,
//!   format specifiers, and the parsed-template cache
//! - `context`: process-wide global context, thread-local scopes, enrichers
//! - `filter`: the rule-chain primitive, two filter DSLs, and tag routing
//! - `transport`: byte-oriented write destinations (stream, file, HTTP,
//!   syslog)
//! - `formatter`: record-to-bytes renderers (human, JSON, compact JSON,
//!   XML, and a configurable output template)
//! - `sink`: named destinations combining a formatter and a transport
//!   behind admission rules, with async, batched, and rolling-file variants
//! - `logger`: the `Logger` facade, its builder, rate limiting, and an
//!   optional process-wide singleton
//!
//! ## Features
//!
//! - Deterministic template fingerprinting independent of argument values
//! - Three binding disciplines resolved automatically per call (indexed,
//!   key-value, positional)
//! - Context propagation across threads via explicit scopes, not
//!   thread-locals alone
//! - Filter chains expressible as Rust closures or as parsed DSL strings
//! - Sibling-sink isolation: one sink panicking or erroring never affects
//!   another
//! - Async, batched, and size/time-rotated file sinks built on the same
//!   `Sink`/`Transport` seams as the synchronous ones

pub mod context;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod level;
pub mod logger;
pub mod record;
pub mod sink;
pub mod template;
pub mod transport;

pub use context::{Enricher, Scope};
pub use error::{Error, Result};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use record::{ExceptionInfo, Operator, Property, Record, SourceLocation};
pub use template::Arg;
