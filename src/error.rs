//! Error types surfaced to callers.
//!
//! Follows the teacher's pattern of one flat enum with a `Display` impl and
//! a crate-wide `Result` alias, rather than per-module error types — the
//! library has few fallible entry points (filter DSL parsing, sink
//! registration, transport construction) and callers handle them uniformly.

use std::fmt;

/// Errors returned by the logging core's public, fallible entry points.
#[derive(Debug)]
pub enum Error {
    /// A filter DSL string (expression or compact) failed to parse.
    InvalidFilterExpression(String),
    /// `add_sink` was called with a name already in use.
    DuplicateSinkName(String),
    /// A mutation API (`add_sink`, `enrich`, `set_template_cache_size`, ...)
    /// was called after the logger had already accepted a record.
    LoggerAlreadyStarted(&'static str),
    /// A lookup by sink name found nothing.
    UnknownSink(String),
    /// A transport failed to acquire its backing resource at construction.
    TransportOpen(String),
    /// A builder was built more than once.
    BuilderAlreadyBuilt,
    /// The process-wide facade was used before `Logger::init`.
    FacadeNotInitialized,
    /// Invalid configuration value supplied (rate limit, cache size, HTTP URL, ...).
    InvalidConfiguration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFilterExpression(msg) => write!(f, "invalid filter expression: {msg}"),
            Error::DuplicateSinkName(name) => write!(f, "duplicate name: sink '{name}' already exists"),
            Error::LoggerAlreadyStarted(op) => {
                write!(f, "logger already started: cannot {op} after the first record was accepted")
            }
            Error::UnknownSink(name) => write!(f, "unknown sink: '{name}'"),
            Error::TransportOpen(msg) => write!(f, "failed to open transport: {msg}"),
            Error::BuilderAlreadyBuilt => write!(f, "this LoggerBuilder has already been built"),
            Error::FacadeNotInitialized => {
                write!(f, "the global logging facade has not been initialized; call Logger::init first")
            }
            Error::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_descriptive() {
        let e = Error::DuplicateSinkName("audit".into());
        assert!(e.to_string().contains("duplicate name"));
        assert!(e.to_string().contains("audit"));

        let e = Error::LoggerAlreadyStarted("add_sink");
        assert!(e.to_string().contains("logger already started"));
    }
}
