//! The base [`Sink`] implementation: composes a formatter and a transport
//! behind per-sink tag routing, a minimum level, and a filter chain. The
//! write path is, in order: tag admission, level admission, filter chain,
//! format, write (§4.5).

use crate::filter::{RuleChain, TagRouting};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::record::Record;
use crate::transport::Transport;

/// A named destination a [`crate::logger::Logger`] fans a record out to.
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;
    /// Offer a record to the sink. The sink decides, independently of the
    /// logger's own global filter, whether to admit and write it.
    fn offer(&self, record: &Record);
    fn flush(&self);
}

pub struct BaseSink {
    name: String,
    formatter: Box<dyn Formatter>,
    transport: Box<dyn Transport>,
    min_level: Level,
    filters: RuleChain,
    tags: TagRouting,
}

impl BaseSink {
    pub fn new(name: impl Into<String>, formatter: Box<dyn Formatter>, transport: Box<dyn Transport>) -> Self {
        Self {
            name: name.into(),
            formatter,
            transport,
            min_level: Level::Trace,
            filters: RuleChain::new(),
            tags: TagRouting::new(),
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_filters(mut self, filters: RuleChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_tags(mut self, tags: TagRouting) -> Self {
        self.tags = tags;
        self
    }

    fn admits(&self, record: &Record) -> bool {
        self.tags.admits(&record.tags) && record.severity >= self.min_level && self.filters.admits(record)
    }
}

impl Sink for BaseSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn offer(&self, record: &Record) {
        if !self.admits(record) {
            return;
        }
        let bytes = self.formatter.format(record);
        if let Err(e) = self.transport.write(&bytes) {
            tracing::error!(sink = %self.name, error = %e, "sink write failed");
        }
    }

    fn flush(&self) {
        if let Err(e) = self.transport.flush() {
            tracing::error!(sink = %self.name, error = %e, "sink flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::human::HumanFormatter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::SystemTime;

    struct CountingTransport(Arc<AtomicUsize>);
    impl Transport for CountingTransport {
        fn write(&self, _: &[u8]) -> std::io::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn flush(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample(severity: Level) -> Record {
        Record {
            severity,
            timestamp: SystemTime::now(),
            message: "hi".to_string(),
            template: "hi".to_string(),
            fingerprint: "00000000".to_string(),
            properties: Vec::new(),
            tags: Vec::new(),
            exception: None,
            source: None,
            context: ahash::AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".to_string(),
        }
    }

    #[test]
    fn below_min_level_is_dropped_before_formatting() {
        let counter = Arc::new(AtomicUsize::new(0));
        let sink = BaseSink::new("test", Box::new(HumanFormatter::default()), Box::new(CountingTransport(counter.clone())))
            .with_min_level(Level::Warn);
        sink.offer(&sample(Level::Info));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        sink.offer(&sample(Level::Error));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
