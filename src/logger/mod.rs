//! The logger facade: owns the sink list, template engine, context
//! enrichers, global filter chain, and rate limiter, and is the single
//! place a [`Record`](crate::record::Record) is assembled and fanned out
//! (§4.5).

pub mod builder;
pub mod global;
pub mod rate_limit;

pub use builder::LoggerBuilder;

use crate::context::{self, Enricher};
use crate::error::{Error, Result};
use crate::filter::RuleChain;
use crate::level::Level;
use crate::record::{ExceptionInfo, Record, SourceLocation};
use crate::sink::Sink;
use crate::template::{Arg, TemplateEngine};
use arc_swap::ArcSwapOption;
use parking_lot::RwLock;
use rate_limit::RateLimiter;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// One optional piece of extra call-site information for a log call.
#[derive(Default)]
pub struct LogCall<'a> {
    pub exception: Option<&'a (dyn std::error::Error + 'static)>,
    pub source: Option<SourceLocation>,
}

pub struct Logger {
    min_level: AtomicU8,
    engine: TemplateEngine,
    enrichers: RwLock<Vec<Arc<dyn Enricher>>>,
    filters: RwLock<RuleChain>,
    rate_limiter: ArcSwapOption<RateLimiter>,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    started: AtomicBool,
    dropped_by_rate_limit: AtomicU64,
    locale: String,
}

impl Logger {
    pub(crate) fn new(
        min_level: Level,
        template_cache_capacity: usize,
        rate_limiter: Option<RateLimiter>,
        sinks: Vec<Arc<dyn Sink>>,
        filters: RuleChain,
        enrichers: Vec<Arc<dyn Enricher>>,
        locale: String,
    ) -> Self {
        Self {
            min_level: AtomicU8::new(min_level as u8),
            engine: TemplateEngine::new(template_cache_capacity),
            enrichers: RwLock::new(enrichers),
            filters: RwLock::new(filters),
            rate_limiter: ArcSwapOption::from(rate_limiter.map(Arc::new)),
            sinks: RwLock::new(sinks),
            started: AtomicBool::new(false),
            dropped_by_rate_limit: AtomicU64::new(0),
            locale,
        }
    }

    pub fn min_level(&self) -> Level {
        Level::ALL[self.min_level.load(Ordering::Relaxed) as usize]
    }

    pub fn set_min_level(&self, level: Level) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level()
    }

    pub fn dropped_by_rate_limit(&self) -> u64 {
        self.dropped_by_rate_limit.load(Ordering::Relaxed)
    }

    /// Replace the rate limiter. Unlike `add_sink`/`add_enricher`, this is
    /// valid before or after the first record has been accepted (§4.10).
    pub fn set_rate_limit(&self, capacity: u32, refill_per_sec: f64) {
        self.rate_limiter.store(Some(Arc::new(RateLimiter::new(capacity, refill_per_sec))));
    }

    /// Remove any configured rate limit, letting every admitted record through.
    pub fn clear_rate_limit(&self) {
        self.rate_limiter.store(None);
    }

    fn check_not_started(&self, op: &'static str) -> Result<()> {
        if self.started.load(Ordering::Acquire) {
            Err(Error::LoggerAlreadyStarted(op))
        } else {
            Ok(())
        }
    }

    pub fn add_sink(&self, sink: Arc<dyn Sink>) -> Result<()> {
        self.check_not_started("add_sink")?;
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|s| s.name() == sink.name()) {
            return Err(Error::DuplicateSinkName(sink.name().to_string()));
        }
        sinks.push(sink);
        Ok(())
    }

    pub fn remove_sink(&self, name: &str) -> Result<()> {
        self.check_not_started("remove_sink")?;
        let mut sinks = self.sinks.write();
        let before = sinks.len();
        sinks.retain(|s| s.name() != name);
        if sinks.len() == before {
            return Err(Error::UnknownSink(name.to_string()));
        }
        Ok(())
    }

    pub fn add_enricher(&self, enricher: Arc<dyn Enricher>) -> Result<()> {
        self.check_not_started("add_enricher")?;
        self.enrichers.write().push(enricher);
        Ok(())
    }

    pub fn set_template_cache_size(&self, capacity: usize) -> Result<()> {
        self.check_not_started("set_template_cache_size")?;
        self.engine.resize_cache(capacity);
        Ok(())
    }

    pub fn add_filter_expression(&self, expr: &str) -> Result<()> {
        self.check_not_started("add_filter_expression")?;
        let parsed = crate::filter::expression_dsl::parse(expr).map_err(Error::InvalidFilterExpression)?;
        self.filters.write().push(Box::new(parsed));
        Ok(())
    }

    fn build_record(&self, severity: Level, template: &str, args: &[Arg], call: LogCall<'_>) -> (Record, Vec<String>) {
        let rendered = self.engine.render(template, args);
        let ctx = context::build_context(&self.enrichers.read());
        let exception = call.exception.map(ExceptionInfo::from_error);
        let record = Record {
            severity,
            timestamp: SystemTime::now(),
            message: rendered.message,
            template: rendered.content_template,
            fingerprint: rendered.fingerprint,
            properties: rendered.properties,
            tags: rendered.tags,
            exception,
            source: call.source,
            context: ctx,
            thread: std::thread::current().id(),
            locale: self.locale.clone(),
        };
        (record, rendered.warnings)
    }

    fn fan_out(&self, record: &Record) {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            let sink = sink.clone();
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.offer(record)));
            if result.is_err() {
                tracing::error!(sink = %sink.name(), "sink panicked while offering a record; other sinks are unaffected");
            }
        }
    }

    fn emit_validation_warnings(&self, source_template: &str, warnings: &[String], timestamp: SystemTime) {
        for warning in warnings {
            let message = format!("template validation warning in '{source_template}': {warning}");
            let record = Record {
                severity: Level::Warn,
                timestamp,
                message: message.clone(),
                template: message,
                fingerprint: crate::template::fingerprint::fingerprint(source_template),
                properties: Vec::new(),
                tags: vec!["template-validation".to_string()],
                exception: None,
                source: None,
                context: ahash::AHashMap::new(),
                thread: std::thread::current().id(),
                locale: self.locale.clone(),
            };
            if self.filters.read().admits(&record) {
                self.fan_out(&record);
            }
        }
    }

    /// Render and dispatch one log call. A no-op below the logger's
    /// configured minimum level. Validation warnings produced while
    /// rendering `template` are emitted as their own records and never
    /// consume rate-limit budget (P7); the call's own record does.
    pub fn log(&self, severity: Level, template: &str, args: &[Arg], call: LogCall<'_>) {
        if !self.enabled(severity) {
            return;
        }
        self.started.store(true, Ordering::Release);

        let (record, warnings) = self.build_record(severity, template, args, call);
        let timestamp = record.timestamp;

        if let Some(limiter) = self.rate_limiter.load_full() {
            if !limiter.try_acquire() {
                self.dropped_by_rate_limit.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        if !self.filters.read().admits(&record) {
            return;
        }

        self.fan_out(&record);

        if !warnings.is_empty() {
            self.emit_validation_warnings(template, &warnings, timestamp);
        }
    }

    pub fn trace(&self, template: &str, args: &[Arg]) {
        self.log(Level::Trace, template, args, LogCall::default());
    }
    pub fn debug(&self, template: &str, args: &[Arg]) {
        self.log(Level::Debug, template, args, LogCall::default());
    }
    pub fn info(&self, template: &str, args: &[Arg]) {
        self.log(Level::Info, template, args, LogCall::default());
    }
    pub fn warn(&self, template: &str, args: &[Arg]) {
        self.log(Level::Warn, template, args, LogCall::default());
    }
    pub fn error(&self, template: &str, args: &[Arg]) {
        self.log(Level::Error, template, args, LogCall::default());
    }
    pub fn fatal(&self, template: &str, args: &[Arg]) {
        self.log(Level::Fatal, template, args, LogCall::default());
    }

    /// Flush every sink; sibling sinks are unaffected if one is slow or
    /// erroring (logged internally).
    pub fn flush(&self) {
        for sink in self.sinks.read().iter() {
            let sink = sink.clone();
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.flush()));
            if result.is_err() {
                tracing::error!(sink = %sink.name(), "sink panicked while flushing; other sinks are unaffected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::human::HumanFormatter;
    use crate::sink::base::BaseSink;
    use std::sync::atomic::AtomicUsize;

    struct CountingTransport(Arc<AtomicUsize>);
    impl crate::transport::Transport for CountingTransport {
        fn write(&self, _: &[u8]) -> std::io::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn flush(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logger_with_counting_sink() -> (Logger, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let sink: Arc<dyn Sink> =
            Arc::new(BaseSink::new("test", Box::new(HumanFormatter::default()), Box::new(CountingTransport(count.clone()))));
        let logger = Logger::new(Level::Trace, 64, None, vec![sink], RuleChain::new(), Vec::new(), "en-US".to_string());
        (logger, count)
    }

    #[test]
    fn below_min_level_never_renders_or_dispatches() {
        let (logger, count) = logger_with_counting_sink();
        logger.set_min_level(Level::Error);
        logger.info("hello {name}", &[Arg::Str("x".into())]);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatches_to_sinks_once_enabled() {
        let (logger, count) = logger_with_counting_sink();
        logger.info("hello {name}", &[Arg::Str("x".into())]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mutation_after_first_log_call_is_rejected() {
        let (logger, _count) = logger_with_counting_sink();
        logger.info("first call", &[]);
        let extra: Arc<dyn Sink> =
            Arc::new(BaseSink::new("extra", Box::new(HumanFormatter::default()), Box::new(CountingTransport(Arc::new(AtomicUsize::new(0))))));
        assert!(logger.add_sink(extra).is_err());
    }

    #[test]
    fn template_cache_size_is_fenced_after_start() {
        let (logger, _count) = logger_with_counting_sink();
        assert!(logger.set_template_cache_size(32).is_ok());
        logger.info("first call", &[]);
        assert!(logger.set_template_cache_size(64).is_err());
    }

    #[test]
    fn rate_limit_is_settable_after_logging_has_started() {
        let (logger, count) = logger_with_counting_sink();
        logger.info("first call", &[]);
        logger.set_rate_limit(1, 1.0);
        logger.info("second call", &[]);
        logger.info("third call dropped by new limit", &[]);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(logger.dropped_by_rate_limit(), 1);
    }

    #[test]
    fn duplicate_sink_name_is_rejected() {
        let (logger, _count) = logger_with_counting_sink();
        let dup: Arc<dyn Sink> =
            Arc::new(BaseSink::new("test", Box::new(HumanFormatter::default()), Box::new(CountingTransport(Arc::new(AtomicUsize::new(0))))));
        assert!(logger.add_sink(dup).is_err());
    }

    #[test]
    fn validation_warning_is_emitted_as_its_own_record() {
        let (logger, count) = logger_with_counting_sink();
        logger.info("{}", &[]); // empty placeholder name triggers a parse warning
        // one record for the warning, one for the (empty-named) call itself
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
