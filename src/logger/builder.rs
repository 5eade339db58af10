//! Fluent construction of a [`Logger`] (§4.5, §7).
//!
//! A builder can only be built once: a second call to [`LoggerBuilder::build`]
//! returns [`Error::BuilderAlreadyBuilt`] rather than silently handing back a
//! second, independent logger.

use super::rate_limit::RateLimiter;
use super::Logger;
use crate::context::Enricher;
use crate::error::{Error, Result};
use crate::filter::RuleChain;
use crate::level::Level;
use crate::sink::Sink;
use parking_lot::Mutex;
use std::sync::Arc;

struct State {
    min_level: Level,
    template_cache_capacity: usize,
    rate_limit: Option<(u32, f64)>,
    sinks: Vec<Arc<dyn Sink>>,
    filters: RuleChain,
    enrichers: Vec<Arc<dyn Enricher>>,
    locale: String,
}

impl Default for State {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            template_cache_capacity: 1024,
            rate_limit: None,
            sinks: Vec::new(),
            filters: RuleChain::new(),
            enrichers: Vec::new(),
            locale: "en-US".to_string(),
        }
    }
}

/// Builds a [`Logger`]. Each setter consumes and returns `self` in the usual
/// fluent style; the builder itself holds its accumulated state behind a
/// mutex so `build` can detect reuse without requiring `self` by value.
pub struct LoggerBuilder {
    state: Mutex<Option<State>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self { state: Mutex::new(Some(State::default())) }
    }

    fn with_state(self, f: impl FnOnce(&mut State)) -> Self {
        if let Some(state) = self.state.lock().as_mut() {
            f(state);
        }
        self
    }

    pub fn min_level(self, level: Level) -> Self {
        self.with_state(|s| s.min_level = level)
    }

    pub fn template_cache_capacity(self, capacity: usize) -> Self {
        self.with_state(|s| s.template_cache_capacity = capacity)
    }

    /// Cap sustained record throughput to `capacity` tokens refilling at
    /// `refill_per_sec` tokens/second (§4.5, P7).
    pub fn rate_limit(self, capacity: u32, refill_per_sec: f64) -> Self {
        self.with_state(|s| s.rate_limit = Some((capacity, refill_per_sec)))
    }

    pub fn sink(self, sink: Arc<dyn Sink>) -> Self {
        self.with_state(|s| s.sinks.push(sink))
    }

    pub fn filter(self, rule: Box<dyn crate::filter::FilterRule>) -> Self {
        self.with_state(|s| s.filters.push(rule))
    }

    pub fn enricher(self, enricher: Arc<dyn Enricher>) -> Self {
        self.with_state(|s| s.enrichers.push(enricher))
    }

    pub fn locale(self, locale: impl Into<String>) -> Self {
        self.with_state(|s| s.locale = locale.into())
    }

    /// Consume the accumulated configuration and produce a [`Logger`].
    /// Returns [`Error::BuilderAlreadyBuilt`] if called more than once, and
    /// [`Error::DuplicateSinkName`] if two sinks were registered under the
    /// same name.
    pub fn build(&self) -> Result<Logger> {
        let mut guard = self.state.lock();
        let state = guard.take().ok_or(Error::BuilderAlreadyBuilt)?;

        let mut seen = std::collections::HashSet::new();
        for sink in &state.sinks {
            if !seen.insert(sink.name().to_string()) {
                return Err(Error::DuplicateSinkName(sink.name().to_string()));
            }
        }

        let rate_limiter = state.rate_limit.map(|(capacity, refill)| RateLimiter::new(capacity, refill));

        Ok(Logger::new(
            state.min_level,
            state.template_cache_capacity,
            rate_limiter,
            state.sinks,
            state.filters,
            state.enrichers,
            state.locale,
        ))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
