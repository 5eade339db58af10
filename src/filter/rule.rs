//! A filter rule is a predicate over a [`Record`]; a rule *list* is an
//! ordered, AND-combined chain — every rule must admit the record (§4.4).
//! Used both as the logger's global filter chain and as each sink's
//! per-sink filter chain.

use crate::record::Record;

/// One predicate in a filter chain.
pub trait FilterRule: Send + Sync {
    fn admits(&self, record: &Record) -> bool;
}

impl<F> FilterRule for F
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    fn admits(&self, record: &Record) -> bool {
        self(record)
    }
}

/// An ordered, AND-combined list of filter rules. An empty chain admits
/// everything.
#[derive(Default)]
pub struct RuleChain {
    rules: Vec<Box<dyn FilterRule>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: Box<dyn FilterRule>) {
        self.rules.push(rule);
    }

    pub fn admits(&self, record: &Record) -> bool {
        self.rules.iter().all(|r| r.admits(record))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
