//! Bounded parsed-template cache, keyed by the raw (tag-stripped) template
//! string (§4.1, P2). Eviction is FIFO by insertion order. A capacity of
//! zero disables caching outright — `get_or_parse` then reparses every call
//! and nothing is ever stored.

use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use super::parser::{parse, ParsedTemplate};

struct Inner {
    capacity: usize,
    map: AHashMap<String, Arc<ParsedTemplate>>,
    order: std::collections::VecDeque<String>,
}

impl Inner {
    fn evict_to_capacity(&mut self) {
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

/// Thread-safe cache from raw template text to its parsed form.
pub struct TemplateCache {
    inner: RwLock<Inner>,
}

impl TemplateCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner { capacity, map: AHashMap::new(), order: std::collections::VecDeque::new() }),
        }
    }

    /// Return the parsed template for `key`, parsing and inserting on miss.
    /// Never holds the lock while parsing.
    pub fn get_or_parse(&self, key: &str) -> Arc<ParsedTemplate> {
        if let Some(hit) = self.inner.read().map.get(key).cloned() {
            return hit;
        }

        let parsed = Arc::new(parse(key));

        let mut guard = self.inner.write();
        if guard.capacity == 0 {
            return parsed;
        }
        if let Some(existing) = guard.map.get(key) {
            return existing.clone();
        }
        guard.map.insert(key.to_string(), parsed.clone());
        guard.order.push_back(key.to_string());
        guard.evict_to_capacity();
        parsed
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write();
        guard.map.clear();
        guard.order.clear();
    }

    /// Resize the cache at runtime, evicting the oldest entries down to the
    /// new capacity. Setting capacity to 0 disables and clears the cache.
    pub fn resize(&self, new_capacity: usize) {
        let mut guard = self.inner.write();
        guard.capacity = new_capacity;
        guard.evict_to_capacity();
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_and_reuses_parsed_template() {
        let cache = TemplateCache::new(10);
        let a = cache.get_or_parse("User {name}");
        let b = cache.get_or_parse("User {name}");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = TemplateCache::new(0);
        let _ = cache.get_or_parse("x {a}");
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn evicts_oldest_when_over_capacity() {
        let cache = TemplateCache::new(2);
        cache.get_or_parse("a {x}");
        cache.get_or_parse("b {x}");
        cache.get_or_parse("c {x}");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.inner.read().map.contains_key("a {x}"), false);
    }

    #[test]
    fn resize_down_evicts_to_new_capacity() {
        let cache = TemplateCache::new(5);
        for t in ["a {x}", "b {x}", "c {x}"] {
            cache.get_or_parse(t);
        }
        cache.resize(1);
        assert_eq!(cache.len(), 1);
    }
}
