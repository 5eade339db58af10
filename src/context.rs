//! Context propagation: a process-wide global context, thread-local scope
//! stacks, and enrichers (§4.3).
//!
//! Merge order (lowest to highest precedence) is: enrichers, then global
//! context, then scope frames from outermost to innermost, then the
//! record's own explicit template properties (applied by the caller, not
//! here).

use ahash::AHashMap;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::Arc;

static GLOBAL_CONTEXT: Mutex<Option<AHashMap<String, String>>> = Mutex::new(None);

fn global_map() -> &'static Mutex<Option<AHashMap<String, String>>> {
    &GLOBAL_CONTEXT
}

/// Set a process-wide context key, visible to every thread's records.
pub fn set_global(key: impl Into<String>, value: impl Into<String>) {
    let mut guard = global_map().lock();
    guard.get_or_insert_with(AHashMap::new).insert(key.into(), value.into());
}

/// Remove a single process-wide context key.
pub fn clear_global(key: &str) {
    if let Some(map) = global_map().lock().as_mut() {
        map.remove(key);
    }
}

/// Remove every process-wide context key.
pub fn clear_all_global() {
    *global_map().lock() = None;
}

fn snapshot_global() -> AHashMap<String, String> {
    global_map().lock().clone().unwrap_or_default()
}

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Arc<AHashMap<String, String>>>> = const { RefCell::new(Vec::new()) };
}

/// A move-only handle to one pushed scope frame. Dropping it (including
/// during an unwind) pops the frame it represents, regardless of whether
/// other frames were pushed and popped correctly in between — callers are
/// expected to maintain a strict LIFO discipline.
pub struct Scope {
    _private: (),
}

impl Scope {
    /// Push a new scope frame containing `fields` onto this thread's stack.
    pub fn push(fields: AHashMap<String, String>) -> Self {
        SCOPE_STACK.with(|s| s.borrow_mut().push(Arc::new(fields)));
        Scope { _private: () }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        SCOPE_STACK.with(|s| {
            s.borrow_mut().pop();
        });
    }
}

/// Merge this thread's scope frames outermost-first into `into`, later
/// (innermost) frames overwriting earlier ones on key collision.
fn merge_scopes(into: &mut AHashMap<String, String>) {
    SCOPE_STACK.with(|s| {
        for frame in s.borrow().iter() {
            for (k, v) in frame.iter() {
                into.insert(k.clone(), v.clone());
            }
        }
    });
}

/// A context enricher, invoked for every record before it reaches any sink.
/// Enrichers run in registration order; a panic or error inside one is
/// caught and the record proceeds without that enricher's contribution.
pub trait Enricher: Send + Sync {
    fn enrich(&self, out: &mut AHashMap<String, String>);
}

impl<F> Enricher for F
where
    F: Fn(&mut AHashMap<String, String>) + Send + Sync,
{
    fn enrich(&self, out: &mut AHashMap<String, String>) {
        self(out)
    }
}

/// Run `enrichers` in order, catching panics so one misbehaving enricher
/// cannot drop a record, then merge in the global context and this thread's
/// scope stack (in that precedence order).
pub fn build_context(enrichers: &[Arc<dyn Enricher>]) -> AHashMap<String, String> {
    let mut out = AHashMap::new();

    for enricher in enrichers {
        let mut partial = AHashMap::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            enricher.enrich(&mut partial);
        }));
        if result.is_ok() {
            for (k, v) in partial {
                out.insert(k, v);
            }
        }
        // A panicking enricher contributes nothing; the record still proceeds.
    }

    for (k, v) in snapshot_global() {
        out.insert(k, v);
    }

    merge_scopes(&mut out);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_context_is_visible_and_clearable() {
        clear_all_global();
        set_global("service", "api");
        let ctx = build_context(&[]);
        assert_eq!(ctx.get("service"), Some(&"api".to_string()));
        clear_global("service");
        let ctx = build_context(&[]);
        assert_eq!(ctx.get("service"), None);
    }

    #[test]
    fn scope_overrides_global_and_pops_on_drop() {
        clear_all_global();
        set_global("request_id", "global-value");
        {
            let mut frame = AHashMap::new();
            frame.insert("request_id".to_string(), "scoped-value".to_string());
            let _scope = Scope::push(frame);
            let ctx = build_context(&[]);
            assert_eq!(ctx.get("request_id"), Some(&"scoped-value".to_string()));
        }
        let ctx = build_context(&[]);
        assert_eq!(ctx.get("request_id"), Some(&"global-value".to_string()));
        clear_all_global();
    }

    #[test]
    fn nested_scopes_merge_outermost_to_innermost() {
        let mut outer = AHashMap::new();
        outer.insert("a".to_string(), "outer".to_string());
        outer.insert("b".to_string(), "outer".to_string());
        let _s1 = Scope::push(outer);
        let mut inner = AHashMap::new();
        inner.insert("b".to_string(), "inner".to_string());
        let _s2 = Scope::push(inner);

        let ctx = build_context(&[]);
        assert_eq!(ctx.get("a"), Some(&"outer".to_string()));
        assert_eq!(ctx.get("b"), Some(&"inner".to_string()));
    }

    #[test]
    fn panicking_enricher_does_not_poison_the_record() {
        let panicking: Arc<dyn Enricher> = Arc::new(|_out: &mut AHashMap<String, String>| {
            panic!("boom");
        });
        let fine: Arc<dyn Enricher> = Arc::new(|out: &mut AHashMap<String, String>| {
            out.insert("ok".to_string(), "true".to_string());
        });
        let ctx = build_context(&[panicking, fine]);
        assert_eq!(ctx.get("ok"), Some(&"true".to_string()));
    }
}
