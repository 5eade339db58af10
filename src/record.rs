//! The immutable record that flows from the logger facade through the
//! filter chain, formatters, and transports.

use crate::level::Level;
use ahash::AHashMap;
use std::time::SystemTime;

/// How a bound property was marked in its template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// No `@`/`$` prefix: structural formatters emit a string.
    None,
    /// `@name` — destructure: structural formatters emit a native value.
    Destructure,
    /// `$name` — stringify: always emit a string, even when structural.
    Stringify,
}

/// One bound (name, value) pair produced by rendering a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    /// The value after transforms/format-spec have been applied, as it
    /// appears in the rendered message.
    pub rendered: String,
    pub operator: Operator,
    /// The value's raw textual form, prior to transforms/format-spec.
    /// Used by structural formatters' `@` native-value conversion (§4.1.c).
    pub raw: String,
}

/// Exception chain captured at log time, depth-capped at 20 per §4.2 / S6.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionInfo {
    pub ty: String,
    pub message: String,
    /// Nested cause chain, innermost last, capped at 20 entries.
    pub chain: Vec<String>,
}

pub const MAX_EXCEPTION_CHAIN_DEPTH: usize = 20;

impl ExceptionInfo {
    /// Build from any `std::error::Error`, walking `.source()` until it runs
    /// out or the depth cap is reached.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let ty = std::any::type_name_of_val(err).to_string();
        let message = {
            let s = err.to_string();
            if s.is_empty() { "(no message)".to_string() } else { s }
        };
        let mut chain = Vec::new();
        let mut cur = err.source();
        while let Some(src) = cur {
            if chain.len() >= MAX_EXCEPTION_CHAIN_DEPTH {
                break;
            }
            let msg = {
                let s = src.to_string();
                if s.is_empty() { "(no message)".to_string() } else { s }
            };
            chain.push(msg);
            cur = src.source();
        }
        ExceptionInfo { ty, message, chain }
    }
}

/// Source location captured at the call site, present only when the caller
/// opts into capture (it costs a few bytes per record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

/// One logging event's immutable data carrier (§3).
#[derive(Debug, Clone)]
pub struct Record {
    pub severity: Level,
    pub timestamp: SystemTime,
    pub message: String,
    pub template: String,
    /// 8-digit lowercase hex FNV-1a fingerprint of `template`.
    pub fingerprint: String,
    pub properties: Vec<Property>,
    pub tags: Vec<String>,
    pub exception: Option<ExceptionInfo>,
    pub source: Option<SourceLocation>,
    pub context: AHashMap<String, String>,
    pub thread: std::thread::ThreadId,
    pub locale: String,
}

impl Record {
    /// Look up a bound property by name; later entries (duplicate names)
    /// shadow earlier ones, matching binding-time overwrite semantics.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().rev().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;
    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "inner failure")
        }
    }
    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);
    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "outer failure")
        }
    }
    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn exception_info_walks_source_chain() {
        let err = Outer(Inner);
        let info = ExceptionInfo::from_error(&err);
        assert_eq!(info.message, "outer failure");
        assert_eq!(info.chain, vec!["inner failure".to_string()]);
    }

    #[test]
    fn property_lookup_prefers_last_match() {
        let rec = Record {
            severity: Level::Info,
            timestamp: SystemTime::now(),
            message: String::new(),
            template: String::new(),
            fingerprint: String::new(),
            properties: vec![
                Property { name: "x".into(), rendered: "1".into(), operator: Operator::None, raw: "1".into() },
                Property { name: "x".into(), rendered: "2".into(), operator: Operator::None, raw: "2".into() },
            ],
            tags: vec![],
            exception: None,
            source: None,
            context: AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".into(),
        };
        assert_eq!(rec.property("x").unwrap().rendered, "2");
    }
}
