//! Compact single-line JSON formatter (the "CLEF-style" shape): reserved
//! `@`-prefixed keys for timestamp/level/template/fingerprint/message/
//! exception, with bound properties, context, and tags flattened alongside
//! them. A property or context key that itself starts with `@` is escaped
//! by doubling the leading `@` so it can never be confused with a reserved
//! key (§4.6).

use super::{format_rfc3339, Formatter};
use crate::level::Level;
use crate::record::{ExceptionInfo, Operator, Record};
use serde_json::{Map, Value};

/// `@l` is omitted at `INFO` (the implied default level); `@m` (the
/// rendered message) is off by default — most consumers reconstruct it from
/// `@mt` plus the flattened properties, and skipping it halves line size for
/// high-volume sinks (S3).
pub struct CompactJsonFormatter {
    pub include_message: bool,
}

impl Default for CompactJsonFormatter {
    fn default() -> Self {
        Self { include_message: false }
    }
}

impl CompactJsonFormatter {
    pub fn with_message() -> Self {
        Self { include_message: true }
    }
}

fn exception_text(ex: &ExceptionInfo) -> String {
    let mut parts = vec![format!("{}: {}", ex.ty, ex.message)];
    parts.extend(ex.chain.iter().cloned());
    parts.join(" -> ")
}

fn escape_key(name: &str) -> String {
    if let Some(rest) = name.strip_prefix('@') {
        format!("@@{rest}")
    } else {
        name.to_string()
    }
}

/// Best-effort native conversion for a destructured (`@`-operator) property's
/// raw string, mirroring the type inference `|type` pipe transform uses.
/// NaN/infinity and negative zero are normalized per §4.1.c so output stays
/// valid JSON: non-finite values fall back to their string form, and `-0`
/// collapses to `0`.
pub(crate) fn native_value(raw: &str) -> Value {
    if raw == "true" {
        return Value::Bool(true);
    }
    if raw == "false" {
        return Value::Bool(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            let f = if f == 0.0 { 0.0 } else { f };
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(raw.to_string())
}

impl Formatter for CompactJsonFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        let mut obj = Map::new();
        obj.insert("@t".to_string(), Value::String(format_rfc3339(record.timestamp)));
        if record.severity != Level::Info {
            obj.insert("@l".to_string(), Value::String(record.severity.abbrev3().to_string()));
        }
        obj.insert("@mt".to_string(), Value::String(record.template.clone()));
        obj.insert("@i".to_string(), Value::String(record.fingerprint.clone()));
        if self.include_message {
            obj.insert("@m".to_string(), Value::String(record.message.clone()));
        }
        if let Some(ex) = &record.exception {
            obj.insert("@x".to_string(), Value::String(exception_text(ex)));
        }

        for prop in &record.properties {
            let value = if prop.operator == Operator::Destructure { native_value(&prop.raw) } else { Value::String(prop.rendered.clone()) };
            obj.insert(escape_key(&prop.name), value);
        }

        for (k, v) in &record.context {
            obj.insert(escape_key(k), Value::String(v.clone()));
        }

        if !record.tags.is_empty() {
            obj.insert("tags".to_string(), Value::Array(record.tags.iter().cloned().map(Value::String).collect()));
        }

        serde_json::to_string(&Value::Object(obj)).unwrap_or_default().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use std::time::SystemTime;

    fn sample_with_property(name: &str, raw: &str, op: Operator) -> Record {
        Record {
            severity: Level::Info,
            timestamp: SystemTime::now(),
            message: "x".to_string(),
            template: "x".to_string(),
            fingerprint: "00000000".to_string(),
            properties: vec![crate::record::Property { name: name.to_string(), rendered: raw.to_string(), operator: op, raw: raw.to_string() }],
            tags: Vec::new(),
            exception: None,
            source: None,
            context: ahash::AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".to_string(),
        }
    }

    #[test]
    fn reserved_keys_are_present_but_m_and_l_are_omitted_at_info_by_default() {
        let fmt = CompactJsonFormatter::default();
        let record = sample_with_property("user", "alice", Operator::None);
        let value: Value = serde_json::from_slice(&fmt.format(&record)).unwrap();
        for key in ["@t", "@mt", "@i"] {
            assert!(value.get(key).is_some());
        }
        assert!(value.get("@l").is_none());
        assert!(value.get("@m").is_none());
        assert_eq!(value["user"], "alice");
    }

    #[test]
    fn warn_level_tagged_record_matches_s3() {
        let fmt = CompactJsonFormatter::default();
        let mut record = sample_with_property("user", "bob", Operator::None);
        record.severity = Level::Warn;
        // Tags are stripped from the content template before it reaches the
        // record (I3) — the formatter never sees the leading `[audit]`.
        record.template = "User {user}".to_string();
        record.tags = vec!["audit".to_string()];
        let value: Value = serde_json::from_slice(&fmt.format(&record)).unwrap();
        assert_eq!(value["@l"], "WRN");
        assert_eq!(value["@mt"], "User {user}");
        assert_eq!(value["user"], "bob");
        assert_eq!(value["tags"][0], "audit");
        assert!(value.get("@m").is_none());
    }

    #[test]
    fn destructured_property_becomes_native_value() {
        let fmt = CompactJsonFormatter::default();
        let record = sample_with_property("count", "42", Operator::Destructure);
        let value: Value = serde_json::from_slice(&fmt.format(&record)).unwrap();
        assert_eq!(value["count"], 42);
    }

    #[test]
    fn at_prefixed_property_name_is_escaped() {
        let fmt = CompactJsonFormatter::default();
        let record = sample_with_property("@weird", "v", Operator::None);
        let value: Value = serde_json::from_slice(&fmt.format(&record)).unwrap();
        assert_eq!(value["@@weird"], "v");
    }

    #[test]
    fn negative_zero_normalizes_to_zero() {
        let value = native_value("-0.0");
        assert_eq!(value, Value::from(0));
    }

    #[test]
    fn nan_and_infinity_stay_strings_for_valid_json() {
        assert_eq!(native_value("NaN"), Value::String("NaN".to_string()));
        assert_eq!(native_value("Infinity"), Value::String("Infinity".to_string()));
    }
}
