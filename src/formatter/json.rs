//! Full JSON formatter: one JSON object per record with every documented
//! field present, optional ones only when the record carries them (§4.6).

use super::compact_json::native_value;
use super::{format_rfc3339, Formatter};
use crate::record::{Operator, Record};
use serde_json::{json, Map, Value};

#[derive(Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

fn properties_json(record: &Record) -> Option<Value> {
    if record.properties.is_empty() {
        return None;
    }
    let mut map = Map::with_capacity(record.properties.len());
    for p in &record.properties {
        let value = if p.operator == Operator::Destructure { native_value(&p.raw) } else { Value::String(p.rendered.clone()) };
        map.insert(p.name.clone(), value);
    }
    Some(Value::Object(map))
}

fn context_json(record: &Record) -> Option<Value> {
    if record.context.is_empty() {
        return None;
    }
    let mut map = Map::with_capacity(record.context.len());
    for (k, v) in &record.context {
        map.insert(k.clone(), Value::String(v.clone()));
    }
    Some(Value::Object(map))
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        let mut obj = Map::new();
        obj.insert("timestamp".to_string(), Value::String(format_rfc3339(record.timestamp)));
        obj.insert("level".to_string(), Value::String(record.severity.as_str().to_string()));
        obj.insert("message".to_string(), Value::String(record.message.clone()));
        obj.insert("messageTemplate".to_string(), Value::String(record.template.clone()));
        obj.insert("templateHash".to_string(), Value::String(record.fingerprint.clone()));

        if let Some(props) = properties_json(record) {
            obj.insert("properties".to_string(), props);
        }
        if let Some(ctx) = context_json(record) {
            obj.insert("context".to_string(), ctx);
        }
        if !record.tags.is_empty() {
            obj.insert("tags".to_string(), Value::Array(record.tags.iter().cloned().map(Value::String).collect()));
        }
        if let Some(ex) = &record.exception {
            obj.insert(
                "exception".to_string(),
                json!({ "type": ex.ty, "message": ex.message, "chain": ex.chain }),
            );
        }
        if let Some(loc) = &record.source {
            obj.insert("file".to_string(), Value::String(loc.file.to_string()));
            obj.insert("line".to_string(), Value::from(loc.line));
            obj.insert("function".to_string(), Value::String(loc.function.to_string()));
        }

        let value = Value::Object(obj);
        let rendered = if self.pretty { serde_json::to_string_pretty(&value) } else { serde_json::to_string(&value) };
        rendered.unwrap_or_default().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use std::time::SystemTime;

    fn sample() -> Record {
        Record {
            severity: Level::Warn,
            timestamp: SystemTime::now(),
            message: "disk nearly full".to_string(),
            template: "disk nearly full".to_string(),
            fingerprint: "cafebabe".to_string(),
            properties: Vec::new(),
            tags: vec!["ops".to_string()],
            exception: None,
            source: None,
            context: ahash::AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".to_string(),
        }
    }

    #[test]
    fn emits_required_keys() {
        let fmt = JsonFormatter::default();
        let bytes = fmt.format(&sample());
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        for key in ["timestamp", "level", "message", "messageTemplate", "templateHash", "tags"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["tags"][0], "ops");
    }

    #[test]
    fn omits_empty_optional_keys() {
        let fmt = JsonFormatter::default();
        let bytes = fmt.format(&sample());
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("properties").is_none());
        assert!(value.get("context").is_none());
        assert!(value.get("exception").is_none());
        assert!(value.get("file").is_none());
    }

    #[test]
    fn destructured_property_is_native_in_properties_object() {
        let fmt = JsonFormatter::default();
        let mut record = sample();
        record.properties.push(crate::record::Property {
            name: "count".to_string(),
            rendered: "42".to_string(),
            operator: Operator::Destructure,
            raw: "42".to_string(),
        });
        let value: Value = serde_json::from_slice(&fmt.format(&record)).unwrap();
        assert_eq!(value["properties"]["count"], 42);
    }

    #[test]
    fn source_location_flattens_to_top_level_fields() {
        let fmt = JsonFormatter::default();
        let mut record = sample();
        record.source = Some(crate::record::SourceLocation { file: "main.rs", line: 10, function: "run" });
        let value: Value = serde_json::from_slice(&fmt.format(&record)).unwrap();
        assert_eq!(value["file"], "main.rs");
        assert_eq!(value["line"], 10);
        assert_eq!(value["function"], "run");
    }
}
