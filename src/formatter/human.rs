//! Human-readable formatter (§4.6, §6):
//! `timestamp [LEVEL] message [k=v …] [file:line func] [tags]`.
//! The timestamp is local-zone `YYYY-MM-DD HH:MM:SS.mmm`; a property or
//! context value containing `=` or `,` is quoted so the suffix stays
//! parseable by eye.

use super::Formatter;
use crate::record::Record;

/// `NO_COLOR` (no-color.org) or the library-prefixed `MINTA_LOG_NO_COLOR`
/// disables ANSI colorization when either is present and non-empty (§6).
fn color_enabled_by_default() -> bool {
    let disabled = |key: &str| std::env::var(key).map(|v| !v.is_empty()).unwrap_or(false);
    !disabled("NO_COLOR") && !disabled("MINTA_LOG_NO_COLOR")
}

pub struct HumanFormatter {
    pub show_context: bool,
    pub color: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self { show_context: true, color: color_enabled_by_default() }
    }
}

fn format_local_timestamp(ts: std::time::SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Local> = ts.into();
    datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn quote_if_needed(v: &str) -> String {
    if v.contains('=') || v.contains(',') || v.contains(' ') {
        format!("\"{}\"", v.replace('"', "\\\""))
    } else {
        v.to_string()
    }
}

impl Formatter for HumanFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format_local_timestamp(record.timestamp));
        out.push(' ');
        if self.color {
            out.push_str(&format!("\x1b[{}m[{}]\x1b[0m", record.severity.ansi_code(), record.severity.as_str()));
        } else {
            out.push('[');
            out.push_str(record.severity.as_str());
            out.push(']');
        }
        out.push(' ');
        out.push_str(&record.message);

        let mut pairs: Vec<(String, String)> =
            record.properties.iter().map(|p| (p.name.clone(), p.rendered.clone())).collect();
        if self.show_context {
            let mut ctx: Vec<_> = record.context.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            ctx.sort_by(|a, b| a.0.cmp(&b.0));
            pairs.extend(ctx);
        }

        if !pairs.is_empty() {
            out.push(' ');
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(k);
                out.push('=');
                out.push_str(&quote_if_needed(v));
            }
        }

        if let Some(loc) = &record.source {
            out.push_str(&format!(" [{}:{} {}]", loc.file, loc.line, loc.function));
        }

        if !record.tags.is_empty() {
            out.push_str(&format!(" [{}]", record.tags.join(",")));
        }

        if let Some(ex) = &record.exception {
            out.push_str(&format!(" exception={}: {}", ex.ty, ex.message));
        }

        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::{Operator, Property};
    use std::time::SystemTime;

    fn sample() -> Record {
        Record {
            severity: Level::Info,
            timestamp: SystemTime::now(),
            message: "User alice logged in".to_string(),
            template: "User {user} logged in".to_string(),
            fingerprint: "deadbeef".to_string(),
            properties: vec![Property {
                name: "user".to_string(),
                rendered: "alice".to_string(),
                operator: Operator::None,
                raw: "alice".to_string(),
            }],
            tags: Vec::new(),
            exception: None,
            source: None,
            context: ahash::AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".to_string(),
        }
    }

    #[test]
    fn formats_level_and_properties() {
        let fmt = HumanFormatter::default();
        let bytes = fmt.format(&sample());
        let line = String::from_utf8(bytes).unwrap();
        assert!(line.contains("[INFO]"));
        assert!(line.contains("User alice logged in"));
        assert!(line.contains("user=alice"));
    }

    #[test]
    fn quotes_values_containing_separators() {
        let fmt = HumanFormatter::default();
        let mut record = sample();
        record.properties[0].rendered = "a=b,c".to_string();
        let line = String::from_utf8(fmt.format(&record)).unwrap();
        assert!(line.contains("user=\"a=b,c\""));
    }

    #[test]
    fn color_false_omits_ansi_escapes() {
        let fmt = HumanFormatter { color: false, ..HumanFormatter::default() };
        let line = String::from_utf8(fmt.format(&sample())).unwrap();
        assert!(!line.contains('\x1b'));
        assert!(line.contains("[INFO]"));
    }

    #[test]
    fn color_true_wraps_level_in_ansi_sgr() {
        let fmt = HumanFormatter { color: true, ..HumanFormatter::default() };
        let line = String::from_utf8(fmt.format(&sample())).unwrap();
        assert!(line.contains("\x1b[32m[INFO]\x1b[0m"));
    }

    #[test]
    fn source_and_tags_segments_render() {
        let fmt = HumanFormatter { color: false, ..HumanFormatter::default() };
        let mut record = sample();
        record.source = Some(crate::record::SourceLocation { file: "main.rs", line: 3, function: "run" });
        record.tags = vec!["audit".to_string()];
        let line = String::from_utf8(fmt.format(&record)).unwrap();
        assert!(line.contains("[main.rs:3 run]"));
        assert!(line.contains("[audit]"));
    }
}
