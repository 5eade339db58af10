//! Output-template mini-language for building custom line formats (§4.6.a):
//!
//! ```text
//! template = { literal | '{{' | '}}' | token } ;
//! token    = '{' name [',' align] [':' spec] '}' ;
//! name     = 'timestamp' | 'level' | 'message' | 'newline' | 'properties'
//!          | 'template' | 'source' | 'threadId' | 'exception'
//!          | 'fingerprint' | 'locale' | 'tags' | 'ctx.' key | 'prop.' key ;
//! align    = ['-'] digits ;           (* same right/left-pad convention as §4.1 *)
//! spec     = chars-not-containing '}' ;
//! ```
//!
//! `timestamp`'s spec is a chrono strftime string built from the `yyyy`,
//! `MM`, `dd`, `HH`, `mm`, `ss`, `fff` tokens (§6). `level`'s spec is `u3`
//! (three-letter uppercase abbreviation) or `l` (lowercase full name);
//! anything else renders the full uppercase name. `fingerprint`, `locale`,
//! `tags`, `ctx.`key, and `prop.`key are supplemental tokens beyond the
//! core list, following the same fail-open rule. Unknown token names render
//! as an empty string (fail-open, consistent with the template engine's
//! placeholder handling).

/// Translate the `yyyy`/`MM`/`dd`/`HH`/`mm`/`ss`/`fff` timestamp-format
/// tokens of §6 into a chrono strftime string. Longest tokens are matched
/// first so `MM` isn't swallowed by a partial match inside a longer run.
fn translate_timestamp_format(spec: &str) -> String {
    const TOKENS: &[(&str, &str)] =
        &[("yyyy", "%Y"), ("fff", "%3f"), ("MM", "%m"), ("dd", "%d"), ("HH", "%H"), ("mm", "%M"), ("ss", "%S")];
    let mut out = String::with_capacity(spec.len());
    let mut rest = spec;
    'outer: while !rest.is_empty() {
        for (token, repl) in TOKENS {
            if let Some(stripped) = rest.strip_prefix(token) {
                out.push_str(repl);
                rest = stripped;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        out.push(chars.next().unwrap());
        rest = chars.as_str();
    }
    out
}

use crate::record::Record;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Token { name: String, align: Option<i32>, spec: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTemplate {
    segments: Vec<Segment>,
}

const MAX_ALIGN_WIDTH: usize = 1024;

fn apply_align(value: &str, align: Option<i32>) -> String {
    let Some(width) = align else { return value.to_string() };
    let left_pad = width < 0;
    let width = (width.unsigned_abs() as usize).min(MAX_ALIGN_WIDTH);
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let pad = " ".repeat(width - len);
    if left_pad { format!("{pad}{value}") } else { format!("{value}{pad}") }
}

pub fn parse(template: &str) -> OutputTemplate {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < template.len() {
        let c = template[i..].chars().next().unwrap();
        match c {
            '{' => {
                if template[i + 1..].starts_with('{') {
                    literal.push('{');
                    i += 2;
                    continue;
                }
                if let Some(rel_close) = template[i + 1..].find('}') {
                    let body = &template[i + 1..i + 1 + rel_close];
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_token(body));
                    i += 1 + rel_close + 1;
                } else {
                    literal.push('{');
                    i += 1;
                }
            }
            '}' => {
                if template[i + 1..].starts_with('}') {
                    literal.push('}');
                    i += 2;
                } else {
                    literal.push('}');
                    i += 1;
                }
            }
            other => {
                literal.push(other);
                i += other.len_utf8();
            }
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    OutputTemplate { segments }
}

fn parse_token(body: &str) -> Segment {
    let name_end = body.find([',', ':']).unwrap_or(body.len());
    let name = body[..name_end].to_string();
    let mut tail = &body[name_end..];

    let mut align = None;
    if let Some(stripped) = tail.strip_prefix(',') {
        let align_end = stripped.find(':').unwrap_or(stripped.len());
        align = stripped[..align_end].parse::<i32>().ok();
        tail = &stripped[align_end..];
    }

    let spec = tail.strip_prefix(':').map(str::to_string);

    Segment::Token { name, align, spec }
}

fn render_token(name: &str, spec: Option<&str>, record: &Record) -> String {
    match name {
        "timestamp" => {
            let datetime: chrono::DateTime<chrono::Local> = record.timestamp.into();
            match spec {
                Some(fmt) => datetime.format(&translate_timestamp_format(fmt)).to_string(),
                None => datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            }
        }
        "level" => match spec {
            Some("u3") => record.severity.abbrev3().to_string(),
            Some("l") => record.severity.as_lower().to_string(),
            _ => record.severity.as_str().to_string(),
        },
        "message" => record.message.clone(),
        "newline" => "\n".to_string(),
        "properties" => record
            .properties
            .iter()
            .map(|p| format!("{}={}", p.name, p.rendered))
            .collect::<Vec<_>>()
            .join(" "),
        "template" => record.template.clone(),
        "source" => match &record.source {
            Some(loc) => format!("{}:{} {}", loc.file, loc.line, loc.function),
            None => String::new(),
        },
        "threadId" => format!("{:?}", record.thread),
        "exception" => match &record.exception {
            Some(ex) => format!("{}: {}", ex.ty, ex.message),
            None => String::new(),
        },
        "fingerprint" => record.fingerprint.clone(),
        "locale" => record.locale.clone(),
        "tags" => record.tags.join(","),
        other if other.starts_with("ctx.") => {
            record.context.get(&other["ctx.".len()..]).cloned().unwrap_or_default()
        }
        other if other.starts_with("prop.") => {
            record.property(&other["prop.".len()..]).map(|p| p.rendered.clone()).unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// Render a parsed output template against a record.
pub fn render(template: &OutputTemplate, record: &Record) -> String {
    let mut out = String::new();
    for seg in &template.segments {
        match seg {
            Segment::Literal(s) => out.push_str(s),
            Segment::Token { name, align, spec } => {
                let rendered = render_token(name, spec.as_deref(), record);
                out.push_str(&apply_align(&rendered, *align));
            }
        }
    }
    out
}

/// Convenience formatter wrapping a single parsed output template.
pub struct OutputTemplateFormatter {
    template: OutputTemplate,
}

impl OutputTemplateFormatter {
    pub fn new(template_str: &str) -> Self {
        Self { template: parse(template_str) }
    }
}

impl super::Formatter for OutputTemplateFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        render(&self.template, record).into_bytes()
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
            message: "low disk".to_string(),
            template: "low disk".to_string(),
            fingerprint: "abc12345".to_string(),
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
    fn renders_level_abbreviation_and_message() {
        let t = parse("[{level:u3}] {message}");
        assert_eq!(render(&t, &sample()), "[WRN] low disk");
    }

    #[test]
    fn alignment_pads_field_to_width() {
        let t = parse("{level,-6}|");
        assert_eq!(render(&t, &sample()), "WARN  |");
    }

    #[test]
    fn unknown_token_renders_empty() {
        let t = parse("<{nonsense}>");
        assert_eq!(render(&t, &sample()), "<>");
    }

    #[test]
    fn newline_and_template_and_threadid_tokens() {
        let t = parse("{template}{newline}{threadId}");
        let rendered = render(&t, &sample());
        assert!(rendered.starts_with("low disk\n"));
        assert!(rendered.ends_with(&format!("{:?}", sample().thread)));
    }

    #[test]
    fn source_token_renders_file_line_function() {
        let mut record = sample();
        record.source = Some(crate::record::SourceLocation { file: "main.rs", line: 5, function: "run" });
        let t = parse("{source}");
        assert_eq!(render(&t, &record), "main.rs:5 run");
    }

    #[test]
    fn timestamp_format_tokens_translate_to_strftime() {
        let t = parse("{timestamp:yyyy-MM-dd}");
        let rendered = render(&t, &sample());
        assert_eq!(rendered.len(), "2026-07-28".len());
        assert!(rendered.chars().filter(|c| *c == '-').count() == 2);
    }

    #[test]
    fn literal_braces_survive_escaping() {
        let t = parse("{{literal}} {message}");
        assert_eq!(render(&t, &sample()), "{literal} low disk");
    }
}
