//! Argument binding and rendering: turns a [`ParsedTemplate`](super::parser::ParsedTemplate)
//! plus a caller-supplied argument vector into a rendered message and a list
//! of bound [`Property`](crate::record::Property) values (§4.1 binding discipline).

use super::format_spec::apply_format_spec;
use super::parser::{ParsedTemplate, Segment};
use super::transforms::apply_transforms;
use crate::record::{Operator, Property};

/// A caller-supplied logging argument. Arguments are stringified once at
/// bind time; the engine never touches the original typed value again.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl Arg {
    pub fn raw_string(&self) -> String {
        match self {
            Arg::Bool(b) => b.to_string(),
            Arg::I64(i) => i.to_string(),
            Arg::F64(f) => {
                if f.is_nan() {
                    "NaN".to_string()
                } else if f.is_infinite() {
                    if *f > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
                } else {
                    format!("{f}")
                }
            }
            Arg::Str(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }
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

/// The outcome of binding arguments to a parsed template: which discipline
/// was used, plus a warning if the engine had to fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Indexed,
    KeyValue,
    Positional,
}

/// Render a parsed template against an argument vector, per the binding
/// discipline of §4.1. Returns the rendered message, the bound properties in
/// placeholder-appearance order, which binding discipline was used, and any
/// warning produced while resolving the binding (distinct from parse-time
/// warnings).
pub fn render(parsed: &ParsedTemplate, args: &[Arg]) -> (String, Vec<Property>, Binding, Option<String>) {
    let (binding, warning) = resolve_binding(parsed, args);

    let mut message = String::new();
    let mut properties = Vec::new();
    let mut distinct_order: Vec<String> = Vec::new();
    let mut assigned: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for seg in &parsed.segments {
        match seg {
            Segment::Literal(s) => message.push_str(s),
            Segment::Placeholder(ph) => {
                let raw = match binding {
                    Binding::Indexed => {
                        ph.name.parse::<usize>().ok().and_then(|i| args.get(i)).map(Arg::raw_string).unwrap_or_default()
                    }
                    Binding::KeyValue => args
                        .chunks_exact(2)
                        .find(|pair| pair[0].as_str() == Some(ph.name.as_str()))
                        .map(|pair| pair[1].raw_string())
                        .unwrap_or_default(),
                    Binding::Positional => {
                        if let Some(&idx) = assigned.get(&ph.name) {
                            args.get(idx).map(Arg::raw_string).unwrap_or_default()
                        } else {
                            let idx = distinct_order.len();
                            distinct_order.push(ph.name.clone());
                            assigned.insert(ph.name.clone(), idx);
                            args.get(idx).map(Arg::raw_string).unwrap_or_default()
                        }
                    }
                };

                let transformed = apply_transforms(&raw, &ph.xforms);
                let formatted = match &ph.spec {
                    Some(spec) => apply_format_spec(&transformed, spec),
                    None => transformed,
                };
                let rendered = apply_align(&formatted, ph.align);

                message.push_str(&rendered);
                properties.push(Property {
                    name: ph.name.clone(),
                    rendered,
                    operator: ph.operator,
                    raw,
                });
            }
        }
    }

    (message, properties, binding, warning)
}

fn resolve_binding(parsed: &ParsedTemplate, args: &[Arg]) -> (Binding, Option<String>) {
    if parsed.all_indexed {
        return (Binding::Indexed, None);
    }

    if !args.is_empty() && args.len() % 2 == 0 {
        let names: Vec<&str> = parsed
            .segments
            .iter()
            .filter_map(|s| if let Segment::Placeholder(p) = s { Some(p.name.as_str()) } else { None })
            .collect();
        let all_keys_match = args
            .chunks_exact(2)
            .all(|pair| pair[0].as_str().is_some_and(|k| names.contains(&k)));
        if all_keys_match {
            return (Binding::KeyValue, None);
        }
    }

    (Binding::Positional, None)
}

/// Rendering with a deliberately-empty operator, used when a formatter needs
/// only the destructure/stringify classification without rerunning the
/// transform pipeline (kept private to this crate; exposed for completeness).
#[allow(dead_code)]
fn _operator_of(p: &Property) -> Operator {
    p.operator
}
