//! Template grammar parser (§4.1).
//!
//! ```text
//! template   = { literal | '{{' | '}}' | placeholder } ;
//! placeholder= '{' [op] name [',' align] [':' spec] ['|' xforms] '}' ;
//! op         = '@' | '$' ;
//! name       = identifier | index-digits | '' ;
//! align      = ['-'] digits ;
//! spec       = chars-not-containing '|' or '}' ;
//! xforms     = xform { '|' xform } ;
//! xform      = xform-name [ ':' xform-arg ] ;
//! ```

use crate::record::Operator;

/// One parsed pipe transform, e.g. `truncate:10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xform {
    pub name: String,
    pub arg: Option<String>,
}

/// A parsed `{...}` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub operator: Operator,
    pub name: String,
    /// Field width; negative means left-align (pad on the right).
    pub align: Option<i32>,
    pub spec: Option<String>,
    pub xforms: Vec<Xform>,
}

impl Placeholder {
    /// True when `name` is a non-negative integer literal (`{0}`, `{12}`).
    pub fn is_index(&self) -> bool {
        !self.name.is_empty() && self.name.bytes().all(|b| b.is_ascii_digit())
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A fully parsed template: its segments plus any validation warnings
/// collected during parsing (empty name, whitespace-only name, duplicate
/// non-indexed name).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTemplate {
    pub segments: Vec<Segment>,
    pub warnings: Vec<String>,
    /// True iff every placeholder in the template has an all-digit name —
    /// the precondition for INDEXED binding.
    pub all_indexed: bool,
}

/// Strip leading `[tag]` segments (optionally separated by whitespace) from
/// a raw template string, returning the tags found and the remaining
/// content template. Per I3, tags never appear in the rendered message or
/// participate in the template fingerprint.
pub fn strip_leading_tags(raw: &str) -> (Vec<String>, &str) {
    let mut tags = Vec::new();
    let mut rest = raw;
    loop {
        let trimmed = rest.trim_start_matches(|c: char| c == ' ');
        if !trimmed.starts_with('[') {
            break;
        }
        let Some(close) = trimmed.find(']') else { break };
        let inner = &trimmed[1..close];
        if inner.is_empty() || inner.contains('[') {
            break;
        }
        tags.push(inner.to_string());
        rest = &trimmed[close + 1..];
    }
    if tags.is_empty() {
        (tags, raw)
    } else {
        (tags, rest.trim_start_matches(' '))
    }
}

/// Parse a (tag-stripped) template string into segments and warnings.
pub fn parse(template: &str) -> ParsedTemplate {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut warnings = Vec::new();
    let mut seen_names: Vec<String> = Vec::new();
    let mut all_indexed = true;
    let mut any_placeholder = false;

    let mut i = 0;
    while i < bytes.len() {
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
                    let ph = parse_placeholder_body(body);
                    any_placeholder = true;
                    if ph.name.is_empty() {
                        warnings.push("placeholder has an empty name".to_string());
                    } else if ph.name.trim().is_empty() {
                        warnings.push(format!("placeholder name '{}' is whitespace-only", ph.name));
                    } else if !ph.is_index() {
                        if seen_names.contains(&ph.name) {
                            warnings.push(format!("duplicate placeholder name '{}'", ph.name));
                        } else {
                            seen_names.push(ph.name.clone());
                        }
                    }
                    if !ph.is_index() {
                        all_indexed = false;
                    }
                    segments.push(Segment::Placeholder(ph));
                    i += 1 + rel_close + 1;
                } else {
                    // Unmatched '{' is literal.
                    literal.push('{');
                    i += 1;
                }
            }
            '}' => {
                if template[i + 1..].starts_with('}') {
                    literal.push('}');
                    i += 2;
                } else {
                    // Unmatched '}' is literal.
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

    if !any_placeholder {
        all_indexed = false;
    }

    ParsedTemplate { segments, warnings, all_indexed }
}

fn parse_placeholder_body(body: &str) -> Placeholder {
    let bytes = body.as_bytes();
    let mut operator = Operator::None;
    let mut rest = body;

    if !bytes.is_empty() && (bytes[0] == b'@' || bytes[0] == b'$') {
        let second_is_op = bytes.get(1).is_some_and(|b| *b == b'@' || *b == b'$');
        if !second_is_op {
            operator = if bytes[0] == b'@' { Operator::Destructure } else { Operator::Stringify };
            rest = &body[1..];
        }
        // else: doubled operator chars are literal; leave them in `rest`/name.
    }

    // name ends at the first of ',' ':' '|' (whichever comes first)
    let name_end = rest.find([',', ':', '|']).unwrap_or(rest.len());
    let name = rest[..name_end].to_string();
    let mut tail = &rest[name_end..];

    let mut align = None;
    if let Some(stripped) = tail.strip_prefix(',') {
        let align_end = stripped.find([':', '|']).unwrap_or(stripped.len());
        let align_str = &stripped[..align_end];
        align = align_str.parse::<i32>().ok();
        tail = &stripped[align_end..];
    }

    let mut spec = None;
    if let Some(stripped) = tail.strip_prefix(':') {
        let spec_end = stripped.find('|').unwrap_or(stripped.len());
        spec = Some(stripped[..spec_end].to_string());
        tail = &stripped[spec_end..];
    }

    let mut xforms = Vec::new();
    if let Some(stripped) = tail.strip_prefix('|') {
        for token in stripped.split('|') {
            if token.is_empty() {
                continue;
            }
            match token.split_once(':') {
                Some((n, a)) => xforms.push(Xform { name: n.to_string(), arg: Some(a.to_string()) }),
                None => xforms.push(Xform { name: token.to_string(), arg: None }),
            }
        }
    }

    Placeholder { operator, name, align, spec, xforms }
}
