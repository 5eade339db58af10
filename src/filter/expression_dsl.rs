//! The verbose filter expression grammar (§4.4):
//!
//! ```text
//! rule   = ['not'] atom ;
//! atom   = 'level'    ('>='|'=='|'!=') LEVEL
//!        | 'message'  ('contains'|'startswith') QUOTED
//!        | 'template' ('=='|'contains')         QUOTED
//!        | 'context'  'has' QUOTED
//!        | 'context'  IDENT ('=='|'!=') QUOTED ;
//! ```
//!
//! One atom per expression; combine multiple expressions by pushing each
//! into a [`super::rule::RuleChain`], which AND-combines them.

use crate::level::Level;
use crate::record::Record;
use std::str::FromStr;

use super::rule::FilterRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelComparator {
    Eq,
    Ne,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqComparator {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Level(LevelComparator, Level),
    MessageContains(String),
    MessageStartsWith(String),
    TemplateEq(String),
    TemplateContains(String),
    ContextHas(String),
    Context(String, EqComparator, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub negated: bool,
    pub atom: Atom,
}

impl FilterRule for Expression {
    fn admits(&self, record: &Record) -> bool {
        let result = match &self.atom {
            Atom::Level(cmp, level) => match cmp {
                LevelComparator::Eq => record.severity == *level,
                LevelComparator::Ne => record.severity != *level,
                LevelComparator::Ge => record.severity >= *level,
            },
            Atom::MessageContains(s) => record.message.contains(s.as_str()),
            Atom::MessageStartsWith(s) => record.message.starts_with(s.as_str()),
            Atom::TemplateEq(s) => record.template == *s,
            Atom::TemplateContains(s) => record.template.contains(s.as_str()),
            Atom::ContextHas(key) => record.context.contains_key(key),
            Atom::Context(key, cmp, s) => match record.context.get(key) {
                Some(v) => match cmp {
                    EqComparator::Eq => v == s,
                    EqComparator::Ne => v != s,
                },
                None => matches!(cmp, EqComparator::Ne),
            },
        };
        if self.negated { !result } else { result }
    }
}

fn tokenize(expr: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    let mut current = String::new();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    s.push(c);
                }
                if !closed {
                    return Err("unterminated quoted string".to_string());
                }
                tokens.push(format!("\"{s}\""));
            }
            _ => {
                current.push(c);
                chars.next();
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn unquote(tok: &str) -> Result<String, String> {
    if tok.len() >= 2 && tok.starts_with('"') && tok.ends_with('"') {
        Ok(tok[1..tok.len() - 1].to_string())
    } else {
        Err(format!("expected quoted string, found '{tok}'"))
    }
}

fn parse_level_comparator(tok: &str) -> Result<LevelComparator, String> {
    match tok {
        "==" => Ok(LevelComparator::Eq),
        "!=" => Ok(LevelComparator::Ne),
        ">=" => Ok(LevelComparator::Ge),
        other => Err(format!("unknown level comparator '{other}' (expected '>=', '==', or '!=')")),
    }
}

fn parse_eq_comparator(tok: &str) -> Result<EqComparator, String> {
    match tok {
        "==" => Ok(EqComparator::Eq),
        "!=" => Ok(EqComparator::Ne),
        other => Err(format!("unknown comparator '{other}' (expected '==' or '!=')")),
    }
}

/// Parse one filter expression.
pub fn parse(expr: &str) -> Result<Expression, String> {
    let mut tokens = tokenize(expr)?.into_iter().peekable();

    let negated = match tokens.peek().map(String::as_str) {
        Some("not") => {
            tokens.next();
            true
        }
        _ => false,
    };

    let keyword = tokens.next().ok_or_else(|| "empty expression".to_string())?;

    let atom = match keyword.as_str() {
        "level" => {
            let cmp = parse_level_comparator(&tokens.next().ok_or("missing comparator after 'level'")?)?;
            let name = tokens.next().ok_or("missing level name")?;
            let normalized = if name.eq_ignore_ascii_case("warning") { "Warn".to_string() } else { name };
            let level = Level::from_str(&normalized).map_err(|e| e.to_string())?;
            Atom::Level(cmp, level)
        }
        "message" => {
            let verb = tokens.next().ok_or("missing verb after 'message'")?;
            let value = unquote(&tokens.next().ok_or("missing string after message verb")?)?;
            match verb.as_str() {
                "contains" => Atom::MessageContains(value),
                "startswith" => Atom::MessageStartsWith(value),
                other => return Err(format!("unknown message verb '{other}' (expected 'contains' or 'startswith')")),
            }
        }
        "template" => {
            let verb = tokens.next().ok_or("missing comparator after 'template'")?;
            let value = unquote(&tokens.next().ok_or("missing string after template verb")?)?;
            match verb.as_str() {
                "==" => Atom::TemplateEq(value),
                "contains" => Atom::TemplateContains(value),
                other => return Err(format!("unknown template verb '{other}' (expected '==' or 'contains')")),
            }
        }
        "context" => {
            let next = tokens.next().ok_or("missing key or 'has' after 'context'")?;
            if next == "has" {
                let key = unquote(&tokens.next().ok_or("missing string after 'context has'")?)?;
                Atom::ContextHas(key)
            } else {
                let key = next;
                let cmp = parse_eq_comparator(&tokens.next().ok_or("missing comparator after context key")?)?;
                let value = unquote(&tokens.next().ok_or("missing string after context comparator")?)?;
                Atom::Context(key, cmp, value)
            }
        }
        other => return Err(format!("unknown filter keyword '{other}'")),
    };

    if tokens.next().is_some() {
        return Err("trailing tokens after expression".to_string());
    }

    Ok(Expression { negated, atom })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::time::SystemTime;

    fn sample_record(severity: Level, message: &str) -> Record {
        Record {
            severity,
            timestamp: SystemTime::now(),
            message: message.to_string(),
            template: "tmpl".to_string(),
            fingerprint: "00000000".to_string(),
            properties: Vec::new(),
            tags: Vec::new(),
            exception: None,
            source: None,
            context: ahash::AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".to_string(),
        }
    }

    #[test]
    fn parses_level_comparator() {
        let e = parse("level >= WARN").unwrap();
        assert!(e.admits(&sample_record(Level::Error, "x")));
        assert!(!e.admits(&sample_record(Level::Info, "x")));
    }

    #[test]
    fn level_rejects_unsupported_comparator() {
        assert!(parse("level > WARN").is_err());
        assert!(parse("level < WARN").is_err());
        assert!(parse("level <= WARN").is_err());
    }

    #[test]
    fn warning_alias_is_accepted() {
        let e = parse("level == WARNING").unwrap();
        assert!(e.admits(&sample_record(Level::Warn, "x")));
    }

    #[test]
    fn not_prefix_negates_result() {
        let e = parse("not level >= WARN").unwrap();
        assert!(e.admits(&sample_record(Level::Info, "x")));
        assert!(!e.admits(&sample_record(Level::Error, "x")));
    }

    #[test]
    fn message_contains() {
        let e = parse("message contains \"boom\"").unwrap();
        assert!(e.admits(&sample_record(Level::Info, "it went boom today")));
        assert!(!e.admits(&sample_record(Level::Info, "all fine")));
    }

    #[test]
    fn message_startswith() {
        let e = parse("message startswith \"boom\"").unwrap();
        assert!(e.admits(&sample_record(Level::Info, "boom today")));
        assert!(!e.admits(&sample_record(Level::Info, "it went boom")));
    }

    #[test]
    fn template_contains_and_eq() {
        let eq = parse("template == \"tmpl\"").unwrap();
        assert!(eq.admits(&sample_record(Level::Info, "x")));
        let contains = parse("template contains \"mpl\"").unwrap();
        assert!(contains.admits(&sample_record(Level::Info, "x")));
    }

    #[test]
    fn unterminated_quote_is_parse_error() {
        assert!(parse("message contains \"boom").is_err());
    }

    #[test]
    fn context_has_checks_presence_only() {
        let e = parse("context has \"user\"").unwrap();
        let mut r = sample_record(Level::Info, "x");
        assert!(!e.admits(&r));
        r.context.insert("user".to_string(), "anything".to_string());
        assert!(e.admits(&r));
    }

    #[test]
    fn context_atom_compares_value() {
        let e = parse("context user == \"alice\"").unwrap();
        let mut r = sample_record(Level::Info, "x");
        r.context.insert("user".to_string(), "alice".to_string());
        assert!(e.admits(&r));
    }
}
