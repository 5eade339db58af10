//! The compact filter token grammar (§4.4), a terser alternative to
//! [`super::expression_dsl`] meant for one-line configuration:
//!
//! ```text
//! token    = level_token | contains_token | template_token | context_token ;
//! level_token     = LEVEL '+' ;                   (* "WARN+" : level >= WARN *)
//! contains_token  = ['!'] '~' value ;             (* "~boom", "!~boom" *)
//! template_token  = ['!'] 'tpl:' value ;          (* "tpl:a1b2c3d4" *)
//! context_token   = 'ctx:' key ['=' value] ;      (* "ctx:user=alice", "ctx:user" (has) *)
//! value    = '"' chars-without-unescaped-quote '"' | chars-without-quote-or-space ;
//! ```
//!
//! A compact filter string is whitespace-separated tokens, AND-combined.
//! `WARNING` is accepted as an alias for `WARN` in level tokens.

use crate::level::Level;
use crate::record::Record;
use std::str::FromStr;

use super::rule::FilterRule;

#[derive(Debug, Clone, PartialEq)]
pub enum CompactAtom {
    LevelAtLeast(Level),
    MessageContains(String),
    MessageNotContains(String),
    TemplateEq(String),
    TemplateNe(String),
    Context(String, String),
    /// Bare `ctx:key` with no `=value` — admits iff the key is present.
    ContextHas(String),
}

impl FilterRule for CompactAtom {
    fn admits(&self, record: &Record) -> bool {
        match self {
            CompactAtom::LevelAtLeast(l) => record.severity >= *l,
            CompactAtom::MessageContains(s) => record.message.contains(s.as_str()),
            CompactAtom::MessageNotContains(s) => !record.message.contains(s.as_str()),
            CompactAtom::TemplateEq(s) => record.template == *s,
            CompactAtom::TemplateNe(s) => record.template != *s,
            CompactAtom::Context(k, v) => record.context.get(k).is_some_and(|cv| cv == v),
            CompactAtom::ContextHas(k) => record.context.contains_key(k),
        }
    }
}

/// An ordered, AND-combined list of compact tokens.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompactChain {
    atoms: Vec<CompactAtom>,
}

impl FilterRule for CompactChain {
    fn admits(&self, record: &Record) -> bool {
        self.atoms.iter().all(|a| a.admits(record))
    }
}

fn split_tokens(expr: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in expr.chars() {
        match c {
            '"' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ' ' | '\t' if !in_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if in_quote {
        return Err("unterminated quoted string".to_string());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_value(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Err("empty value".to_string());
    }
    if let Some(inner) = raw.strip_prefix('"') {
        let Some(inner) = inner.strip_suffix('"') else {
            return Err("unterminated quoted value".to_string());
        };
        if inner.is_empty() {
            return Err("empty quoted value".to_string());
        }
        return Ok(inner.to_string());
    }
    if raw.contains('\'') {
        return Err(format!("single-quote inside unquoted value '{raw}'"));
    }
    Ok(raw.to_string())
}

fn parse_token(tok: &str) -> Result<CompactAtom, String> {
    if let Some(level_str) = tok.strip_suffix('+') {
        let normalized = if level_str.eq_ignore_ascii_case("warning") { "Warn" } else { level_str };
        let level = Level::from_str(normalized).map_err(|e| e.to_string())?;
        return Ok(CompactAtom::LevelAtLeast(level));
    }
    if let Some(rest) = tok.strip_prefix("!~") {
        return Ok(CompactAtom::MessageNotContains(parse_value(rest)?));
    }
    if let Some(rest) = tok.strip_prefix('~') {
        return Ok(CompactAtom::MessageContains(parse_value(rest)?));
    }
    if let Some(rest) = tok.strip_prefix("!tpl:") {
        return Ok(CompactAtom::TemplateNe(parse_value(rest)?));
    }
    if let Some(rest) = tok.strip_prefix("tpl:") {
        return Ok(CompactAtom::TemplateEq(parse_value(rest)?));
    }
    if let Some(rest) = tok.strip_prefix("ctx:") {
        if rest.is_empty() {
            return Err("bare 'ctx:' token".to_string());
        }
        return match rest.split_once('=') {
            Some((key, value)) => {
                if key.is_empty() {
                    return Err("empty context key".to_string());
                }
                Ok(CompactAtom::Context(parse_value(key)?, parse_value(value)?))
            }
            None => Ok(CompactAtom::ContextHas(parse_value(rest)?)),
        };
    }

    Err(format!("unrecognized compact filter token '{tok}'"))
}

/// Parse a whitespace-separated compact filter string into an AND-combined
/// chain.
pub fn parse(expr: &str) -> Result<CompactChain, String> {
    let tokens = split_tokens(expr)?;
    let mut atoms = Vec::with_capacity(tokens.len());
    for tok in tokens {
        atoms.push(parse_token(&tok)?);
    }
    Ok(CompactChain { atoms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use std::time::SystemTime;

    fn sample_record(severity: Level, message: &str, template: &str) -> Record {
        Record {
            severity,
            timestamp: SystemTime::now(),
            message: message.to_string(),
            template: template.to_string(),
            fingerprint: "00000000".to_string(),
            properties: Vec::new(),
            tags: Vec::new(),
            exception: None,
            source: None,
            context: AHashMap::new(),
            thread: std::thread::current().id(),
            locale: "en-US".to_string(),
        }
    }

    #[test]
    fn level_token_parses_as_threshold() {
        let chain = parse("WARN+").unwrap();
        assert!(chain.admits(&sample_record(Level::Error, "x", "x")));
        assert!(!chain.admits(&sample_record(Level::Info, "x", "x")));
    }

    #[test]
    fn warning_alias_accepted_in_level_token() {
        let chain = parse("WARNING+").unwrap();
        assert!(chain.admits(&sample_record(Level::Warn, "x", "x")));
    }

    #[test]
    fn contains_and_not_contains_tokens() {
        let chain = parse("~boom !~quiet").unwrap();
        assert!(chain.admits(&sample_record(Level::Info, "it went boom", "t")));
        assert!(!chain.admits(&sample_record(Level::Info, "it went boom quiet", "t")));
    }

    #[test]
    fn template_tokens_match_fingerprint_equality() {
        let chain = parse("tpl:a1b2c3d4").unwrap();
        assert!(chain.admits(&sample_record(Level::Info, "m", "a1b2c3d4")));
        let neg = parse("!tpl:a1b2c3d4").unwrap();
        assert!(!neg.admits(&sample_record(Level::Info, "m", "a1b2c3d4")));
    }

    #[test]
    fn context_token_requires_key_equals_value() {
        let chain = parse("ctx:user=alice").unwrap();
        let mut r = sample_record(Level::Info, "m", "t");
        r.context.insert("user".to_string(), "alice".to_string());
        assert!(chain.admits(&r));
    }

    #[test]
    fn bare_ctx_token_is_parse_error() {
        assert!(parse("ctx:").is_err());
    }

    #[test]
    fn ctx_without_equals_is_a_has_check() {
        let chain = parse("ctx:user").unwrap();
        let mut r = sample_record(Level::Info, "m", "t");
        assert!(!chain.admits(&r));
        r.context.insert("user".to_string(), "anything".to_string());
        assert!(chain.admits(&r));
    }

    #[test]
    fn bare_tpl_token_is_parse_error() {
        assert!(parse("tpl:").is_err());
        assert!(parse("!tpl:").is_err());
    }

    #[test]
    fn unterminated_quote_is_parse_error() {
        assert!(parse("ctx:user=\"alice").is_err());
    }

    #[test]
    fn empty_quoted_value_is_parse_error() {
        assert!(parse("ctx:user=\"\"").is_err());
    }

    #[test]
    fn single_quote_in_unquoted_value_is_parse_error() {
        assert!(parse("~it's broken").is_err());
    }
}
