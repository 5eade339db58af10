//! XML formatter: one `<log_entry>` element per record, with bound
//! properties as sanitized child elements (§4.6).

use super::{format_rfc3339, Formatter};
use crate::record::Record;

fn escape_text(v: &str) -> String {
    v.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Sanitize a property/context key into a valid XML element name: non-
/// alphanumeric characters become `_`, and a name that doesn't start with a
/// letter or underscore gets an `_` prefix.
fn sanitize_element_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect();
    if out.is_empty() {
        return "_".to_string();
    }
    let first = out.chars().next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        out.insert(0, '_');
    }
    out
}

pub struct XmlFormatter;

impl Formatter for XmlFormatter {
    fn format(&self, record: &Record) -> Vec<u8> {
        let mut out = String::new();
        out.push_str("<log_entry>");
        out.push_str(&format!("<timestamp>{}</timestamp>", escape_text(&format_rfc3339(record.timestamp))));
        out.push_str(&format!("<level>{}</level>", escape_text(record.severity.as_str())));
        out.push_str(&format!("<message>{}</message>", escape_text(&record.message)));
        out.push_str(&format!(
            "<MessageTemplate hash=\"{}\">{}</MessageTemplate>",
            escape_text(&record.fingerprint),
            escape_text(&record.template)
        ));

        if !record.properties.is_empty() {
            out.push_str("<properties>");
            for p in &record.properties {
                let el = sanitize_element_name(&p.name);
                out.push_str(&format!("<{el}>{}</{el}>", escape_text(&p.rendered)));
            }
            out.push_str("</properties>");
        }

        if !record.context.is_empty() {
            out.push_str("<context>");
            let mut entries: Vec<_> = record.context.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (k, v) in entries {
                let el = sanitize_element_name(k);
                out.push_str(&format!("<{el}>{}</{el}>", escape_text(v)));
            }
            out.push_str("</context>");
        }

        if !record.tags.is_empty() {
            out.push_str("<tags>");
            for t in &record.tags {
                out.push_str(&format!("<tag>{}</tag>", escape_text(t)));
            }
            out.push_str("</tags>");
        }

        if let Some(ex) = &record.exception {
            out.push_str("<exception>");
            out.push_str(&format!("<type>{}</type>", escape_text(&ex.ty)));
            out.push_str(&format!("<message>{}</message>", escape_text(&ex.message)));
            if !ex.chain.is_empty() {
                out.push_str("<chain>");
                for c in &ex.chain {
                    out.push_str(&format!("<cause>{}</cause>", escape_text(c)));
                }
                out.push_str("</chain>");
            }
            out.push_str("</exception>");
        }

        out.push_str("</log_entry>");
        out.into_bytes()
    }
}
