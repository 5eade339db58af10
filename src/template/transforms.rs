//! Pipe transforms applied left-to-right before the format specifier (§4.1).
//!
//! An unknown transform, or a transform whose input doesn't parse as its
//! expected type, is a no-op (fail-open) — the value passes through
//! unchanged. Ported from `original_source/include/lunar_log/transform/pipe_transform.hpp`.

use super::parser::Xform;

fn parse_double(s: &str) -> Option<f64> {
    let v: f64 = s.trim().parse().ok()?;
    if v.is_nan() || v.is_infinite() {
        None
    } else {
        Some(v)
    }
}

fn utf8_char_count(s: &str) -> usize {
    s.chars().count()
}

fn utf8_truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn transform_upper(v: &str) -> String {
    v.chars().map(|c| c.to_ascii_uppercase()).collect()
}

fn transform_lower(v: &str) -> String {
    v.chars().map(|c| c.to_ascii_lowercase()).collect()
}

fn transform_trim(v: &str) -> String {
    v.trim_matches(|c: char| c.is_ascii_whitespace()).to_string()
}

fn transform_truncate(v: &str, arg: Option<&str>) -> String {
    let Some(n) = arg.and_then(|a| a.parse::<i64>().ok()).filter(|n| *n >= 0) else {
        return v.to_string();
    };
    let max_chars = n as usize;
    if utf8_char_count(v) <= max_chars {
        v.to_string()
    } else {
        format!("{}\u{2026}", utf8_truncate(v, max_chars))
    }
}

fn transform_pad(v: &str, arg: Option<&str>) -> String {
    let n = arg.and_then(|a| a.parse::<i64>().ok()).unwrap_or(0);
    if n <= 0 {
        return v.to_string();
    }
    let n = n as usize;
    let count = utf8_char_count(v);
    if count >= n {
        v.to_string()
    } else {
        format!("{}{}", v, " ".repeat(n - count))
    }
}

fn transform_padl(v: &str, arg: Option<&str>) -> String {
    let n = arg.and_then(|a| a.parse::<i64>().ok()).unwrap_or(0);
    if n <= 0 {
        return v.to_string();
    }
    let n = n as usize;
    let count = utf8_char_count(v);
    if count >= n {
        v.to_string()
    } else {
        format!("{}{}", " ".repeat(n - count), v)
    }
}

fn transform_quote(v: &str) -> String {
    format!("\"{v}\"")
}

/// Parse a `comma` xform arg as a fixed-point precision (`.2f`, `2f`, or a
/// bare digit count), matching the `.Nf`/`Nf` format-specifier grammar so
/// `{amount|comma:.2f}` both groups and rounds in one step (S2).
fn parse_comma_precision(arg: Option<&str>) -> Option<usize> {
    let arg = arg?;
    let digits = arg.strip_suffix('f').unwrap_or(arg);
    let digits = digits.strip_prefix('.').unwrap_or(digits);
    digits.parse::<usize>().ok().filter(|n| *n <= 50)
}

fn transform_comma(v: &str, arg: Option<&str>) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    let work = if let Some(prec) = parse_comma_precision(arg) {
        format!("{num:.prec$}")
    } else if num == num.trunc() && num.abs() < 1e15 {
        format!("{:.0}", num)
    } else {
        format!("{num}")
    };
    let (prefix, rest) = match work.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", work.as_str()),
    };
    let (int_part, dec_part) = match rest.split_once('.') {
        Some((i, d)) => (i, format!(".{d}")),
        None => (rest, String::new()),
    };
    let mut grouped = String::new();
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{prefix}{grouped}{dec_part}")
}

fn transform_hex(v: &str) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    let n = num as i64;
    if n < 0 {
        format!("-0x{:x}", n.unsigned_abs())
    } else {
        format!("0x{n:x}")
    }
}

fn transform_oct(v: &str) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    let n = num as i64;
    if n == 0 {
        "0".to_string()
    } else if n < 0 {
        format!("-0{:o}", n.unsigned_abs())
    } else {
        format!("0{n:o}")
    }
}

fn transform_bin(v: &str) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    let n = num as i64;
    if n == 0 {
        return "0b0".to_string();
    }
    if n < 0 {
        format!("-0b{:b}", n.unsigned_abs())
    } else {
        format!("0b{n:b}")
    }
}

fn transform_bytes(v: &str) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut display = num.abs();
    let mut idx = 0;
    while display >= 1024.0 && idx < UNITS.len() - 1 {
        display /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{} B", num as i64)
    } else {
        let signed = if num < 0.0 { -display } else { display };
        format!("{signed:.1} {}", UNITS[idx])
    }
}

fn transform_duration(v: &str) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    let total_ms = num as i64;
    let negative = total_ms < 0;
    let total_ms = total_ms.unsigned_abs();
    let total_sec = total_ms / 1000;
    let ms = total_ms % 1000;
    let hours = total_sec / 3600;
    let minutes = (total_sec % 3600) / 60;
    let seconds = total_sec % 60;

    let sign = if negative { "-" } else { "" };
    if total_sec == 0 && ms == 0 {
        return format!("{sign}0s");
    }
    if total_sec == 0 {
        return format!("{sign}{ms}ms");
    }
    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || (hours == 0 && minutes == 0) {
        parts.push(format!("{seconds}s"));
    }
    format!("{sign}{}", parts.join(" "))
}

fn transform_pct(v: &str) -> String {
    let Some(num) = parse_double(v) else { return v.to_string() };
    format!("{:.1}%", num * 100.0)
}

fn json_escape(v: &str) -> String {
    let mut out = String::with_capacity(v.len() + 2);
    out.push('"');
    for c in v.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn transform_json(v: &str) -> String {
    if v == "true" || v == "false" {
        return v.to_string();
    }
    if let Some(num) = parse_double(v) {
        if num == num.trunc() && num.abs() < 1e15 {
            return format!("{}", num as i64);
        }
        return format!("{num}");
    }
    json_escape(v)
}

fn transform_type(v: &str) -> String {
    if v == "true" || v == "false" {
        return "bool".to_string();
    }
    if v == "(null)" {
        return "nullptr_t".to_string();
    }
    if parse_double(v).is_some() {
        if !v.contains(['.', 'e', 'E']) {
            return "int".to_string();
        }
        return "double".to_string();
    }
    "string".to_string()
}

/// Apply a sequence of pipe transforms. `expand` and `str` are structural
/// hints with no effect on the string form.
pub fn apply_transforms(value: &str, xforms: &[Xform]) -> String {
    let mut result = value.to_string();
    for x in xforms {
        let arg = x.arg.as_deref();
        result = match x.name.as_str() {
            "upper" => transform_upper(&result),
            "lower" => transform_lower(&result),
            "trim" => transform_trim(&result),
            "truncate" => transform_truncate(&result, arg),
            "pad" => transform_pad(&result, arg),
            "padl" => transform_padl(&result, arg),
            "quote" => transform_quote(&result),
            "comma" => transform_comma(&result, arg),
            "hex" => transform_hex(&result),
            "oct" => transform_oct(&result),
            "bin" => transform_bin(&result),
            "bytes" => transform_bytes(&result),
            "duration" => transform_duration(&result),
            "pct" => transform_pct(&result),
            "json" => transform_json(&result),
            "type" => transform_type(&result),
            "expand" | "str" => result,
            _ => result,
        };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(name: &str, arg: Option<&str>) -> Xform {
        Xform { name: name.to_string(), arg: arg.map(str::to_string) }
    }

    #[test]
    fn comma_groups_thousands() {
        assert_eq!(apply_transforms("1234567.891", &[x("comma", None)]), "1,234,567.891");
    }

    #[test]
    fn comma_with_precision_arg_rounds_then_groups_s2() {
        assert_eq!(apply_transforms("1234567.891", &[x("comma", Some(".2f"))]), "1,234,567.89");
    }

    #[test]
    fn comma_is_noop_on_non_numeric() {
        assert_eq!(apply_transforms("abc", &[x("comma", None)]), "abc");
    }

    #[test]
    fn truncate_appends_ellipsis_when_cut() {
        assert_eq!(apply_transforms("hello world", &[x("truncate", Some("5"))]), "hello\u{2026}");
        assert_eq!(apply_transforms("hi", &[x("truncate", Some("5"))]), "hi");
    }

    #[test]
    fn pad_and_padl_use_spaces() {
        assert_eq!(apply_transforms("ab", &[x("pad", Some("5"))]), "ab   ");
        assert_eq!(apply_transforms("ab", &[x("padl", Some("5"))]), "   ab");
    }

    #[test]
    fn hex_handles_negative_numbers() {
        assert_eq!(apply_transforms("255", &[x("hex", None)]), "0xff");
        assert_eq!(apply_transforms("-255", &[x("hex", None)]), "-0xff");
    }

    #[test]
    fn bytes_humanizes_size() {
        assert_eq!(apply_transforms("1048576", &[x("bytes", None)]), "1.0 MB");
        assert_eq!(apply_transforms("512", &[x("bytes", None)]), "512 B");
    }

    #[test]
    fn duration_formats_hms() {
        assert_eq!(apply_transforms("3661000", &[x("duration", None)]), "1h 1m 1s");
        assert_eq!(apply_transforms("500", &[x("duration", None)]), "500ms");
        assert_eq!(apply_transforms("-1000", &[x("duration", None)]), "-1s");
        assert_eq!(apply_transforms("0", &[x("duration", None)]), "0s");
    }

    #[test]
    fn pipeline_applies_left_to_right() {
        assert_eq!(
            apply_transforms("hello", &[x("upper", None), x("quote", None)]),
            "\"HELLO\""
        );
    }

    #[test]
    fn unknown_transform_is_noop() {
        assert_eq!(apply_transforms("value", &[x("frobnicate", None)]), "value");
    }

    #[test]
    fn type_detects_int_double_bool_string() {
        assert_eq!(apply_transforms("5", &[x("type", None)]), "int");
        assert_eq!(apply_transforms("5.5", &[x("type", None)]), "double");
        assert_eq!(apply_transforms("true", &[x("type", None)]), "bool");
        assert_eq!(apply_transforms("hello", &[x("type", None)]), "string");
    }
}
