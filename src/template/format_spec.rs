//! Numeric format specifiers, applied after pipe transforms (§4.1).
//!
//! Unknown or malformed specifiers pass the value through unchanged.
//! NaN/±Infinity always render as `NaN`/`Infinity`.

fn parse_num(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn render_non_finite(n: f64) -> Option<&'static str> {
    if n.is_nan() {
        Some("NaN")
    } else if n.is_infinite() {
        Some("Infinity")
    } else {
        None
    }
}

fn pad_zero_signed(digits: &str, negative: bool, width: usize) -> String {
    // width counts the sign character too.
    let sign_len = if negative { 1 } else { 0 };
    let pad = width.saturating_sub(digits.len() + sign_len);
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&"0".repeat(pad));
    out.push_str(digits);
    out
}

/// Apply one format specifier string to an already-transformed value.
pub fn apply_format_spec(value: &str, spec: &str) -> String {
    if spec.is_empty() {
        return value.to_string();
    }

    if let Some(rest) = spec.strip_suffix('f') {
        let digits_str = rest.strip_prefix('.').unwrap_or(rest);
        if let Ok(n) = digits_str.parse::<usize>() {
            if n <= 50 {
                if let Some(num) = parse_num(value) {
                    if let Some(tok) = render_non_finite(num) {
                        return tok.to_string();
                    }
                    return format!("{num:.n$}");
                }
            }
        }
        return value.to_string();
    }

    match spec {
        "X" | "x" => {
            if let Some(num) = parse_num(value) {
                if render_non_finite(num).is_some() {
                    return render_non_finite(num).unwrap().to_string();
                }
                let n = num as i64;
                return if spec == "X" { format!("{:X}", n) } else { format!("{:x}", n) };
            }
            value.to_string()
        }
        "e" | "E" => {
            if let Some(num) = parse_num(value) {
                if let Some(tok) = render_non_finite(num) {
                    return tok.to_string();
                }
                let s = format!("{num:e}");
                return if spec == "E" { s.to_uppercase() } else { s };
            }
            value.to_string()
        }
        "P" => {
            if let Some(num) = parse_num(value) {
                if let Some(tok) = render_non_finite(num) {
                    return tok.to_string();
                }
                return format!("{:.2}%", num * 100.0);
            }
            value.to_string()
        }
        "C" => {
            if let Some(num) = parse_num(value) {
                if let Some(tok) = render_non_finite(num) {
                    return tok.to_string();
                }
                return if num < 0.0 {
                    format!("-${:.2}", -num)
                } else {
                    format!("${num:.2}")
                };
            }
            value.to_string()
        }
        "d" => {
            if let Some(num) = parse_num(value) {
                if render_non_finite(num).is_some() {
                    return render_non_finite(num).unwrap().to_string();
                }
                return format!("{}", num.trunc() as i64);
            }
            value.to_string()
        }
        _ => {
            if let Some(rest) = spec.strip_prefix('0') {
                let width_str = rest.strip_suffix('d').unwrap_or(rest);
                if let Ok(width) = width_str.parse::<usize>() {
                    if let Some(num) = parse_num(value) {
                        if render_non_finite(num).is_some() {
                            return render_non_finite(num).unwrap().to_string();
                        }
                        let negative = num < 0.0;
                        let digits = format!("{}", num.abs().trunc() as i64);
                        return pad_zero_signed(&digits, negative, width);
                    }
                }
            }
            value.to_string()
        }
    }
}
