//! Text helpers shared by the lowering passes.

use super::fold::Num;

/// Capitalize the first letter of every alphabetic run and lowercase the
/// rest, e.g. `ongoing - global` → `Ongoing - Global`.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Seconds denoted by a duration literal (`250ms`, `2s`, `1.5min`),
/// rounded to milliseconds.
pub(crate) fn duration_seconds(text: &str) -> Option<String> {
    let text = text.trim();
    let (value, scale) = if let Some(v) = text.strip_suffix("ms") {
        (v, 0.001)
    } else if let Some(v) = text.strip_suffix("min") {
        (v, 60.0)
    } else if let Some(v) = text.strip_suffix('s') {
        (v, 1.0)
    } else {
        return None;
    };
    let seconds = value.trim().parse::<f64>().ok().filter(|f| f.is_finite())? * scale;
    let rounded = (seconds * 1000.0).round() / 1000.0;
    Some(Num::Float(rounded).to_string())
}

/// Quote rule titles and string literals for the target grammar.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
