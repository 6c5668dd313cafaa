//! Small helpers for writing SVG attribute values.

use std::fmt::Write;

/// Appends `value` in its shortest round-trip decimal form, the way a browser
/// would print it: whole numbers carry no `.0` suffix and `-0` prints as `0`.
pub fn push_num(out: &mut String, value: f64) {
    if !value.is_finite() {
        out.push('0');
        return;
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let mut buf = ryu_js::Buffer::new();
    out.push_str(buf.format_finite(value));
}

pub fn fmt_num(value: f64) -> String {
    let mut out = String::new();
    push_num(&mut out, value);
    out
}

/// Appends `name="value"` with a leading space.
pub fn push_num_attr(out: &mut String, name: &str, value: f64) {
    let _ = write!(out, " {name}=\"");
    push_num(out, value);
    out.push('"');
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_javascript() {
        assert_eq!(fmt_num(8.0), "8");
        assert_eq!(fmt_num(-1.0), "-1");
        assert_eq!(fmt_num(6.5), "6.5");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(fmt_num(f64::NAN), "0");
    }

    #[test]
    fn attributes_are_space_prefixed() {
        let mut out = String::from("<circle");
        push_num_attr(&mut out, "r", 2.5);
        assert_eq!(out, "<circle r=\"2.5\"");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
