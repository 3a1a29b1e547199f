//! Decoding of Java literal tokens into constant values.

use crate::tree::ConstValue;

/// Integer literal text, with underscores, radix prefix and `L` suffix.
///
/// Hex, octal and binary literals are two's complement in their width, so
/// `0xFFFFFFFF` is `-1`. A decimal literal out of range yields `None`, except
/// when `negated` and the value is exactly the magnitude of the minimum.
pub fn integer(text: &str, negated: bool) -> Option<ConstValue> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (digits, long) = match cleaned.strip_suffix(['l', 'L']) {
        Some(d) => (d, true),
        None => (cleaned.as_str(), false),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    let magnitude = u64::from_str_radix(body, radix).ok()?;

    if radix != 10 {
        let value = if long {
            ConstValue::Long(magnitude as i64)
        } else {
            ConstValue::Int(u32::try_from(magnitude).ok()? as i32)
        };
        return Some(negate_if(value, negated));
    }
    if long {
        if negated && magnitude == 1u64 << 63 {
            return Some(ConstValue::Long(i64::MIN));
        }
        let v = i64::try_from(magnitude).ok()?;
        return Some(negate_if(ConstValue::Long(v), negated));
    }
    if negated && magnitude == 1u64 << 31 {
        return Some(ConstValue::Int(i32::MIN));
    }
    let v = i32::try_from(magnitude).ok()?;
    Some(negate_if(ConstValue::Int(v), negated))
}

fn negate_if(value: ConstValue, negated: bool) -> ConstValue {
    match (value, negated) {
        (ConstValue::Int(v), true) => ConstValue::Int(v.wrapping_neg()),
        (ConstValue::Long(v), true) => ConstValue::Long(v.wrapping_neg()),
        (v, _) => v,
    }
}

/// Decimal floating point literal. Hex floats are not decoded.
pub fn floating(text: &str) -> Option<ConstValue> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if cleaned.starts_with("0x") || cleaned.starts_with("0X") {
        return None;
    }
    if let Some(f) = cleaned.strip_suffix(['f', 'F']) {
        return f.parse::<f32>().ok().map(ConstValue::float);
    }
    let d = cleaned.strip_suffix(['d', 'D']).unwrap_or(&cleaned);
    d.parse::<f64>().ok().map(ConstValue::double)
}

/// `'a'`, `'\n'`, `'A'`.
pub fn character(text: &str) -> Option<ConstValue> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let units = unescape(inner)?;
    match units.as_slice() {
        [c] => Some(ConstValue::Char(*c)),
        _ => None,
    }
}

/// Plain string literals and text blocks.
pub fn string(text: &str) -> Option<ConstValue> {
    let inner = if let Some(block) = text.strip_prefix("\"\"\"") {
        let block = block.strip_suffix("\"\"\"")?;
        // content starts after the line terminator following the opening quotes
        let block = block.split_once('\n').map_or("", |(_, rest)| rest);
        return unescape(&strip_indent(block))
            .map(|u| ConstValue::Str(String::from_utf16_lossy(&u)));
    } else {
        text.strip_prefix('"')?.strip_suffix('"')?
    };
    let units = unescape(inner)?;
    Some(ConstValue::Str(String::from_utf16_lossy(&units)))
}

fn strip_indent(block: &str) -> String {
    let lines: Vec<&str> = block.split('\n').collect();
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode escapes into UTF-16 code units.
fn unescape(s: &str) -> Option<Vec<u16>> {
    let mut out = Vec::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u16; 2];
            out.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let esc = chars.next()?;
        let unit = match esc {
            'n' => 0x0a,
            't' => 0x09,
            'r' => 0x0d,
            'b' => 0x08,
            'f' => 0x0c,
            's' => 0x20,
            '0'..='7' => {
                let mut value = esc.to_digit(8)?;
                let max_digits = if esc <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                value as u16
            }
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                u16::from_str_radix(&hex, 16).ok()?
            }
            '\n' => continue,
            other => other as u16,
        };
        out.push(unit);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_integer_radixes() {
        assert_eq!(integer("1_000", false), Some(ConstValue::Int(1000)));
        assert_eq!(integer("0xFFFFFFFF", false), Some(ConstValue::Int(-1)));
        assert_eq!(integer("017", false), Some(ConstValue::Int(15)));
        assert_eq!(integer("0b101L", false), Some(ConstValue::Long(5)));
        assert_eq!(integer("2147483648", true), Some(ConstValue::Int(i32::MIN)));
        assert_eq!(integer("2147483648", false), None);
        assert_eq!(
            integer("9223372036854775808L", true),
            Some(ConstValue::Long(i64::MIN))
        );
    }

    #[test]
    fn decodes_escapes() {
        assert_eq!(character("'\\n'"), Some(ConstValue::Char(10)));
        assert_eq!(character("'\\u0041'"), Some(ConstValue::Char(65)));
        assert_eq!(character("'\\377'"), Some(ConstValue::Char(255)));
        assert_eq!(string("\"a\\tb\""), Some(ConstValue::Str("a\tb".into())));
    }

    #[test]
    fn decodes_floats() {
        assert_eq!(floating("1.5f"), Some(ConstValue::float(1.5)));
        assert_eq!(floating("2e3"), Some(ConstValue::double(2000.0)));
        assert_eq!(floating("0x1p3"), None);
    }
}
