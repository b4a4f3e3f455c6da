//! Amount parsing
//!
//! Source amounts arrive as text in several shapes: `1,234.50`, `(1,234.50)`
//! for negatives, `-` for nothing, and occasionally with stray currency or
//! bidi characters. Everything is reduced to `f64` or null.

use arrears_core::{Frame, Scalar, Value};

/// Parse a cell into an amount
///
/// Numbers pass through. Text is trimmed; empty or `-` is null; a value in
/// parentheses is negated; every character other than digits, `.` and `-`
/// is dropped; when more than one `.` remains all but the last are treated
/// as thousands separators. Anything unparseable is null.
pub fn parse_amount(value: &Scalar) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => Some(*n),
        Value::Text(s) => parse_amount_text(s),
    }
}

fn parse_amount_text(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let negative = s.len() >= 2 && s.starts_with('(') && s.ends_with(')');
    if negative {
        s = &s[1..s.len() - 1];
    }

    let mut cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.matches('.').count() > 1 {
        if let Some(last) = cleaned.rfind('.') {
            let (head, tail) = cleaned.split_at(last);
            cleaned = head.replace('.', "") + tail;
        }
    }

    let n: f64 = cleaned.parse().ok()?;
    Some(if negative { -n } else { n })
}

/// Lenient numeric view used when reshaping: numbers, or text that parses as a plain float
pub fn coerce_number(value: &Scalar) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => Some(*n),
        Value::Text(s) => s.trim().parse().ok(),
    }
}

/// Replace every cell of the named columns with its parsed amount
///
/// Returns how many of the columns were present.
pub fn normalize_numeric_columns<S: AsRef<str>>(frame: &mut Frame, headers: &[S]) -> usize {
    headers
        .iter()
        .filter(|h| frame.map_column(h.as_ref(), |v| parse_amount(v).map(Value::Number)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn text(s: &str) -> Scalar {
        Some(Value::text(s))
    }

    #[test]
    fn test_parse_amount_shapes() {
        assert_eq!(parse_amount(&text("(1,234.50)")), Some(-1234.5));
        assert_eq!(parse_amount(&text("-")), None);
        assert_eq!(parse_amount(&text("  ")), None);
        assert_eq!(parse_amount(&text("12.34.56")), Some(1234.56));
        assert_eq!(parse_amount(&text("₪ 1,000")), Some(1000.0));
        assert_eq!(parse_amount(&text("-250.5")), Some(-250.5));
        assert_eq!(parse_amount(&text("abc")), None);
        assert_eq!(parse_amount(&text("1-2")), None);
        assert_eq!(parse_amount(&Some(Value::Number(7.25))), Some(7.25));
        assert_eq!(parse_amount(&None), None);
    }

    #[test]
    fn test_coerce_number_is_strict_about_text() {
        assert_eq!(coerce_number(&text(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_number(&text("1,000")), None);
        assert_eq!(coerce_number(&text("סכום")), None);
    }

    #[test]
    fn test_normalize_columns() {
        let mut frame = Frame::new(["סוכן", "סכום", "חודש"]);
        frame.push_row(vec![text("דנה"), text("(10)"), text("1.000.5")]);
        frame.push_row(vec![text("רון"), text("-"), None]);

        let touched = normalize_numeric_columns(&mut frame, &["סכום", "חודש", "חסר"]);
        assert_eq!(touched, 2);
        assert_eq!(frame.get(0, "סכום"), Some(&Value::Number(-10.0)));
        assert_eq!(frame.get(0, "חודש"), Some(&Value::Number(1000.5)));
        assert_eq!(frame.get(1, "סכום"), None);
        assert_eq!(frame.get(0, "סוכן"), Some(&Value::text("דנה")));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "[()0-9.,\\- a-zא-ת]{0,12}") {
            let once = parse_amount(&Some(Value::Text(raw))).map(Value::Number);
            let twice = parse_amount(&once).map(Value::Number);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn formatted_amounts_round_trip(cents in -100_000_000i64..100_000_000i64) {
            let value = cents as f64 / 100.0;
            let abs = format!("{:.2}", value.abs());
            let (int_part, frac) = abs.split_at(abs.len() - 3);
            let mut grouped = String::new();
            for (i, ch) in int_part.chars().enumerate() {
                if i > 0 && (int_part.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            let rendered = if value < 0.0 {
                format!("({}{})", grouped, frac)
            } else {
                format!("{}{}", grouped, frac)
            };
            let parsed = parse_amount(&Some(Value::Text(rendered))).unwrap();
            prop_assert!((parsed - value).abs() < 1e-9);
        }
    }
}
