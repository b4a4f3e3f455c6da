//! Text normalization shared by the filters and builders

use std::collections::HashSet;

use arrears_core::{Scalar, MAX_SHEET_NAME_LEN};
use lazy_regex::regex;

/// Trimmed display text of a frame cell; null is ""
pub fn scalar_text(value: &Scalar) -> String {
    value
        .as_ref()
        .map(|v| v.to_string().trim().to_string())
        .unwrap_or_default()
}

/// True when the cell is null or whitespace
pub fn is_blank(value: &Scalar) -> bool {
    value.as_ref().map_or(true, |v| v.is_blank())
}

/// Collapse runs of whitespace to one space and trim
pub fn collapse_ws(s: &str) -> String {
    regex!(r"\s+").replace_all(s, " ").trim().to_string()
}

/// Canonical form for comparing names typed with different dashes and spacing
///
/// Drops bidi marks, unifies dash variants to `-`, puts exactly one space on
/// each side of a dash, then collapses whitespace.
pub fn norm_text(s: &str) -> String {
    let s: String = s
        .chars()
        .filter(|c| !matches!(c, '\u{200f}' | '\u{200e}'))
        .map(|c| match c {
            '–' | '—' | '‐' | '־' => '-',
            c => c,
        })
        .collect();
    let s = regex!(r"\s*-\s*").replace_all(&s, " - ");
    collapse_ws(&s)
}

/// Sheet-name form of `name` before collision handling
pub fn sheet_name_base(name: &str) -> String {
    let s = regex!(r"[:\\/?*\[\]]").replace_all(name, " ");
    let s = s.trim();
    if s.is_empty() {
        "Sheet".to_string()
    } else {
        s.chars().take(MAX_SHEET_NAME_LEN).collect()
    }
}

/// Sheet-safe, unique name for `name`; records the result in `used`
///
/// Collisions get `_1`, `_2`, ... suffixes, truncating the base so the
/// result stays within the sheet-name limit.
pub fn sanitize_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = sheet_name_base(name);
    let mut candidate = base.clone();
    let mut n = 1;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!("_{}", n);
        let room = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = base.chars().take(room).collect::<String>() + &suffix;
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}
