//! Row filters applied to the master frame
//!
//! Every filter mutates the frame in place and returns how many rows it
//! removed (or, for the normalizers, how many cells it changed). A filter
//! whose column is missing leaves the frame untouched and returns 0.

use std::collections::{BTreeMap, HashSet};

use arrears_core::{Frame, Value};
use lazy_regex::regex;
use regex::Regex;

use crate::text::{collapse_ws, is_blank, scalar_text};

/// Rows removed or cells changed by each master stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub renamed_agents: usize,
    pub bad_agents: usize,
    pub agent_codes_changed: usize,
    pub fully_empty: usize,
    pub missing_identity: usize,
    pub non_numeric_code: usize,
    pub summary_rows: usize,
    pub export_channel: usize,
    pub other_rows: usize,
}

impl FilterCounts {
    /// Total rows removed across all stages
    pub fn rows_removed(&self) -> usize {
        self.bad_agents
            + self.fully_empty
            + self.missing_identity
            + self.non_numeric_code
            + self.summary_rows
            + self.export_channel
            + self.other_rows
    }
}

/// Replace misspelt agent names with their canonical form
pub fn rename_agents(frame: &mut Frame, column: &str, renames: &BTreeMap<String, String>) -> usize {
    let mut changed = 0;
    frame.map_column(column, |v| {
        let key = scalar_text(v);
        match renames.get(&key) {
            Some(canonical) => {
                changed += 1;
                Some(Value::text(canonical.as_str()))
            }
            None => v.clone(),
        }
    });
    changed
}

/// Drop rows whose agent, whitespace-collapsed, is on the exclusion list
pub fn remove_bad_agents(frame: &mut Frame, column: &str, bad: &[String]) -> usize {
    if !frame.has_column(column) || bad.is_empty() {
        return 0;
    }
    let bad: HashSet<&str> = bad.iter().map(String::as_str).collect();
    frame.retain_rows(|row| {
        let name = row.get(column).map(|v| collapse_ws(&v.to_string()));
        !name.is_some_and(|n| bad.contains(n.as_str()))
    })
}

/// Reduce agent codes to their digits
///
/// Values in `keep` pass through unchanged. Blank and dash-only values, and
/// values with no digits, become null. Whole numbers are read without their
/// fractional part. Returns the number of cells changed.
pub fn normalize_agent_code(frame: &mut Frame, column: &str, keep: &[String]) -> usize {
    let mut changed = 0;
    frame.map_column(column, |v| {
        let raw = match v {
            Some(Value::Number(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Some(other) => other.to_string(),
            None => return None,
        };
        let trimmed = raw.trim();
        let next = if keep.iter().any(|k| k == trimmed) {
            Some(Value::text(trimmed))
        } else if trimmed.is_empty() || regex!(r"^[-–—]+$").is_match(trimmed) {
            None
        } else {
            let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
            (!digits.is_empty()).then(|| Value::Text(digits))
        };
        if next.as_ref().map(Value::to_string) != Some(raw.clone()) {
            changed += 1;
        }
        next
    });
    changed
}

/// Drop rows in which every cell is null or blank
pub fn drop_fully_empty_rows(frame: &mut Frame) -> usize {
    frame.retain_rows(|row| !row.values().iter().all(is_blank))
}

/// Drop rows blank across every present column of `required`
pub fn drop_rows_missing_identity(frame: &mut Frame, required: &[String]) -> usize {
    let present: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|c| frame.has_column(c))
        .collect();
    if present.is_empty() {
        return 0;
    }
    frame.retain_rows(|row| {
        present
            .iter()
            .any(|c| row.get(c).is_some_and(|v| !v.is_blank()))
    })
}

/// Keep only rows whose agent code is one or more digits
pub fn filter_agent_code_required(frame: &mut Frame, column: &str) -> usize {
    if !frame.has_column(column) {
        return 0;
    }
    frame.retain_rows(|row| {
        row.get(column)
            .is_some_and(|v| regex!(r"^\d+$").is_match(v.to_string().trim()))
    })
}

/// Drop rows whose `column` text contains a summary marker
pub fn remove_summary_rows(frame: &mut Frame, column: &str, marker: &Regex) -> usize {
    if !frame.has_column(column) {
        return 0;
    }
    frame.retain_rows(|row| {
        !row.get(column)
            .is_some_and(|v| marker.is_match(v.to_string().trim()))
    })
}

/// Drop rows whose `column` equals `literal` after trimming
pub fn remove_export_channel(frame: &mut Frame, column: &str, literal: &str) -> usize {
    if !frame.has_column(column) {
        return 0;
    }
    frame.retain_rows(|row| row.get(column).map_or(true, |v| v.to_string().trim() != literal))
}

/// Drop rows where any present column of `columns` equals one of `values`
pub fn remove_other_rows(frame: &mut Frame, columns: &[String], values: &[String]) -> usize {
    let present: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|c| frame.has_column(c))
        .collect();
    if present.is_empty() {
        return 0;
    }
    frame.retain_rows(|row| {
        !present.iter().any(|c| {
            row.get(c)
                .is_some_and(|v| values.iter().any(|o| o == v.to_string().trim()))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> Option<Value> {
        Some(Value::text(s))
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn codes(frame: &Frame) -> Vec<Option<String>> {
        frame
            .column("קוד סוכן")
            .unwrap()
            .into_iter()
            .map(|v| v.as_ref().map(|v| v.to_string()))
            .collect()
    }

    #[test]
    fn test_agent_code_normalization_then_required() {
        let mut frame = Frame::new(["קוד סוכן", "לקוח קצה"]);
        for code in [t("12-34"), t("12a"), t("  "), t("אחר"), t("—"), Some(Value::Number(77.0)), t("abc")] {
            frame.push_row(vec![code, t("לקוח")]);
        }

        let changed = normalize_agent_code(&mut frame, "קוד סוכן", &owned(&["אחר"]));
        assert_eq!(changed, 5);
        assert_eq!(
            codes(&frame),
            vec![
                Some("1234".to_string()),
                Some("12".to_string()),
                None,
                Some("אחר".to_string()),
                None,
                Some("77".to_string()),
                None,
            ]
        );

        let removed = filter_agent_code_required(&mut frame, "קוד סוכן");
        assert_eq!(removed, 4);
        assert_eq!(codes(&frame), vec![Some("1234".into()), Some("12".into()), Some("77".into())]);
    }

    #[test]
    fn test_non_digit_code_without_normalization_is_dropped() {
        let mut frame = Frame::new(["קוד סוכן"]);
        frame.push_row(vec![t("12a")]);
        frame.push_row(vec![t("120")]);
        assert_eq!(filter_agent_code_required(&mut frame, "קוד סוכן"), 1);
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_empty_and_identity_filters() {
        let required = owned(&["קוד סוכן", "קוד לקוח קצה", "לקוח קצה"]);
        let mut frame = Frame::new(["סוכן", "קוד סוכן", "לקוח קצה"]);
        frame.push_row(vec![None, t(" "), None]);
        frame.push_row(vec![t("דנה"), None, t("  ")]);
        frame.push_row(vec![t("רון"), None, t("מכולת")]);

        assert_eq!(drop_fully_empty_rows(&mut frame), 1);
        assert_eq!(drop_rows_missing_identity(&mut frame, &required), 1);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.get(0, "סוכן"), Some(&Value::text("רון")));
    }

    #[test]
    fn test_summary_export_and_other() {
        let marker = Regex::new(r#"(?i)(?:סה"כ|סהכ|Total|סיכום)"#).unwrap();
        let mut frame = Frame::new(["קוד סוכן", "ערוץ", "מנהל סחר"]);
        frame.push_row(vec![t("סה\"כ 12"), t("שוק פרטי"), t("דנה")]);
        frame.push_row(vec![t("grand total"), t("שוק פרטי"), t("דנה")]);
        frame.push_row(vec![t("15"), t(" ייצוא "), t("דנה")]);
        frame.push_row(vec![t("16"), t("שוק פרטי"), t("אחר אחר")]);
        frame.push_row(vec![t("17"), t("שוק פרטי"), t("אחרון")]);

        assert_eq!(remove_summary_rows(&mut frame, "קוד סוכן", &marker), 2);
        assert_eq!(remove_export_channel(&mut frame, "ערוץ", "ייצוא"), 1);
        let other_cols = owned(&["מנהל סחר", "מנהל אזור"]);
        assert_eq!(
            remove_other_rows(&mut frame, &other_cols, &owned(&["אחר", "אחר אחר"])),
            1
        );
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_missing_columns_are_noops() {
        let marker = Regex::new("x").unwrap();
        let mut frame = Frame::new(["a"]);
        frame.push_row(vec![t("x")]);

        assert_eq!(filter_agent_code_required(&mut frame, "קוד סוכן"), 0);
        assert_eq!(remove_summary_rows(&mut frame, "קוד סוכן", &marker), 0);
        assert_eq!(remove_export_channel(&mut frame, "ערוץ", "ייצוא"), 0);
        assert_eq!(remove_other_rows(&mut frame, &owned(&["מנהל סחר"]), &owned(&["x"])), 0);
        assert_eq!(drop_rows_missing_identity(&mut frame, &owned(&["קוד סוכן"])), 0);
        assert_eq!(normalize_agent_code(&mut frame, "קוד סוכן", &[]), 0);
        assert_eq!(remove_bad_agents(&mut frame, "סוכן", &owned(&["x"])), 0);
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_agent_corrections() {
        let mut renames = BTreeMap::new();
        renames.insert("יעל כץ מלונות".to_string(), "יעל כץ".to_string());
        let mut frame = Frame::new(["סוכן"]);
        frame.push_row(vec![t(" יעל כץ מלונות ")]);
        frame.push_row(vec![t("חובות   מסופקים")]);
        frame.push_row(vec![None]);

        assert_eq!(rename_agents(&mut frame, "סוכן", &renames), 1);
        assert_eq!(remove_bad_agents(&mut frame, "סוכן", &owned(&["חובות מסופקים"])), 1);
        assert_eq!(frame.get(0, "סוכן"), Some(&Value::text("יעל כץ")));
        assert_eq!(frame.len(), 2);
    }
}
