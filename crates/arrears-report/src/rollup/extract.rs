//! Reading pivot sheets back
//!
//! Pivot sheets are located by header text rather than position so that a
//! hand-edited pivot (extra columns, a title row, Excel's "Row Labels") still
//! reads. Only cell values are used; formula cells count as their cached value.

use std::collections::HashMap;

use arrears_core::{CellValue, Worksheet};

use super::MONTH_HINTS;

/// Rows scanned when looking for the header
const HEADER_SCAN_ROWS: u32 = 40;

/// Header texts naming the agent column
pub const AGENT_KEYS: [&str; 3] = ["תוויות שורה", "סוכן", "Row Labels"];

/// Agent labels of grand-total rows
const TOTAL_LABELS: [&str; 6] = ["Grand Total", "סה\"כ", "סהכ", "Total", "סך הכל", "סכום כולל"];

/// Figures for one agent in one pivot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotRecord {
    pub total: f64,
    pub today: f64,
    /// Month header text and value, in pivot column order
    pub months: Vec<(String, f64)>,
}

impl PivotRecord {
    /// Value of the month titled `title`, 0 when the pivot had no such column
    pub fn month(&self, title: &str) -> f64 {
        self.months
            .iter()
            .find(|(t, _)| t == title)
            .map_or(0.0, |(_, v)| *v)
    }
}

/// Agent records and month headers read from one pivot sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotExtract {
    pub records: Vec<(String, PivotRecord)>,
    pub month_headers: Vec<String>,
}

/// Records of both pivots keyed by (agent, channel)
#[derive(Debug, Clone, Default)]
pub struct RollupData {
    records: HashMap<(String, String), PivotRecord>,
    month_headers: Vec<String>,
}

impl RollupData {
    /// Add a pivot's records under `channel`; month headers not seen yet are appended
    pub fn absorb(&mut self, extract: PivotExtract, channel: &str) {
        for (agent, record) in extract.records {
            self.records.insert((agent, channel.to_string()), record);
        }
        for header in extract.month_headers {
            if !self.month_headers.contains(&header) {
                self.month_headers.push(header);
            }
        }
    }

    pub fn get(&self, agent: &str, channel: &str) -> Option<&PivotRecord> {
        self.records.get(&(agent.to_string(), channel.to_string()))
    }

    pub fn month_headers(&self) -> &[String] {
        &self.month_headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn row_texts(sheet: &Worksheet, row: u32) -> Vec<String> {
    (0..sheet.col_count()).map(|c| sheet.text_at(row, c)).collect()
}

/// Header row: the first row whose column A is an agent key, else the
/// fullest row mentioning a key, an amount header or a month hint
fn find_header_row(sheet: &Worksheet, total_key: &str, today_key: &str) -> Option<u32> {
    let limit = sheet.row_count().min(HEADER_SCAN_ROWS);
    if let Some(row) = (0..limit).find(|&r| AGENT_KEYS.contains(&sheet.text_at(r, 0).as_str())) {
        return Some(row);
    }

    let mut best: Option<(usize, u32)> = None;
    for row in 0..limit {
        let texts = row_texts(sheet, row);
        let filled = texts.iter().filter(|t| !t.is_empty()).count();
        let line = texts.join(" | ");
        let mentions = AGENT_KEYS.iter().any(|k| line.contains(k))
            || line.contains(total_key)
            || line.contains(today_key)
            || MONTH_HINTS.iter().any(|h| line.contains(h));
        if mentions && best.map_or(true, |(n, _)| filled > n) {
            best = Some((filled, row));
        }
    }
    best.map(|(_, row)| row)
}

/// Column whose header contains `key` once pivot decorations are stripped
fn find_containing(headers: &[String], key: &str) -> Option<u16> {
    headers
        .iter()
        .position(|h| h.replace("סכום של", "").replace('Σ', "").trim().contains(key))
        .map(|c| c as u16)
}

fn number_at(sheet: &Worksheet, row: u32, col: Option<u16>) -> f64 {
    let Some(col) = col else {
        return 0.0;
    };
    match sheet.get_value_at(row, col).effective_value() {
        CellValue::Number(n) => *n,
        CellValue::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Read agent records from a pivot sheet
///
/// Reading stops at the first fully blank row; grand-total rows are skipped.
/// Missing figures read as 0. At most `max_months` month columns are kept.
pub fn extract_pivot(
    sheet: &Worksheet,
    total_key: &str,
    today_key: &str,
    max_months: usize,
) -> PivotExtract {
    let Some(header_row) = find_header_row(sheet, total_key, today_key) else {
        return PivotExtract::default();
    };
    let headers = row_texts(sheet, header_row);
    let agent_col = headers
        .iter()
        .position(|h| AGENT_KEYS.contains(&h.as_str()))
        .unwrap_or(0) as u16;

    let mut total_col = find_containing(&headers, total_key);
    let mut today_col = find_containing(&headers, today_key);
    if total_col.is_none() && today_col.is_none() {
        let numeric: Vec<u16> = (agent_col + 1..sheet.col_count())
            .filter(|&c| {
                matches!(
                    sheet.get_value_at(header_row + 1, c).effective_value(),
                    CellValue::Number(_)
                )
            })
            .take(2)
            .collect();
        total_col = numeric.first().copied();
        today_col = numeric.get(1).copied();
    }

    let month_cols: Vec<(u16, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| MONTH_HINTS.iter().any(|hint| h.contains(hint)))
        .take(max_months)
        .map(|(c, h)| (c as u16, h.clone()))
        .collect();

    let mut records = Vec::new();
    for row in header_row + 1..sheet.row_count() {
        if sheet.is_row_blank(row) {
            break;
        }
        let agent = sheet.text_at(row, agent_col);
        if agent.is_empty() || TOTAL_LABELS.contains(&agent.as_str()) {
            continue;
        }
        let record = PivotRecord {
            total: number_at(sheet, row, total_col),
            today: number_at(sheet, row, today_col),
            months: month_cols
                .iter()
                .map(|(c, title)| (title.clone(), number_at(sheet, row, Some(*c))))
                .collect(),
        };
        records.push((agent, record));
    }

    PivotExtract {
        records,
        month_headers: month_cols.into_iter().map(|(_, h)| h).collect(),
    }
}
