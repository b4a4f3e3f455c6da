//! Header discovery and column ordering
//!
//! Amount columns in the source carry the month they refer to in their
//! header text (`סכום יתרת חוב לחודש Mar עד היום`). [`classify_header`]
//! recognises the five phrasings, and [`infer_desired_headers`] turns a raw
//! header list into a stable display order.

use std::collections::HashSet;

use arrears_core::{dedupe_names, CellAddress, Frame, Worksheet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};

/// Calendar month abbreviations in sort order
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// What an amount column measures relative to its month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonthVariant {
    /// Balance due before the month
    Before,
    /// Balance for the month
    Month,
    /// The month's balance due up to today
    ToDate,
    /// The month's balance due from tomorrow to month end
    Remaining,
    /// Balance due after the month
    Beyond,
}

/// Semantic role of a column header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderRole {
    /// One of the fixed identity/total columns
    Fixed,
    /// Month-scoped amount; `month` indexes [`MONTHS`]
    Amount { variant: MonthVariant, month: usize },
    Unclassified,
}

const MONTH_GROUP: &str = "(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";

/// Patterns in match order; `Month` must be tried after the longer phrasings
static PATTERNS: Lazy<Vec<(MonthVariant, Regex)>> = Lazy::new(|| {
    [
        (MonthVariant::Before, r"סכום יתרת חוב\s*טרם\s*חודש\s*{M}\s*$"),
        (MonthVariant::ToDate, r"סכום יתרת חוב\s*לחודש\s*{M}\s*עד היום\s*$"),
        (
            MonthVariant::Remaining,
            r"סכום יתרת חוב\s*לחודש\s*{M}\s*ממחר עד סוף החודש\s*$",
        ),
        (MonthVariant::Month, r"סכום יתרת חוב\s*לחודש\s*{M}\s*$"),
        (MonthVariant::Beyond, r"סכום יתרת חוב\s*מעבר לחודש\s*{M}\s*$"),
    ]
    .into_iter()
    .filter_map(|(variant, pattern)| {
        let pattern = format!("^{}", pattern.replace("{M}", MONTH_GROUP));
        Regex::new(&pattern).ok().map(|re| (variant, re))
    })
    .collect()
});

/// Classify one header against the fixed list and the month patterns
pub fn classify_header(header: &str, fixed: &[String]) -> HeaderRole {
    if fixed.iter().any(|f| f == header) {
        return HeaderRole::Fixed;
    }
    for (variant, re) in PATTERNS.iter() {
        if let Some(caps) = re.captures(header) {
            let month = caps
                .get(1)
                .and_then(|m| MONTHS.iter().position(|name| *name == m.as_str()))
                .unwrap_or(MONTHS.len());
            return HeaderRole::Amount {
                variant: *variant,
                month,
            };
        }
    }
    HeaderRole::Unclassified
}

/// Canonical display order for the recognised headers
///
/// Fixed headers come first in `fixed` order, then before-month amounts by
/// month, then each month's month/to-date/remaining amounts, then
/// beyond-month amounts by month. Unrecognised headers are left out. The
/// result does not depend on the order of `headers`.
pub fn infer_desired_headers(headers: &[String], fixed: &[String]) -> Vec<String> {
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let mut out: Vec<String> = fixed
        .iter()
        .filter(|f| present.contains(f.as_str()))
        .cloned()
        .collect();

    let mut amounts: Vec<((u8, usize, MonthVariant), &str)> = Vec::new();
    for header in &present {
        if let HeaderRole::Amount { variant, month } = classify_header(header, fixed) {
            let block = match variant {
                MonthVariant::Before => 0,
                MonthVariant::Beyond => 2,
                _ => 1,
            };
            amounts.push(((block, month, variant), *header));
        }
    }
    amounts.sort();
    out.extend(amounts.into_iter().map(|(_, h)| h.to_string()));
    out
}

/// First row within `scan_rows` holding at least `min_cells` values
pub fn detect_header_row(sheet: &Worksheet, scan_rows: usize, min_cells: usize) -> Result<u32> {
    let limit = sheet.row_count().min(scan_rows as u32);
    let width = sheet.col_count();
    (0..limit)
        .find(|&row| {
            sheet
                .row_values(row, width)
                .iter()
                .filter(|v| !v.is_blank())
                .count()
                >= min_cells
        })
        .ok_or(ReportError::HeaderNotFound {
            scanned: limit as usize,
        })
}

/// Trimmed header texts of `row`; blank headers take their column letter, repeats get ` (n)`
pub fn header_names(sheet: &Worksheet, row: u32) -> Vec<String> {
    let names = (0..sheet.col_count()).map(|col| {
        let text = sheet.text_at(row, col);
        if text.is_empty() {
            CellAddress::column_to_letters(col)
        } else {
            text
        }
    });
    dedupe_names(names)
}

/// Locate the header row and read every row below it into a frame
pub fn read_source_frame(sheet: &Worksheet, config: &ReportConfig) -> Result<Frame> {
    let header_row = detect_header_row(sheet, config.header_scan_rows, config.header_min_cells)?;
    let names = header_names(sheet, header_row);
    tracing::debug!(header_row, columns = names.len(), "header row located");
    Ok(Frame::from_sheet_rows(sheet, header_row, names))
}

/// Column layout of the master sheet
#[derive(Debug, Clone, PartialEq)]
pub struct MasterColumns {
    /// Columns in output order
    pub columns: Vec<String>,
    /// The sum column and the amount columns that follow it in the source
    pub amount_columns: Vec<String>,
}

/// Choose and order the master columns
///
/// Present front candidates come first; the sum column and the
/// `trailing_amount_columns` source columns after it are inserted right after
/// the agent-code column (appended when that column is absent). Front
/// columns inside that window stay where they are and are not treated as
/// amounts. When the sum column itself is missing, the inferred header order
/// is used instead.
pub fn select_master_columns(
    headers: &[String],
    config: &ReportConfig,
    sum_header: &str,
) -> MasterColumns {
    let Some(sum_idx) = headers.iter().position(|h| h == sum_header) else {
        let columns = infer_desired_headers(headers, &config.inference_prefix);
        let amount_columns = columns
            .iter()
            .filter(|h| {
                matches!(
                    classify_header(h, &config.inference_prefix),
                    HeaderRole::Amount { .. }
                )
            })
            .cloned()
            .collect();
        return MasterColumns {
            columns,
            amount_columns,
        };
    };

    let mut columns: Vec<String> = config
        .front_candidates
        .iter()
        .filter(|c| headers.contains(c))
        .cloned()
        .collect();

    let end = (sum_idx + 1 + config.trailing_amount_columns).min(headers.len());
    let amount_columns: Vec<String> = headers[sum_idx..end]
        .iter()
        .filter(|c| !columns.contains(c))
        .cloned()
        .collect();

    let block = amount_columns.clone();
    match columns.iter().position(|c| c == &config.columns.agent_code) {
        Some(at) => {
            columns.splice(at + 1..at + 1, block);
        }
        None => columns.extend(block),
    }
    MasterColumns {
        columns,
        amount_columns,
    }
}
