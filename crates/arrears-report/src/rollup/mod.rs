//! The "by agent" rollup sheet
//!
//! Built in passes over the workbook, each of which can be re-run on its own:
//!
//! 1. [`extract`] reads the two pivot sheets back by header text
//! 2. [`build`] writes agent rows and addition-chain subtotal rows
//! 3. [`passes::insert_separators`] adds blank rows above anchor agents
//! 4. [`passes::rebind`] finds every row again by name and rewrites the
//!    subtotal formulas, since insertion shifted the row numbers
//! 5. [`passes::link_national`] points linked members at their manager sheets
//! 6. [`passes::ensure_lag`] rewrites the lag-sum and ratio formulas from the
//!    located month range
//!
//! Layout is applied last by [`crate::layout::by_agent_layout`].

pub mod build;
pub mod extract;
pub mod passes;
pub mod tree;

use arrears_core::{CellAddress, Workbook, Worksheet};
use tracing::info;

use crate::config::{ColumnNames, ReportConfig};
use crate::derived::BuildOutcome;
use crate::error::Result;
use crate::layout;

pub use extract::{extract_pivot, PivotExtract, PivotRecord, RollupData};
pub use tree::{RollupTree, RowKey, Section};

/// Header of column C
pub const CURRENT_LAG_RATIO: &str = "פיגור גביה חודש נוכחי";
/// Header of column D, left blank for manual entry
pub const PRIOR_LAG_RATIO: &str = "פיגור גביה חודש קודם";
/// Header of column E
pub const LAG_DIFFERENCE: &str = "הפרש";
/// Header of the lag-sum column after the months
pub const LAG_SUM: &str = "סך פיגור";

/// Substrings marking a month column header
pub const MONTH_HINTS: [&str; 2] = ["חודש", "טרם"];

/// Headers that contain a month hint but are not month columns
pub const NOT_MONTH_TITLES: [&str; 6] = [
    "שיטת תשלום לקוח משלם",
    "שיטת תשלום",
    "לקוח משלם",
    CURRENT_LAG_RATIO,
    PRIOR_LAG_RATIO,
    LAG_DIFFERENCE,
];

pub(crate) const COL_RATIO: u16 = 2;
pub(crate) const COL_PRIOR: u16 = 3;
pub(crate) const COL_DIFF: u16 = 4;
pub(crate) const COL_TOTAL: u16 = 5;
pub(crate) const COL_TODAY: u16 = 6;
pub(crate) const FIRST_MONTH_COL: u16 = 7;

pub(crate) const PERCENT_FORMAT: &str = "0.00%";

pub(crate) fn is_month_title(title: &str) -> bool {
    MONTH_HINTS.iter().any(|h| title.contains(h)) && !NOT_MONTH_TITLES.contains(&title)
}

/// Column letter for formulas
pub(crate) fn letter(col: u16) -> String {
    CellAddress::column_to_letters(col)
}

/// Sheet name quoted for use in a formula reference
pub(crate) fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Column positions of a by-agent sheet, read from its header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupColumns {
    pub agent: u16,
    pub channel: u16,
    pub total: u16,
    pub today: u16,
    /// Month columns, left to right
    pub months: Vec<u16>,
    pub lag: Option<u16>,
}

impl RollupColumns {
    /// Locate columns by header text, falling back to the standard positions
    pub fn read(sheet: &Worksheet, names: &ColumnNames) -> Self {
        let headers = sheet.header_map(0);
        let find = |name: &str, default: u16| headers.get(name).copied().unwrap_or(default);
        let lag = headers.get(LAG_SUM).copied();
        let months = (FIRST_MONTH_COL..sheet.col_count())
            .filter(|&c| lag.map_or(true, |l| c < l))
            .filter(|&c| is_month_title(&sheet.text_at(0, c)))
            .collect();
        Self {
            agent: find(&names.agent, 0),
            channel: find(&names.channel, 1),
            total: find(&names.total, COL_TOTAL),
            today: find(&names.today, COL_TODAY),
            months,
            lag,
        }
    }
}

/// Build the by-agent sheet from the pivot sheets already in `workbook`
///
/// Not built when the private pivot sheet is missing.
pub fn build_rollup(workbook: &mut Workbook, config: &ReportConfig) -> Result<BuildOutcome> {
    let tree = &config.rollup;
    let cols = &config.columns;
    let max_months = config.derived.max_dynamic_columns;

    let Some(private) = workbook.worksheet_by_name(&config.pivots.private.sheet) else {
        return Ok(BuildOutcome::NotBuilt {
            reason: format!("pivot sheet '{}' is missing", config.pivots.private.sheet),
        });
    };
    let mut data = RollupData::default();
    data.absorb(
        extract_pivot(private, &cols.total, &cols.today, max_months),
        &tree.private_channel,
    );
    if let Some(image) = workbook.worksheet_by_name(&config.pivots.image.sheet) {
        data.absorb(
            extract_pivot(image, &cols.total, &cols.today, max_months),
            &tree.image_channel,
        );
    }
    info!(
        records = data.len(),
        months = data.month_headers().len(),
        "pivot records extracted"
    );

    let sheet = workbook.replace_worksheet(&tree.sheet_name)?;
    build::write_rollup(sheet, tree, &data, cols)?;
    let inserted = passes::insert_separators(sheet, &tree.separators_before);
    let rebound = passes::rebind(sheet, tree, cols)?;

    let linked = passes::link_national(workbook, tree, cols)?;

    let sheet = workbook
        .worksheet_by_name_mut(&tree.sheet_name)
        .ok_or_else(|| crate::error::ReportError::SheetMissing(tree.sheet_name.clone()))?;
    passes::ensure_lag(sheet, cols)?;
    layout::by_agent_layout(sheet, tree, cols)?;

    let rows = sheet.row_count().saturating_sub(1) as usize;
    info!(rows, inserted, rebound, linked, "by-agent sheet written");
    Ok(BuildOutcome::Built {
        sheet: tree.sheet_name.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_titles() {
        assert!(is_month_title("סכום יתרת חוב לחודש Mar"));
        assert!(is_month_title("סכום יתרת חוב טרם חודש Jan"));
        assert!(!is_month_title(CURRENT_LAG_RATIO));
        assert!(!is_month_title("סה\"כ סכום יתרת חוב"));
    }

    #[test]
    fn test_quote_sheet() {
        assert_eq!(quote_sheet("ארז ביתן"), "'ארז ביתן'");
        assert_eq!(quote_sheet("it's"), "'it''s'");
    }
}
