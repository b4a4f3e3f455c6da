//! Follow-up passes over a written by-agent sheet
//!
//! None of these trust row numbers from an earlier pass. Rows are found
//! again by their label (and channel) every time, so each pass can be re-run
//! after any other.

use std::collections::{HashMap, HashSet};

use arrears_core::{Workbook, Worksheet};

use super::build::{addition_chain, write_lag_cells};
use super::tree::{RollupTree, RowKey, Section};
use super::{
    letter, quote_sheet, RollupColumns, COL_DIFF, COL_PRIOR, COL_RATIO, FIRST_MONTH_COL, LAG_SUM,
    NOT_MONTH_TITLES, PERCENT_FORMAT,
};
use crate::config::ColumnNames;
use crate::error::{ReportError, Result};
use crate::master::AMOUNT_FORMAT;

/// Insert a blank row above each anchor row whose previous row is not blank
///
/// The first data row always gets one. Returns the number of rows inserted.
pub fn insert_separators(sheet: &mut Worksheet, anchors: &[String]) -> usize {
    let anchors: HashSet<&str> = anchors.iter().map(String::as_str).collect();
    let mut inserted = 0;
    let mut row = 1;
    while row < sheet.row_count() {
        if anchors.contains(sheet.text_at(row, 0).as_str()) {
            let prev_blank = row > 1 && sheet.is_row_blank(row - 1);
            if !prev_blank {
                sheet.insert_rows(row, 1);
                inserted += 1;
                row += 1;
            }
        }
        row += 1;
    }
    inserted
}

/// Forward-only row lookup over column A/B
struct Locator<'a> {
    sheet: &'a Worksheet,
    cols: &'a RollupColumns,
    cursor: u32,
}

impl Locator<'_> {
    /// First row at or after the cursor labelled `label` whose channel
    /// satisfies `channel_ok`; moves the cursor past it
    fn next(&mut self, label: &str, channel_ok: impl Fn(&str) -> bool) -> Option<u32> {
        let found = (self.cursor..self.sheet.row_count()).find(|&r| {
            self.sheet.text_at(r, self.cols.agent) == label
                && channel_ok(self.sheet.text_at(r, self.cols.channel).as_str())
        })?;
        self.cursor = found + 1;
        Some(found)
    }

    /// Subtotal row labelled `label` reached from the cursor over blank rows
    /// and rows labelled in `passable` only; moves the cursor past it
    ///
    /// Any other row in the way ends the search, so a missing subtotal never
    /// binds a later row that shares its label.
    fn closing(&mut self, label: &str, passable: &HashSet<&str>) -> Option<u32> {
        for row in self.cursor..self.sheet.row_count() {
            if self.sheet.is_row_blank(row) {
                continue;
            }
            let text = self.sheet.text_at(row, self.cols.agent);
            if text == label && self.sheet.text_at(row, self.cols.channel).is_empty() {
                self.cursor = row + 1;
                return Some(row);
            }
            if !passable.contains(text.as_str()) {
                return None;
            }
        }
        None
    }
}

/// Re-locate every section row and rewrite the subtotal formulas
///
/// Sections are matched in tree order starting below the previous match.
/// A subtotal row must directly follow its section's rows (blank rows
/// aside), which tells apart subtotals that share a label. Rows that cannot
/// be found are skipped. Returns the number of subtotal rows rewritten.
pub fn rebind(sheet: &mut Worksheet, tree: &RollupTree, names: &ColumnNames) -> Result<usize> {
    let cols = RollupColumns::read(sheet, names);
    let mut plan: Vec<(u32, Vec<u32>)> = Vec::new();
    {
        let mut locate = Locator {
            sheet,
            cols: &cols,
            cursor: 1,
        };
        let mut rows: HashMap<RowKey, u32> = HashMap::new();
        for section in &tree.sections {
            match section {
                Section::Group {
                    label,
                    members,
                    channel,
                    linked,
                    ..
                } => {
                    let sources: Vec<u32> = members
                        .iter()
                        .filter_map(|m| locate.next(m, |c| *linked || c == channel.as_str()))
                        .collect();
                    let own: HashSet<&str> = members.iter().map(String::as_str).collect();
                    if let Some(row) = locate.closing(label, &own) {
                        rows.insert(RowKey::subtotal(label.as_str()), row);
                        plan.push((row, sources));
                    }
                }
                Section::Single { name, channel } => {
                    if let Some(row) = locate.next(name, |c| c == channel.as_str()) {
                        rows.insert(RowKey::agent(name.as_str(), channel.as_str()), row);
                    }
                }
                Section::SubtotalOf { label, parts, .. } => {
                    if let Some(row) = locate.closing(label, &HashSet::new()) {
                        let sources = parts.iter().filter_map(|p| rows.get(p).copied()).collect();
                        rows.insert(RowKey::subtotal(label.as_str()), row);
                        plan.push((row, sources));
                    }
                }
            }
        }
    }

    for (row, sources) in &plan {
        for col in [cols.total, cols.today].into_iter().chain(cols.months.iter().copied()) {
            sheet.set_cell_value_at(*row, col, addition_chain(col, sources))?;
        }
    }
    tracing::debug!(rows = plan.len(), "subtotal formulas rebound");
    Ok(plan.len())
}

/// `=LOOKUP(2,1/('tab'!X:X<>""),'tab'!X:X)`: the last non-blank value of a column
fn last_value_formula(tab: &str, col: u16) -> String {
    let range = format!("{}!{}:{}", quote_sheet(tab), letter(col), letter(col));
    format!("=LOOKUP(2,1/({}<>\"\"),{})", range, range)
}

/// Manager sheet columns holding the total and today figures
const MANAGER_TOTAL_COL: u16 = 7;
const MANAGER_TODAY_COL: u16 = 8;

/// Point linked members at the last values of their manager sheets
///
/// Total and today come from columns H and I; month columns are matched by
/// exact header text, and months the manager sheet lacks are left alone.
/// Members without a sheet, or without a row, are skipped. Returns the
/// number of rows linked.
pub fn link_national(workbook: &mut Workbook, tree: &RollupTree, names: &ColumnNames) -> Result<usize> {
    let sheet = workbook
        .worksheet_by_name(&tree.sheet_name)
        .ok_or_else(|| ReportError::SheetMissing(tree.sheet_name.clone()))?;
    let cols = RollupColumns::read(sheet, names);
    let month_titles: Vec<(u16, String)> = cols
        .months
        .iter()
        .map(|&c| (c, sheet.text_at(0, c)))
        .collect();

    // (row, column, formula) edits, gathered while the manager sheets are borrowed
    let mut edits: Vec<(u32, u16, String)> = Vec::new();
    let mut linked_rows: Vec<u32> = Vec::new();
    for member in tree.linked_members() {
        let Some(manager) = workbook.worksheet_by_name(member) else {
            continue;
        };
        let Some(row) = (1..sheet.row_count()).find(|&r| sheet.text_at(r, cols.agent) == member)
        else {
            continue;
        };
        linked_rows.push(row);
        edits.push((row, cols.total, last_value_formula(member, MANAGER_TOTAL_COL)));
        edits.push((row, cols.today, last_value_formula(member, MANAGER_TODAY_COL)));

        let manager_headers = manager.header_map(0);
        for (col, title) in &month_titles {
            if let Some(&source) = manager_headers.get(title) {
                edits.push((row, *col, last_value_formula(member, source)));
            }
        }
    }

    let sheet = workbook
        .worksheet_by_name_mut(&tree.sheet_name)
        .ok_or_else(|| ReportError::SheetMissing(tree.sheet_name.clone()))?;
    for &row in &linked_rows {
        sheet.set_cell_value_at(row, cols.channel, tree.national_channel.as_str())?;
    }
    for (row, col, formula) in edits {
        sheet.set_cell_formula_at(row, col, &formula)?;
    }
    tracing::debug!(linked = linked_rows.len(), "national rows linked");
    Ok(linked_rows.len())
}

/// Rewrite lag-sum, ratio and difference formulas and number formats on every non-blank row
///
/// Month columns are the located month headers, or failing that every
/// column between today and the lag sum. The lag-sum column is created
/// after the last month when missing. Returns false when no month column
/// can be found.
pub fn ensure_lag(sheet: &mut Worksheet, names: &ColumnNames) -> Result<bool> {
    let mut cols = RollupColumns::read(sheet, names);
    if cols.months.is_empty() {
        let start = (cols.today + 1).max(FIRST_MONTH_COL);
        let end = cols.lag.unwrap_or_else(|| sheet.col_count());
        cols.months = (start..end)
            .filter(|&c| !NOT_MONTH_TITLES.contains(&sheet.text_at(0, c).as_str()))
            .collect();
    }
    let Some(&last_month) = cols.months.last() else {
        return Ok(false);
    };

    let lag = match cols.lag {
        Some(lag) => lag,
        None => {
            let lag = last_month + 1;
            sheet.insert_columns(lag, 1);
            sheet.set_cell_value_at(0, lag, LAG_SUM)?;
            lag
        }
    };

    let width = sheet.col_count();
    for row in 1..sheet.row_count() {
        if sheet.is_row_blank(row) {
            continue;
        }
        write_lag_cells(sheet, row, &cols.months, lag, cols.total)?;
        for col in [COL_RATIO, COL_PRIOR, COL_DIFF] {
            sheet.update_style_at(row, col, |s| {
                s.number_format = Some(PERCENT_FORMAT.to_string());
            })?;
        }
        for col in cols.total.min(cols.today)..width {
            sheet.update_style_at(row, col, |s| {
                s.number_format = Some(AMOUNT_FORMAT.to_string());
            })?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::build::write_rollup;
    use crate::rollup::extract::RollupData;
    use arrears_core::CellValue;
    use pretty_assertions::assert_eq;

    fn formula(sheet: &Worksheet, row: u32, col: u16) -> String {
        sheet
            .get_value_at(row, col)
            .formula_text()
            .unwrap_or_default()
            .to_string()
    }

    fn row_of(sheet: &Worksheet, label: &str) -> u32 {
        (0..sheet.row_count())
            .find(|&r| sheet.text_at(r, 0) == label)
            .unwrap()
    }

    fn written() -> (Worksheet, RollupTree) {
        let tree = RollupTree::default();
        let mut sheet = Worksheet::new(tree.sheet_name.clone());
        write_rollup(&mut sheet, &tree, &RollupData::default(), &ColumnNames::default()).unwrap();
        (sheet, tree)
    }

    #[test]
    fn test_separators_are_idempotent() {
        let (mut sheet, tree) = written();
        assert_eq!(insert_separators(&mut sheet, &tree.separators_before), 4);
        assert!(sheet.is_row_blank(row_of(&sheet, "גילי סופר") - 1));
        assert!(sheet.is_row_blank(row_of(&sheet, "סיכום שוק פרטי") - 1));
        assert_eq!(insert_separators(&mut sheet, &tree.separators_before), 0);
    }

    #[test]
    fn test_rebind_follows_inserted_rows() {
        let (mut sheet, tree) = written();
        let names = ColumnNames::default();
        insert_separators(&mut sheet, &tree.separators_before);

        // stale formulas still point at pre-insert rows
        let center = row_of(&sheet, "סה\"כ מוקד");
        assert_eq!(formula(&sheet, center, 5), "=F18+F19");

        assert_eq!(rebind(&mut sheet, &tree, &names).unwrap(), 9);
        let gili = row_of(&sheet, "גילי סופר");
        assert_eq!(
            formula(&sheet, center, 5),
            format!("=F{}+F{}", gili + 1, gili + 2)
        );

        // the grand total is the second "סה"כ" row and references the first
        let pair = (0..sheet.row_count())
            .find(|&r| sheet.text_at(r, 0) == "סה\"כ")
            .unwrap();
        let grand = sheet.row_count() - 1;
        let grand_formula = formula(&sheet, grand, 6);
        assert!(grand_formula.contains(&format!("G{}", pair + 1)));
        assert!(!grand_formula.contains(&format!("G{}", grand + 1)));

        // re-running changes nothing
        let before = formula(&sheet, grand, 5);
        rebind(&mut sheet, &tree, &names).unwrap();
        assert_eq!(formula(&sheet, grand, 5), before);
    }

    #[test]
    fn test_rebind_skips_missing_rows() {
        let (mut sheet, tree) = written();
        let ami = row_of(&sheet, "חיים שלו");
        sheet.delete_rows(ami, 1);
        rebind(&mut sheet, &tree, &ColumnNames::default()).unwrap();
        let total = row_of(&sheet, "עמי חכמון");
        assert_eq!(
            formula(&sheet, total, 5),
            format!("=F{}+F{}", total - 1, total)
        );
    }

    #[test]
    fn test_rebind_keeps_shared_label_apart_when_one_is_missing() {
        let (mut sheet, tree) = written();
        let names = ColumnNames::default();
        let pair = row_of(&sheet, "סה\"כ");
        sheet.delete_rows(pair, 1);

        assert_eq!(rebind(&mut sheet, &tree, &names).unwrap(), 8);

        let grand = sheet.row_count() - 1;
        assert_eq!(sheet.text_at(grand, 0), "סה\"כ");
        let private = row_of(&sheet, "סיכום שוק פרטי");
        let ami = row_of(&sheet, "עמי חכמון");
        let national = row_of(&sheet, "סה\"כ רשתות ארציות");
        assert_eq!(
            formula(&sheet, grand, 5),
            format!("=F{}+F{}+F{}", private + 1, ami + 1, national + 1)
        );
        // the rows after the gap are still bound
        let erez = row_of(&sheet, "ארז ביתן");
        assert!(formula(&sheet, national, 5).starts_with(&format!("=F{}+", erez + 1)));
    }

    #[test]
    fn test_rebind_skips_missing_grand_total() {
        let (mut sheet, tree) = written();
        let grand = sheet.row_count() - 1;
        sheet.delete_rows(grand, 1);

        assert_eq!(rebind(&mut sheet, &tree, &ColumnNames::default()).unwrap(), 8);
        let pair = row_of(&sheet, "סה\"כ");
        let yael = row_of(&sheet, "יעל כץ");
        assert_eq!(formula(&sheet, pair, 5), format!("=F{}+F{}", yael + 1, yael + 2));
    }

    #[test]
    fn test_link_national_matches_months_by_title() {
        let tree = RollupTree::default();
        let names = ColumnNames::default();
        let mut data = RollupData::default();
        data.absorb(
            crate::rollup::PivotExtract {
                records: Vec::new(),
                month_headers: vec!["סכום יתרת חוב לחודש Feb".into(), "סכום יתרת חוב לחודש Mar".into()],
            },
            "שוק פרטי",
        );
        let mut workbook = Workbook::new();
        let sheet = workbook.replace_worksheet(&tree.sheet_name).unwrap();
        write_rollup(sheet, &tree, &data, &names).unwrap();

        let manager = workbook.replace_worksheet("ארז ביתן").unwrap();
        let headers = [
            "מנהל סחר", "מנהל אזור", "סוכן", "ערוץ", "קוד לקוח משלם", "לקוח משלם", "קוד סוכן",
            "סה\"כ סכום יתרת חוב", "סה\"כ סכום יתרת חוב עד היום",
            "סכום יתרת חוב לחודש Mar", "טור עזר",
        ];
        manager.append_row(headers.to_vec()).unwrap();

        assert_eq!(link_national(&mut workbook, &tree, &names).unwrap(), 1);
        let sheet = workbook.worksheet_by_name(&tree.sheet_name).unwrap();
        let row = row_of(sheet, "ארז ביתן");
        assert_eq!(sheet.text_at(row, 1), "רשתות ארציות");
        assert_eq!(
            formula(sheet, row, 5),
            "=LOOKUP(2,1/('ארז ביתן'!H:H<>\"\"),'ארז ביתן'!H:H)"
        );
        // Feb is not on the manager sheet and keeps its value; Mar reads column J
        assert_eq!(sheet.get_value_at(row, 7), CellValue::Number(0.0));
        assert_eq!(
            formula(sheet, row, 8),
            "=LOOKUP(2,1/('ארז ביתן'!J:J<>\"\"),'ארז ביתן'!J:J)"
        );
        // no manager sheet, no link
        let other = row_of(sheet, "עינב כורם");
        assert_eq!(sheet.text_at(other, 1), "");
    }

    #[test]
    fn test_ensure_lag_creates_missing_column() {
        let mut sheet = Worksheet::new("לפי סוכן");
        sheet
            .append_row(vec![
                "סוכן",
                "ערוץ",
                "פיגור גביה חודש נוכחי",
                "פיגור גביה חודש קודם",
                "הפרש",
                "סה\"כ סכום יתרת חוב",
                "סה\"כ סכום יתרת חוב עד היום",
                "סכום יתרת חוב לחודש Feb",
                "סכום יתרת חוב לחודש Mar",
                "הערות",
            ])
            .unwrap();
        sheet
            .append_row(vec![
                CellValue::from("דנה"),
                "שוק פרטי".into(),
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Empty,
                100.0.into(),
                50.0.into(),
                10.0.into(),
                20.0.into(),
                "x".into(),
            ])
            .unwrap();

        assert!(ensure_lag(&mut sheet, &ColumnNames::default()).unwrap());
        assert_eq!(sheet.text_at(0, 9), LAG_SUM);
        assert_eq!(sheet.text_at(0, 10), "הערות");
        assert_eq!(formula(&sheet, 1, 9), "=SUM(H2:I2)");
        assert_eq!(formula(&sheet, 1, 2), "=IFERROR(J2/F2,0)");
        assert_eq!(
            sheet.style_at(1, 3).and_then(|s| s.number_format.as_deref()),
            Some(PERCENT_FORMAT)
        );
        assert_eq!(
            sheet.style_at(1, 5).and_then(|s| s.number_format.as_deref()),
            Some(AMOUNT_FORMAT)
        );
    }
}
