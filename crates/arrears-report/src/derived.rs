//! Derived breakdown sheets
//!
//! Every derived sheet shares one template:
//!
//! | A..D | E..F | G | H | I | J.. | last |
//! |---|---|---|---|---|---|---|
//! | manager, region, agent, channel | payer code, payer name | agent code | total | today | up to N dynamic amounts | helper |
//!
//! The dynamic amounts are the master columns right after the today column
//! (or the total column when today is absent). The helper column is their
//! row-wise sum and drives the suppression rule.

use std::collections::{BTreeSet, HashSet};

use arrears_core::{CellAddress, Frame, RowRef, Scalar, Value, Workbook, Worksheet};
use regex::Regex;
use tracing::{debug, info};

use crate::config::{ColumnNames, MarketFilter, ReportConfig};
use crate::error::{ReportError, Result};
use crate::layout;
use crate::master::sum_style;
use crate::numeric::coerce_number;
use crate::text::{collapse_ws, is_blank, norm_text, sanitize_sheet_name, scalar_text, sheet_name_base};

/// Result of a single builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built { sheet: String, rows: usize },
    NotBuilt { reason: String },
}

impl BuildOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self, BuildOutcome::Built { .. })
    }

    fn not_built<S: Into<String>>(reason: S) -> Self {
        BuildOutcome::NotBuilt {
            reason: reason.into(),
        }
    }
}

/// Manager values that stand for "no manager"
const NULL_LIKE: [&str; 3] = ["none", "nan", "null"];

/// Text that marks a leftover trailer row in the amount columns
const TRAILER_TEXT: &str = "סכום";

/// Up to `max` column names immediately after `anchor`
pub fn dynamic_columns(columns: &[String], anchor: &str, max: usize) -> Vec<String> {
    match columns.iter().position(|c| c == anchor) {
        Some(idx) => columns.iter().skip(idx + 1).take(max).cloned().collect(),
        None => Vec::new(),
    }
}

/// Dynamic columns after today, or after total when today yields none
fn anchored_dynamic_columns(columns: &[String], names: &ColumnNames, max: usize) -> Vec<String> {
    let dynamic = dynamic_columns(columns, &names.today, max);
    if dynamic.is_empty() {
        dynamic_columns(columns, &names.total, max)
    } else {
        dynamic
    }
}

/// Display text of a frame cell, "" when null
fn cell_string(row: &RowRef<'_>, column: &str) -> String {
    row.get(column).map(|v| v.to_string()).unwrap_or_default()
}

fn pick_first<'a>(frame: &Frame, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| frame.has_column(c))
}

/// A frame in the derived template and the dynamic columns it carries
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub frame: Frame,
    pub dynamic: Vec<String>,
}

/// Reshape master rows into the derived template
///
/// Template columns whose source is absent are all null. Total, today and
/// dynamic cells are coerced to numbers; text that does not parse becomes null.
pub fn reshape(sub: &Frame, names: &ColumnNames, max_dynamic: usize) -> DerivedTable {
    let dynamic = anchored_dynamic_columns(sub.columns(), names, max_dynamic);

    let identity: [(&str, Option<&str>); 7] = [
        (&names.manager, Some(names.manager.as_str())),
        (
            &names.region,
            pick_first(sub, &[names.region.as_str(), names.region_alt.as_str()]),
        ),
        (&names.agent, Some(names.agent.as_str())),
        (&names.channel, Some(names.channel.as_str())),
        (
            &names.payer_code,
            pick_first(sub, &[names.customer_code.as_str(), names.payer_code.as_str()]),
        ),
        (
            &names.payer_name,
            pick_first(sub, &[names.customer_name.as_str(), names.payer_name.as_str()]),
        ),
        (&names.agent_code, Some(names.agent_code.as_str())),
    ];

    let mut headers: Vec<&str> = identity.iter().map(|(h, _)| *h).collect();
    headers.push(&names.total);
    headers.push(&names.today);
    headers.extend(dynamic.iter().map(String::as_str));
    headers.push(&names.helper);

    let mut frame = Frame::new(headers);
    for row in sub.iter() {
        let cell = |name: &str| -> Scalar { row.get(name).cloned() };
        let number = |name: &str| coerce_number(&cell(name)).map(Value::Number);

        let mut out: Vec<Scalar> = identity
            .iter()
            .map(|(_, source)| source.and_then(|s| row.get(s).cloned()))
            .collect();
        out.push(number(&names.total));
        out.push(number(&names.today));

        let amounts: Vec<Option<f64>> = dynamic.iter().map(|c| coerce_number(&cell(c))).collect();
        let helper: f64 = amounts.iter().flatten().sum();
        out.extend(amounts.into_iter().map(|a| a.map(Value::Number)));
        out.push(Some(Value::Number(helper)));
        frame.push_row(out);
    }

    DerivedTable { frame, dynamic }
}

/// Null the dynamic cells and mark the helper of rows whose helper is below `threshold`
///
/// Returns the number of rows suppressed. No other column is touched.
pub fn suppress_by_helper(
    frame: &mut Frame,
    dynamic: &[String],
    helper: &str,
    threshold: f64,
    marker: &str,
) -> usize {
    let flagged: Vec<bool> = frame
        .iter()
        .map(|r| r.number(helper).is_some_and(|h| h < threshold))
        .collect();
    let count = flagged.iter().filter(|f| **f).count();
    if count == 0 {
        return 0;
    }

    for col in dynamic {
        let mut mask = flagged.iter();
        frame.map_column(col, |v| {
            if mask.next() == Some(&true) {
                None
            } else {
                v.clone()
            }
        });
    }
    let mut mask = flagged.iter();
    frame.map_column(helper, |v| {
        if mask.next() == Some(&true) {
            Some(Value::text(marker))
        } else {
            v.clone()
        }
    });
    count
}

/// Write `=SUM(X2:Xn)` for columns `first_col..=last_col` two rows below `last_row`
///
/// `last_row` is the 0-based index of the last data row. The label goes in `label_col`.
pub fn add_column_sums_row(
    sheet: &mut Worksheet,
    last_row: u32,
    first_col: u16,
    last_col: u16,
    label_col: u16,
    label: &str,
) -> Result<u32> {
    let sum_row = last_row + 2;
    sheet.set_cell_value_at(sum_row, label_col, label)?;
    sheet.update_style_at(sum_row, label_col, |s| s.bold = true)?;
    for col in first_col..=last_col {
        let letter = CellAddress::column_to_letters(col);
        sheet.set_cell_formula_at(
            sum_row,
            col,
            &format!("SUM({}2:{}{})", letter, letter, last_row + 1),
        )?;
        sheet.set_cell_style_at(sum_row, col, sum_style())?;
    }
    Ok(sum_row)
}

/// Replace sheet `name` with `table`, followed by the column sums row
pub fn write_derived_sheet<'a>(
    workbook: &'a mut Workbook,
    name: &str,
    table: &DerivedTable,
    config: &ReportConfig,
) -> Result<&'a mut Worksheet> {
    let names = &config.columns;
    let frame = &table.frame;
    let sheet = workbook.replace_worksheet(name)?;
    let last_row = frame.write_to_sheet(sheet, 0)?;

    layout::style_header(sheet)?;
    if let (Some(first), Some(last)) = (
        frame.column_index(&names.total),
        frame.column_index(&names.helper),
    ) {
        let (first, last) = (first as u16, last as u16);
        add_column_sums_row(
            sheet,
            last_row,
            first,
            last,
            first.saturating_sub(1),
            &config.derived.sum_label,
        )?;
    }
    layout::autosize(sheet);
    Ok(sheet)
}

fn region_text(row: &RowRef<'_>, names: &ColumnNames) -> String {
    row.text(&names.region)
        .or_else(|| row.text(&names.region_alt))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Master rows matching a market definition
///
/// `None` when the manager column, or the channel column of a channel
/// filter, is missing. Comparison uses [`norm_text`] on both sides.
pub fn select_market(master: &Frame, filter: &MarketFilter, names: &ColumnNames) -> Option<Frame> {
    if !master.has_column(&names.manager) {
        return None;
    }
    if filter.channel.is_some() && !master.has_column(&names.channel) {
        return None;
    }
    let manager = norm_text(&filter.manager);
    let channel = filter.channel.as_deref().map(norm_text);

    let mut manager_hits = 0usize;
    let selected = master.filtered(|row| {
        let manager_ok = norm_text(&cell_string(&row, &names.manager)) == manager;
        manager_hits += manager_ok as usize;
        manager_ok
            && channel
                .as_ref()
                .map_or(true, |ch| norm_text(&cell_string(&row, &names.channel)) == *ch)
    });
    debug!(
        sheet = %filter.sheet,
        rows = master.len(),
        manager_hits,
        selected = selected.len(),
        "market rows matched"
    );
    Some(selected)
}

/// Market sheet: manager (and channel) selection in the derived template
pub fn build_market_sheet(
    workbook: &mut Workbook,
    master: &Frame,
    filter: &MarketFilter,
    config: &ReportConfig,
) -> Result<BuildOutcome> {
    let names = &config.columns;
    let derived = &config.derived;
    let Some(mut sub) = select_market(master, filter, names) else {
        return Ok(BuildOutcome::not_built("manager or channel column missing"));
    };
    if let Some(excluded) = &filter.exclude_region {
        let removed = sub.retain_rows(|row| !region_text(&row, names).contains(excluded.as_str()));
        info!(sheet = %filter.sheet, removed, "excluded region rows removed");
    }
    if sub.is_empty() {
        return Ok(BuildOutcome::not_built("no matching rows"));
    }

    let mut table = reshape(&sub, names, derived.max_dynamic_columns);
    let suppressed = suppress_by_helper(
        &mut table.frame,
        &table.dynamic,
        &names.helper,
        derived.suppression_threshold,
        &derived.suppression_marker,
    );
    write_derived_sheet(workbook, &filter.sheet, &table, config)?;

    let rows = table.frame.len();
    info!(sheet = %filter.sheet, rows, suppressed, "market sheet written");
    Ok(BuildOutcome::Built {
        sheet: filter.sheet.clone(),
        rows,
    })
}

/// Keep only rows whose region names `base` (optionally followed by `- סחר`)
/// and stamp `display` into their manager and region cells
///
/// Returns the number of rows removed.
pub fn refine_rows(frame: &mut Frame, names: &ColumnNames, base: &str, display: &str) -> Result<usize> {
    let pattern = Regex::new(&format!(r"{}(\s*-\s*סחר)?", regex::escape(base)))
        .map_err(|e| ReportError::Config(format!("refine_base: {}", e)))?;
    let removed = frame.retain_rows(|row| pattern.is_match(cell_string(&row, &names.region).trim()));
    for col in [&names.manager, &names.region] {
        frame.map_column(col, |_| Some(Value::text(display)));
    }
    Ok(removed)
}

/// Distinct manager names, whitespace collapsed, sorted; blanks, null-like
/// values and the skip list left out
fn distinct_managers(master: &Frame, names: &ColumnNames, skip: &[String]) -> BTreeSet<String> {
    master
        .column(&names.manager)
        .unwrap_or_default()
        .into_iter()
        .map(|v| collapse_ws(&scalar_text(v)))
        .filter(|m| !m.is_empty())
        .filter(|m| !NULL_LIKE.contains(&m.to_lowercase().as_str()))
        .filter(|m| !skip.contains(m))
        .collect()
}

/// Remove sheets left by an earlier run for these managers; the master sheet is never touched
fn remove_previous_manager_sheets(
    workbook: &mut Workbook,
    managers: &BTreeSet<String>,
    master_sheet: &str,
) -> usize {
    let bases: Vec<String> = managers.iter().map(|m| sheet_name_base(m)).collect();
    let stale: Vec<String> = workbook
        .sheet_names()
        .into_iter()
        .filter(|name| name != master_sheet)
        .filter(|name| {
            bases
                .iter()
                .any(|b| name == b || name.starts_with(&format!("{}_", b)))
        })
        .collect();
    stale
        .iter()
        .filter(|name| workbook.remove_worksheet_by_name(name))
        .count()
}

/// One sheet per manager
///
/// Not built when the master has no manager column. A manager whose sheet
/// name contains the refinement base is narrowed with [`refine_rows`].
pub fn build_manager_sheets(
    workbook: &mut Workbook,
    master: &Frame,
    config: &ReportConfig,
) -> Result<Vec<BuildOutcome>> {
    let names = &config.columns;
    let derived = &config.derived;
    if !master.has_column(&names.manager) {
        return Ok(vec![BuildOutcome::not_built("manager column missing")]);
    }

    let managers = distinct_managers(master, names, &derived.manager_skip);
    let removed = remove_previous_manager_sheets(workbook, &managers, &config.master_sheet);
    if removed > 0 {
        info!(removed, "previous manager sheets removed");
    }

    let mut used: HashSet<String> = workbook
        .sheet_names()
        .iter()
        .map(|n| n.to_lowercase())
        .collect();
    let mut outcomes = Vec::with_capacity(managers.len());
    for manager in &managers {
        let sub = master.filtered(|row| collapse_ws(&cell_string(&row, &names.manager)) == *manager);
        if sub.is_empty() {
            continue;
        }

        let sheet_name = sanitize_sheet_name(manager, &mut used);
        let mut table = reshape(&sub, names, derived.max_dynamic_columns);
        if sheet_name.contains(derived.refine_base.as_str()) {
            let dropped = refine_rows(&mut table.frame, names, &derived.refine_base, &derived.refine_display)?;
            info!(sheet = %sheet_name, dropped, "rows outside the refined region removed");
        }
        suppress_by_helper(
            &mut table.frame,
            &table.dynamic,
            &names.helper,
            derived.suppression_threshold,
            &derived.suppression_marker,
        );

        let sheet = write_derived_sheet(workbook, &sheet_name, &table, config)?;
        layout::color_manager_headers(sheet, &derived.header_colors)?;
        outcomes.push(BuildOutcome::Built {
            sheet: sheet_name,
            rows: table.frame.len(),
        });
    }
    info!(sheets = outcomes.len(), "manager sheets written");
    Ok(outcomes)
}

/// Rows that are leftovers of a trailer rather than data
fn is_total_like(row: &RowRef<'_>, names: &ColumnNames, identity: &[&str]) -> bool {
    if cell_string(row, &names.total).trim() == TRAILER_TEXT
        || cell_string(row, &names.today).trim() == TRAILER_TEXT
    {
        return true;
    }
    if row.values().iter().all(is_blank) {
        return true;
    }
    let identity_blank = identity
        .iter()
        .all(|c| row.get(c).map_or(true, Value::is_blank));
    identity_blank && row.number(&names.total).is_some()
}

/// The whole master in the derived template, without trailer-like rows
pub fn build_region_general(
    workbook: &mut Workbook,
    master: &Frame,
    config: &ReportConfig,
) -> Result<BuildOutcome> {
    let names = &config.columns;
    let derived = &config.derived;
    let identity: Vec<&str> = [
        &names.manager,
        &names.region,
        &names.region_alt,
        &names.agent,
        &names.channel,
        &names.agent_code,
        &names.customer_code,
        &names.payer_code,
        &names.customer_name,
        &names.payer_name,
    ]
    .into_iter()
    .map(String::as_str)
    .filter(|c| master.has_column(c))
    .collect();

    let mut rows = master.clone();
    let dropped = rows.retain_rows(|row| !is_total_like(&row, names, &identity));
    if rows.is_empty() {
        return Ok(BuildOutcome::not_built("no rows"));
    }

    let mut table = reshape(&rows, names, derived.max_dynamic_columns);
    let suppressed = suppress_by_helper(
        &mut table.frame,
        &table.dynamic,
        &names.helper,
        derived.suppression_threshold,
        &derived.suppression_marker,
    );
    write_derived_sheet(workbook, &derived.region_general_sheet, &table, config)?;

    let written = table.frame.len();
    info!(rows = written, dropped, suppressed, "general region sheet written");
    Ok(BuildOutcome::Built {
        sheet: derived.region_general_sheet.clone(),
        rows: written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const TOTAL: &str = "סה\"כ סכום יתרת חוב";
    const TODAY: &str = "סה\"כ סכום יתרת חוב עד היום";

    fn t(s: &str) -> Scalar {
        Some(Value::text(s))
    }

    fn n(v: f64) -> Scalar {
        Some(Value::Number(v))
    }

    fn master() -> Frame {
        let mut frame = Frame::new([
            "מנהל סחר",
            "מנהל אזור",
            "סוכן",
            "ערוץ",
            "קוד לקוח קצה",
            "לקוח קצה",
            "קוד סוכן",
            TOTAL,
            TODAY,
            "חודש 1",
            "חודש 2",
        ]);
        let rows = [
            ("רפי מור יוסף-סחר", "רפי מור יוסף- סחר", "דנה", "שוק פרטי", 100.0, 10.0, 5.0),
            ("רפי מור יוסף–סחר", "אבי", "רון", "שוק פרטי", 200.0, -900.0, -300.0),
            ("רפי מור יוסף-סחר", "אבי", "רון", "רשתות", 50.0, 1.0, 1.0),
            ("עמי חכמון", "עמי", "גל", "שוק תדמיתי", 70.0, 7.0, 0.0),
        ];
        for (mgr, region, agent, channel, total, m1, m2) in rows {
            frame.push_row(vec![
                t(mgr),
                t(region),
                t(agent),
                t(channel),
                t("1"),
                t("לקוח"),
                t("12"),
                n(total),
                n(total / 2.0),
                n(m1),
                n(m2),
            ]);
        }
        frame
    }

    #[test]
    fn test_dynamic_columns() {
        let cols: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dynamic_columns(&cols, "b", 4), vec!["c", "d"]);
        assert_eq!(dynamic_columns(&cols, "a", 1), vec!["b"]);
        assert!(dynamic_columns(&cols, "x", 4).is_empty());
    }

    #[test]
    fn test_reshape_template() {
        let names = ColumnNames::default();
        let table = reshape(&master(), &names, 4);
        assert_eq!(table.dynamic, vec!["חודש 1", "חודש 2"]);
        assert_eq!(
            table.frame.columns(),
            &[
                "מנהל סחר",
                "מנהל אזור",
                "סוכן",
                "ערוץ",
                "קוד לקוח משלם",
                "לקוח משלם",
                "קוד סוכן",
                TOTAL,
                TODAY,
                "חודש 1",
                "חודש 2",
                "טור עזר",
            ]
        );
        assert_eq!(table.frame.get(0, "קוד לקוח משלם"), Some(&Value::text("1")));
        assert_eq!(table.frame.get(1, "טור עזר"), Some(&Value::Number(-1200.0)));
    }

    #[test]
    fn test_reshape_without_dynamic_columns() {
        let names = ColumnNames::default();
        let mut frame = Frame::new(["סוכן", TOTAL]);
        frame.push_row(vec![t("דנה"), t("12.5")]);
        let table = reshape(&frame, &names, 4);
        assert!(table.dynamic.is_empty());
        assert_eq!(table.frame.get(0, TOTAL), Some(&Value::Number(12.5)));
        assert_eq!(table.frame.get(0, "מנהל סחר"), None);
        assert_eq!(table.frame.get(0, "טור עזר"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_suppression_keeps_totals() {
        let names = ColumnNames::default();
        let mut table = reshape(&master(), &names, 4);
        let count = suppress_by_helper(&mut table.frame, &table.dynamic, "טור עזר", -1000.0, "-");
        assert_eq!(count, 1);
        assert_eq!(table.frame.get(1, "חודש 1"), None);
        assert_eq!(table.frame.get(1, "טור עזר"), Some(&Value::text("-")));
        assert_eq!(table.frame.get(1, TOTAL), Some(&Value::Number(200.0)));
        assert_eq!(table.frame.get(0, "טור עזר"), Some(&Value::Number(15.0)));
    }

    proptest! {
        #[test]
        fn prop_suppression_rule(helpers in proptest::collection::vec(-5000.0f64..5000.0, 1..20)) {
            let mut frame = Frame::new(["id", "m", "h"]);
            for (i, h) in helpers.iter().enumerate() {
                frame.push_row(vec![n(i as f64), n(*h), n(*h)]);
            }
            let before = frame.clone();
            let dynamic = vec!["m".to_string()];
            suppress_by_helper(&mut frame, &dynamic, "h", -1000.0, "-");

            for (i, h) in helpers.iter().enumerate() {
                prop_assert_eq!(frame.get(i, "id"), before.get(i, "id"));
                if *h < -1000.0 {
                    prop_assert_eq!(frame.get(i, "m"), None);
                    prop_assert_eq!(frame.get(i, "h"), Some(&Value::text("-")));
                } else {
                    prop_assert_eq!(frame.get(i, "m"), before.get(i, "m"));
                    prop_assert_eq!(frame.get(i, "h"), before.get(i, "h"));
                }
            }
        }
    }

    #[test]
    fn test_private_market_sheet() {
        let config = ReportConfig::default();
        let mut workbook = Workbook::new();
        let outcome =
            build_market_sheet(&mut workbook, &master(), &config.derived.private_market, &config).unwrap();

        // the dash variant matches; the excluded region and the other channel do not
        assert_eq!(
            outcome,
            BuildOutcome::Built {
                sheet: "שוק פרטי".into(),
                rows: 1
            }
        );
        let sheet = workbook.worksheet_by_name("שוק פרטי").unwrap();
        assert_eq!(sheet.text_at(1, 2), "רון");
        assert_eq!(sheet.text_at(1, 11), "-");
        // sum row: two rows below the last data row, label left of H
        assert_eq!(sheet.text_at(3, 6), "סכום :");
        assert_eq!(sheet.get_value_at(3, 7).formula_text(), Some("=SUM(H2:H2)"));
        assert_eq!(sheet.get_value_at(3, 11).formula_text(), Some("=SUM(L2:L2)"));
        assert!(sheet.style_at(0, 0).is_some_and(|s| s.bold));
    }

    #[test]
    fn test_market_without_matches_is_not_built() {
        let config = ReportConfig::default();
        let mut filter = config.derived.image_market.clone();
        filter.manager = "אין כזה".into();
        let mut workbook = Workbook::new();
        let outcome = build_market_sheet(&mut workbook, &master(), &filter, &config).unwrap();
        assert!(!outcome.is_built());
        assert!(workbook.is_empty());

        let no_manager = master().select(&["סוכן", TOTAL]);
        let outcome = build_market_sheet(&mut workbook, &no_manager, &filter, &config).unwrap();
        assert!(matches!(outcome, BuildOutcome::NotBuilt { .. }));
    }

    #[test]
    fn test_manager_sheets_with_refinement() {
        let config = ReportConfig::default();
        let mut workbook = Workbook::new();
        workbook.add_worksheet_with_name("מעובד").unwrap();
        workbook.add_worksheet_with_name("רפי מור יוסף-סחר_1").unwrap();

        let outcomes = build_manager_sheets(&mut workbook, &master(), &config).unwrap();
        // the dash variants are distinct managers; the image manager is skipped
        assert_eq!(outcomes.len(), 2);
        assert!(workbook.worksheet_by_name("רפי מור יוסף-סחר_1").is_none());
        assert!(workbook.worksheet_by_name("מעובד").is_some());

        let sheet = workbook.worksheet_by_name("רפי מור יוסף-סחר").unwrap();
        // only the row whose region names the manager survives, restamped
        assert_eq!(sheet.text_at(1, 0), "רפי מור יוסף- סחר");
        assert_eq!(sheet.text_at(1, 1), "רפי מור יוסף- סחר");
        assert_eq!(sheet.text_at(1, 2), "דנה");
        assert!(sheet.is_row_blank(2));
        assert_eq!(sheet.style_at(0, 7).and_then(|s| s.fill_rgb), Some(0xBFEE90));
    }

    #[test]
    fn test_region_general_drops_trailer_rows() {
        let config = ReportConfig::default();
        let mut frame = master();
        let width = frame.columns().len();
        frame.push_row(vec![None; width]);
        let mut label = vec![None; width];
        label[7] = t("סכום");
        frame.push_row(label);
        let mut total = vec![None; width];
        total[7] = n(420.0);
        frame.push_row(total);

        let mut workbook = Workbook::new();
        let outcome = build_region_general(&mut workbook, &frame, &config).unwrap();
        assert_eq!(
            outcome,
            BuildOutcome::Built {
                sheet: "מנהל אזור כללי".into(),
                rows: 4
            }
        );
    }
}
