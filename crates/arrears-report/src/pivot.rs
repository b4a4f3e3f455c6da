//! Agent pivots of the private and image markets

use arrears_core::{Frame, Value, Workbook};
use tracing::info;

use crate::config::{MarketFilter, ReportConfig};
use crate::derived::{add_column_sums_row, dynamic_columns, select_market, BuildOutcome};
use crate::error::Result;
use crate::layout;
use crate::numeric::coerce_number;

/// Group the market's rows by agent and sum total, today and the dynamic columns
///
/// `None` when the agent column is missing, or neither amount column is present.
pub fn pivot_by_agent(sub: &Frame, config: &ReportConfig) -> Result<Option<Frame>> {
    let names = &config.columns;
    if !sub.has_column(&names.agent) {
        return Ok(None);
    }
    let has_total = sub.has_column(&names.total);
    let has_today = sub.has_column(&names.today);
    if !has_total && !has_today {
        return Ok(None);
    }

    let max = config.derived.max_dynamic_columns;
    let mut dynamic = dynamic_columns(sub.columns(), &names.today, max);
    if dynamic.is_empty() && has_total {
        dynamic = dynamic_columns(sub.columns(), &names.total, max);
    }

    let mut sums: Vec<&str> = Vec::new();
    if has_total {
        sums.push(&names.total);
    }
    if has_today {
        sums.push(&names.today);
    }
    sums.extend(dynamic.iter().map(String::as_str));

    let mut numeric = sub.clone();
    for col in &sums {
        numeric.map_column(col, |v| coerce_number(v).map(Value::Number));
    }
    let pivot = numeric.group_sum(&names.agent, &sums, &config.pivots.blank_label)?;
    Ok(Some(pivot))
}

/// Pivot sheet for one market, with a column sums row under it
pub fn build_pivot(
    workbook: &mut Workbook,
    master: &Frame,
    filter: &MarketFilter,
    config: &ReportConfig,
) -> Result<BuildOutcome> {
    let Some(sub) = select_market(master, filter, &config.columns) else {
        return Ok(BuildOutcome::NotBuilt {
            reason: "manager or channel column missing".into(),
        });
    };
    let pivot = match pivot_by_agent(&sub, config)? {
        Some(pivot) if !pivot.is_empty() => pivot,
        Some(_) => {
            return Ok(BuildOutcome::NotBuilt {
                reason: "no matching rows".into(),
            })
        }
        None => {
            return Ok(BuildOutcome::NotBuilt {
                reason: "agent or amount columns missing".into(),
            })
        }
    };

    let sheet = workbook.replace_worksheet(&filter.sheet)?;
    let last_row = pivot.write_to_sheet(sheet, 0)?;
    layout::style_header(sheet)?;
    let width = pivot.columns().len() as u16;
    if last_row >= 1 && width >= 2 {
        add_column_sums_row(sheet, last_row, 1, width - 1, 0, &config.derived.sum_label)?;
    }
    layout::autosize(sheet);

    info!(sheet = %filter.sheet, agents = pivot.len(), rows = sub.len(), "pivot written");
    Ok(BuildOutcome::Built {
        sheet: filter.sheet.clone(),
        rows: pivot.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrears_core::Scalar;
    use pretty_assertions::assert_eq;

    const TOTAL: &str = "סה\"כ סכום יתרת חוב";
    const TODAY: &str = "סה\"כ סכום יתרת חוב עד היום";

    fn row(manager: &str, agent: Option<&str>, total: Option<f64>, month: Option<f64>) -> Vec<Scalar> {
        vec![
            Some(Value::text(manager)),
            agent.map(Value::text),
            total.map(Value::Number),
            total.map(|t| Value::Number(t / 2.0)),
            month.map(Value::Number),
        ]
    }

    fn master() -> Frame {
        let mut frame = Frame::new(["מנהל סחר", "סוכן", TOTAL, TODAY, "חודש 1"]);
        frame.push_row(row("עמי חכמון", Some("X"), Some(100.0), Some(1.0)));
        frame.push_row(row("עמי חכמון", Some("Y"), None, None));
        frame.push_row(row("עמי חכמון", Some("X"), None, Some(2.0)));
        frame.push_row(row("עמי חכמון", Some("Y"), None, None));
        frame.push_row(row("עמי חכמון", None, Some(5.0), None));
        frame.push_row(row("אחר", Some("Z"), Some(9.0), None));
        frame
    }

    #[test]
    fn test_pivot_sums_skip_nulls() {
        let config = ReportConfig::default();
        let sub = select_market(&master(), &config.pivots.image, &config.columns).unwrap();
        let pivot = pivot_by_agent(&sub, &config).unwrap().unwrap();

        assert_eq!(pivot.columns(), &["סוכן", TOTAL, TODAY, "חודש 1"]);
        assert_eq!(pivot.len(), 3);
        assert_eq!(pivot.get(0, TOTAL), Some(&Value::Number(100.0)));
        assert_eq!(pivot.get(0, "חודש 1"), Some(&Value::Number(3.0)));
        // Y has only nulls: one row, null total
        assert_eq!(pivot.get(1, "סוכן"), Some(&Value::text("Y")));
        assert_eq!(pivot.get(1, TOTAL), None);
        assert_eq!(pivot.get(2, "סוכן"), Some(&Value::text("(ריק)")));
    }

    #[test]
    fn test_pivot_sheet() {
        let config = ReportConfig::default();
        let mut workbook = Workbook::new();
        let outcome = build_pivot(&mut workbook, &master(), &config.pivots.image, &config).unwrap();
        assert_eq!(
            outcome,
            BuildOutcome::Built {
                sheet: "פיבוט תדמיתי".into(),
                rows: 3
            }
        );

        let sheet = workbook.worksheet_by_name("פיבוט תדמיתי").unwrap();
        assert_eq!(sheet.text_at(5, 0), "סכום :");
        assert_eq!(sheet.get_value_at(5, 1).formula_text(), Some("=SUM(B2:B4)"));
        assert_eq!(sheet.get_value_at(5, 3).formula_text(), Some("=SUM(D2:D4)"));
        assert!(sheet.is_right_to_left());
    }

    #[test]
    fn test_private_pivot_needs_channel() {
        let config = ReportConfig::default();
        let mut workbook = Workbook::new();
        let outcome =
            build_pivot(&mut workbook, &master(), &config.pivots.private, &config).unwrap();
        assert!(!outcome.is_built());
    }
}
