//! Initial write of the by-agent sheet

use std::collections::HashMap;

use arrears_core::{CellStyle, CellValue, Worksheet};

use super::extract::RollupData;
use super::tree::{RollupTree, RowKey, Section};
use super::{
    letter, COL_DIFF, COL_PRIOR, COL_RATIO, COL_TODAY, COL_TOTAL, CURRENT_LAG_RATIO,
    FIRST_MONTH_COL, LAG_DIFFERENCE, LAG_SUM, PRIOR_LAG_RATIO,
};
use crate::config::ColumnNames;
use crate::error::Result;

/// `=F3+F4+F7`, or 0 when there are no sources
pub(crate) fn addition_chain(col: u16, sources: &[u32]) -> CellValue {
    if sources.is_empty() {
        return CellValue::Number(0.0);
    }
    let terms: Vec<String> = sources
        .iter()
        .map(|r| format!("{}{}", letter(col), r + 1))
        .collect();
    CellValue::formula(format!("={}", terms.join("+")))
}

/// Lag sum over the month columns of `row`, and the ratio and difference formulas
pub(crate) fn write_lag_cells(
    sheet: &mut Worksheet,
    row: u32,
    months: &[u16],
    lag_col: u16,
    total_col: u16,
) -> Result<()> {
    let r = row + 1;
    match (months.first(), months.last()) {
        (Some(&first), Some(&last)) => sheet.set_cell_formula_at(
            row,
            lag_col,
            &format!("SUM({}{}:{}{})", letter(first), r, letter(last), r),
        )?,
        _ => sheet.set_cell_value_at(row, lag_col, 0.0)?,
    }
    sheet.set_cell_formula_at(
        row,
        COL_RATIO,
        &format!("IFERROR({}{}/{}{},0)", letter(lag_col), r, letter(total_col), r),
    )?;
    sheet.set_cell_formula_at(
        row,
        COL_DIFF,
        &format!("{}{}-{}{}", letter(COL_RATIO), r, letter(COL_PRIOR), r),
    )?;
    Ok(())
}

struct RowWriter<'a> {
    sheet: &'a mut Worksheet,
    data: &'a RollupData,
    months: Vec<u16>,
    lag_col: u16,
    next: u32,
}

impl RowWriter<'_> {
    fn agent_row(&mut self, name: &str, channel: &str) -> Result<u32> {
        let row = self.next;
        self.next += 1;
        let record = self.data.get(name, channel);

        self.sheet.set_cell_value_at(row, 0, name)?;
        self.sheet.set_cell_value_at(row, 1, channel)?;
        self.sheet
            .set_cell_value_at(row, COL_TOTAL, record.map_or(0.0, |r| r.total))?;
        self.sheet
            .set_cell_value_at(row, COL_TODAY, record.map_or(0.0, |r| r.today))?;
        for (title, &col) in self.data.month_headers().iter().zip(&self.months) {
            let value = record.map_or(0.0, |r| r.month(title));
            self.sheet.set_cell_value_at(row, col, value)?;
        }
        write_lag_cells(self.sheet, row, &self.months, self.lag_col, COL_TOTAL)?;
        Ok(row)
    }

    fn sum_row(&mut self, label: &str, sources: &[u32]) -> Result<u32> {
        let row = self.next;
        self.next += 1;

        self.sheet.set_cell_value_at(row, 0, label)?;
        self.sheet
            .set_cell_style_at(row, 0, CellStyle::new().bold())?;
        for col in [COL_TOTAL, COL_TODAY].into_iter().chain(self.months.clone()) {
            self.sheet
                .set_cell_value_at(row, col, addition_chain(col, sources))?;
        }
        write_lag_cells(self.sheet, row, &self.months, self.lag_col, COL_TOTAL)?;
        Ok(row)
    }
}

/// Write headers and every section of `tree`; returns the number of rows written below the header
pub fn write_rollup(
    sheet: &mut Worksheet,
    tree: &RollupTree,
    data: &RollupData,
    names: &ColumnNames,
) -> Result<usize> {
    let month_headers = data.month_headers();
    let mut headers: Vec<&str> = vec![
        names.agent.as_str(),
        names.channel.as_str(),
        CURRENT_LAG_RATIO,
        PRIOR_LAG_RATIO,
        LAG_DIFFERENCE,
        names.total.as_str(),
        names.today.as_str(),
    ];
    headers.extend(month_headers.iter().map(String::as_str));
    headers.push(LAG_SUM);
    for (col, header) in headers.iter().enumerate() {
        sheet.set_cell_value_at(0, col as u16, *header)?;
    }

    let months: Vec<u16> = (0..month_headers.len() as u16)
        .map(|i| FIRST_MONTH_COL + i)
        .collect();
    let lag_col = FIRST_MONTH_COL + month_headers.len() as u16;
    let mut writer = RowWriter {
        sheet,
        data,
        months,
        lag_col,
        next: 1,
    };

    // Most recent row written for each key; a later subtotal with the same label replaces it
    let mut rows: HashMap<RowKey, u32> = HashMap::new();
    for section in &tree.sections {
        match section {
            Section::Group {
                label,
                members,
                channel,
                ..
            } => {
                let member_rows = members
                    .iter()
                    .map(|m| writer.agent_row(m, channel))
                    .collect::<Result<Vec<_>>>()?;
                let row = writer.sum_row(label, &member_rows)?;
                rows.insert(RowKey::subtotal(label.as_str()), row);
            }
            Section::Single { name, channel } => {
                let row = writer.agent_row(name, channel)?;
                rows.insert(RowKey::agent(name.as_str(), channel.as_str()), row);
            }
            Section::SubtotalOf { label, parts, .. } => {
                let sources: Vec<u32> = parts.iter().filter_map(|p| rows.get(p).copied()).collect();
                let row = writer.sum_row(label, &sources)?;
                rows.insert(RowKey::subtotal(label.as_str()), row);
            }
        }
    }
    Ok((writer.next - 1) as usize)
}
