//! Processed master table
//!
//! Builds the canonical table every derived sheet reads from: header
//! detection, column selection, amount normalization, then the filter chain.
//! The three trailer rows are kept out of [`MasterTable::rows`] and only
//! added when the sheet is written.

use arrears_core::{CellStyle, Error as CoreError, Frame, Value, Workbook, Worksheet};
use regex::Regex;
use tracing::info;

use crate::config::{ReportConfig, RunOptions};
use crate::error::{ReportError, Result};
use crate::filters::{self, FilterCounts};
use crate::headers::{read_source_frame, select_master_columns};
use crate::layout;
use crate::numeric::normalize_numeric_columns;
use crate::progress::Progress;

/// Number format applied to amount cells
pub const AMOUNT_FORMAT: &str = "#,##0.00";

/// The filtered master rows and what is needed to write them
#[derive(Debug, Clone, PartialEq)]
pub struct MasterTable {
    /// Data rows, without trailer
    pub rows: Frame,
    /// Column summed into the trailer
    pub sum_header: String,
    /// The sum column and the amount columns that follow it
    pub amount_columns: Vec<String>,
    pub grand_total: f64,
    pub counts: FilterCounts,
}

impl MasterTable {
    /// Rows followed by the trailer: a blank row, `label` in the sum column,
    /// then the grand total in the sum column
    pub fn with_trailer(&self, label: &str) -> Result<Frame> {
        let mut out = self.rows.clone();
        if !out.has_column(&self.sum_header) {
            out.set_column(&self.sum_header, vec![None; out.len()])?;
        }
        let col = out
            .column_index(&self.sum_header)
            .ok_or_else(|| CoreError::ColumnNotFound(self.sum_header.clone()))?;

        let mut row = vec![None; out.columns().len()];
        out.push_row(row.clone());
        row[col] = Some(Value::text(label));
        out.push_row(row.clone());
        row[col] = Some(Value::Number(self.grand_total));
        out.push_row(row);
        Ok(out)
    }
}

/// Run header detection, column selection, normalization and the filter chain over `sheet`
pub fn build_master(
    sheet: &Worksheet,
    config: &ReportConfig,
    options: &RunOptions,
    progress: &mut Progress,
) -> Result<MasterTable> {
    let cols = &config.columns;
    let sum_header = options.sum_header(config).to_string();

    progress.step("Detecting header row");
    let source = read_source_frame(sheet, config)?;

    progress.step("Selecting columns");
    let selected = select_master_columns(source.columns(), config, &sum_header);
    let mut frame = source.select(&selected.columns);
    info!(columns = frame.columns().len(), rows = frame.len(), "columns selected");

    progress.step("Normalizing amount columns");
    let normalized = normalize_numeric_columns(&mut frame, &selected.amount_columns);
    info!(normalized, "amount columns normalized");

    let mut counts = FilterCounts::default();
    let f = &config.filters;

    progress.step("Applying agent name corrections");
    counts.renamed_agents = filters::rename_agents(&mut frame, &cols.agent, &f.agent_renames);
    counts.bad_agents = filters::remove_bad_agents(&mut frame, &cols.agent, &f.bad_agents);
    info!(
        renamed = counts.renamed_agents,
        removed = counts.bad_agents,
        "agent corrections applied"
    );

    progress.step("Normalizing agent codes");
    counts.agent_codes_changed =
        filters::normalize_agent_code(&mut frame, &cols.agent_code, &f.agent_code_keep);
    info!(changed = counts.agent_codes_changed, "agent codes normalized");

    if options.drop_empty {
        progress.step("Dropping empty rows");
        counts.fully_empty = filters::drop_fully_empty_rows(&mut frame);
        counts.missing_identity = filters::drop_rows_missing_identity(&mut frame, &f.required_identity);
        info!(
            fully_empty = counts.fully_empty,
            missing_identity = counts.missing_identity,
            "empty rows removed"
        );
    }

    progress.step("Requiring numeric agent codes");
    counts.non_numeric_code = filters::filter_agent_code_required(&mut frame, &cols.agent_code);
    info!(removed = counts.non_numeric_code, "rows without a numeric agent code removed");

    progress.step("Removing summary rows");
    let marker = Regex::new(&f.summary_pattern)
        .map_err(|e| ReportError::Config(format!("summary_pattern: {}", e)))?;
    counts.summary_rows = filters::remove_summary_rows(&mut frame, &cols.agent_code, &marker);
    info!(removed = counts.summary_rows, "summary rows removed");

    progress.step("Removing export channel rows");
    counts.export_channel =
        filters::remove_export_channel(&mut frame, &cols.channel, &f.export_channel);
    info!(removed = counts.export_channel, "export rows removed");

    if !options.keep_other {
        progress.step("Removing \"other\" rows");
        counts.other_rows = filters::remove_other_rows(&mut frame, &f.other_columns, &f.other_values);
        info!(removed = counts.other_rows, "other rows removed");
    }

    progress.step("Computing grand total");
    let grand_total = frame.column_sum(&sum_header);
    info!(rows = frame.len(), grand_total, "master table ready");

    Ok(MasterTable {
        rows: frame,
        sum_header,
        amount_columns: selected.amount_columns,
        grand_total,
        counts,
    })
}

/// Write the master table, trailer included, as a fresh sheet
///
/// Returns the number of data rows written.
pub fn write_master_sheet(
    workbook: &mut Workbook,
    master: &MasterTable,
    config: &ReportConfig,
) -> Result<usize> {
    let frame = master.with_trailer(&config.master_sum_label)?;
    let sheet = workbook.replace_worksheet(&config.master_sheet)?;
    let last_row = frame.write_to_sheet(sheet, 0)?;

    let amount_cols: Vec<u16> = master
        .amount_columns
        .iter()
        .filter_map(|name| frame.column_index(name))
        .map(|c| c as u16)
        .collect();
    for row in 1..=last_row {
        for &col in &amount_cols {
            if sheet.get_value_at(row, col).as_number().is_some() {
                sheet.update_style_at(row, col, |s| {
                    *s = s.clone().number_format(AMOUNT_FORMAT);
                })?;
            }
        }
    }

    layout::style_header(sheet)?;
    layout::autosize(sheet);
    Ok(master.rows.len())
}

/// Style used for formula cells summing amount columns
pub(crate) fn sum_style() -> CellStyle {
    CellStyle::new().bold().number_format(AMOUNT_FORMAT)
}
