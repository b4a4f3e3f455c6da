//! End-to-end report run

use std::fs;
use std::path::{Path, PathBuf};

use arrears_core::Workbook;
use arrears_xlsx::{XlsxReader, XlsxWriter};
use chrono::Local;
use tracing::{info, warn};

use crate::config::{ReportConfig, RunOptions};
use crate::derived::{self, BuildOutcome};
use crate::error::{ReportError, Result};
use crate::filters::FilterCounts;
use crate::master::{build_master, write_master_sheet};
use crate::pivot::build_pivot;
use crate::progress::Progress;
use crate::rollup::build_rollup;

const TEMP_DIR: &str = "_temp";
const TEMP_COPY: &str = "_temp_unmerged.xlsx";

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    /// Master data rows, trailer excluded
    pub master_rows: usize,
    pub grand_total: f64,
    pub counts: FilterCounts,
    /// Builder name and its outcome, in build order
    pub outcomes: Vec<(String, BuildOutcome)>,
    /// Builders that failed; the run continued past each of them
    pub warnings: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, builder: &str, result: Result<BuildOutcome>) {
        match result {
            Ok(outcome) => {
                match &outcome {
                    BuildOutcome::Built { sheet, rows } => {
                        info!(builder, sheet = %sheet, rows, "sheet built")
                    }
                    BuildOutcome::NotBuilt { reason } => {
                        info!(builder, reason = %reason, "sheet not built")
                    }
                }
                self.outcomes.push((builder.to_string(), outcome));
            }
            Err(err) => {
                warn!(builder, error = %err, "builder failed");
                self.warnings.push(format!("{}: {}", builder, err));
            }
        }
    }
}

/// Output file name: `{stem}_{YYYY-mm-dd_HH-MM}.xlsx`
pub fn output_file_name(input: &Path, stamp: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    format!("{}_{}.xlsx", stem, stamp)
}

/// Load the input and return its source sheet, merged regions expanded
fn load_source(options: &RunOptions) -> Result<Workbook> {
    let mut workbook = XlsxReader::read_file_values(&options.input)?;
    let index = workbook
        .sheet_index_ignore_case(&options.sheet_hint)
        .unwrap_or(0);
    let sheet = workbook
        .worksheet_mut(index)
        .ok_or_else(|| ReportError::SheetMissing(options.sheet_hint.clone()))?;
    let expanded = sheet.expand_merged_regions()?;
    info!(sheet = %sheet.name(), merged_regions = expanded, "source sheet loaded");

    let mut source = Workbook::new();
    source.add_existing_worksheet(workbook.remove_worksheet(index)?)?;
    Ok(source)
}

/// Run the whole pipeline
///
/// A missing header aborts before anything is written. Once the master
/// sheet is saved, derived builder failures are collected as warnings.
pub fn run(options: &RunOptions, config: &ReportConfig) -> Result<RunSummary> {
    config.validate()?;
    let temp_dir = options.output_dir.join(TEMP_DIR);
    let result = run_stages(options, config, &temp_dir);
    if !options.keep_temp && temp_dir.exists() {
        if let Err(err) = fs::remove_dir_all(&temp_dir) {
            warn!(path = %temp_dir.display(), error = %err, "could not remove temporary directory");
        }
    }
    result
}

fn run_stages(options: &RunOptions, config: &ReportConfig, temp_dir: &Path) -> Result<RunSummary> {
    let mut progress = Progress::for_run(options.drop_empty, options.keep_other);

    progress.step("Loading workbook and expanding merged cells");
    let source = load_source(options)?;
    fs::create_dir_all(temp_dir)?;
    XlsxWriter::write_file(&source, temp_dir.join(TEMP_COPY))?;

    let sheet = source
        .worksheet(0)
        .ok_or_else(|| ReportError::SheetMissing(options.sheet_hint.clone()))?;
    let master = build_master(sheet, config, options, &mut progress)?;

    progress.step("Saving processed workbook");
    let stamp = Local::now().format("%Y-%m-%d_%H-%M").to_string();
    let output_path = options
        .output_dir
        .join(output_file_name(&options.input, &stamp));
    let mut workbook = Workbook::new();
    let master_rows = write_master_sheet(&mut workbook, &master, config)?;
    XlsxWriter::write_file(&workbook, &output_path)?;
    info!(path = %output_path.display(), rows = master_rows, "processed sheet saved");

    let mut summary = RunSummary {
        output_path,
        master_rows,
        grand_total: master.grand_total,
        counts: master.counts,
        outcomes: Vec::new(),
        warnings: Vec::new(),
    };

    let rows = &master.rows;
    if options.split_by_manager {
        match derived::build_manager_sheets(&mut workbook, rows, config) {
            Ok(outcomes) => {
                for outcome in outcomes {
                    summary.record("manager sheets", Ok(outcome));
                }
            }
            Err(err) => summary.record("manager sheets", Err(err)),
        }
    }
    if options.market_private {
        let result = derived::build_market_sheet(&mut workbook, rows, &config.derived.private_market, config);
        summary.record("private market", result);
    }
    if options.market_image {
        let result = derived::build_market_sheet(&mut workbook, rows, &config.derived.image_market, config);
        summary.record("image market", result);
    }
    if options.region_general {
        let result = derived::build_region_general(&mut workbook, rows, config);
        summary.record("general region", result);
    }
    if options.pivot_private {
        let result = build_pivot(&mut workbook, rows, &config.pivots.private, config);
        summary.record("private pivot", result);
    }
    if options.pivot_image {
        let result = build_pivot(&mut workbook, rows, &config.pivots.image, config);
        summary.record("image pivot", result);
    }
    if options.by_agent {
        let result = build_rollup(&mut workbook, config);
        summary.record("by agent", result);
    }

    XlsxWriter::write_file(&workbook, &summary.output_path)?;
    info!(
        sheets = workbook.sheet_count(),
        warnings = summary.warnings.len(),
        "report saved"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("/data/חובות.xlsx"), "2024-03-01_09-05"),
            "חובות_2024-03-01_09-05.xlsx"
        );
        assert_eq!(output_file_name(Path::new(""), "x"), "report_x.xlsx");
    }
}
