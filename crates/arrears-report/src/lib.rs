//! # arrears-report
//!
//! Turns a merged debt-arrears export into the processed report workbook:
//!
//! - a master sheet: header detection, column selection, amount
//!   normalization and the row filter chain, with a grand-total trailer
//! - derived sheets in a shared template: one per manager, the private and
//!   image markets, and the general region
//! - agent pivots of the two markets
//! - the "by agent" rollup, assembled from the pivots and linked to the
//!   manager sheets by formula
//!
//! Everything data-specific (column names, filter literals, the rollup
//! hierarchy) comes from [`ReportConfig`].
//!
//! ```no_run
//! use arrears_report::{run, ReportConfig, RunOptions};
//!
//! let options = RunOptions::new("debts.xlsx", "out").with_all_reports();
//! let summary = run(&options, &ReportConfig::default())?;
//! println!("{}", summary.output_path.display());
//! # Ok::<(), arrears_report::ReportError>(())
//! ```

pub mod config;
pub mod derived;
pub mod error;
pub mod filters;
pub mod headers;
pub mod layout;
pub mod master;
pub mod numeric;
pub mod pipeline;
pub mod pivot;
pub mod progress;
pub mod rollup;
pub mod text;

pub use config::{ReportConfig, RunOptions};
pub use derived::BuildOutcome;
pub use error::{ReportError, Result};
pub use filters::FilterCounts;
pub use master::MasterTable;
pub use pipeline::{run, RunSummary};
