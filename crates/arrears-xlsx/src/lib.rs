//! # arrears-xlsx
//!
//! XLSX (Office Open XML) reader and writer for the arrears document model.
//!
//! The reader keeps values, formulas with their cached results, and merged
//! regions. Input styling is ignored. The writer emits values, formulas,
//! the [`CellStyle`](arrears_core::CellStyle) subset, column widths, frozen
//! panes and right-to-left sheet views.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
