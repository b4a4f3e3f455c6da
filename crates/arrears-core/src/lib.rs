//! # arrears-core
//!
//! Document model shared by the arrears report crates.
//!
//! - [`Workbook`] and [`Worksheet`] - ordered named sheets with sparse cell storage
//! - [`CellValue`], [`CellAddress`], [`CellRange`] - values and A1 addressing
//! - [`CellStyle`] - the small subset of formatting the reports emit
//! - [`Frame`] - a column-named table of nullable scalars, the unit the
//!   filters and builders operate on
//!
//! ## Example
//!
//! ```rust
//! use arrears_core::{Frame, Value, Workbook};
//!
//! let mut frame = Frame::new(["agent", "total"]);
//! frame.push_row(vec![Some(Value::text("Dana")), Some(Value::Number(120.0))]);
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.replace_worksheet("report").unwrap();
//! frame.write_to_sheet(sheet, 0).unwrap();
//! assert_eq!(sheet.text_at(1, 0), "Dana");
//! ```

pub mod cell;
pub mod error;
pub mod frame;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellRange, CellValue};
pub use error::{Error, Result};
pub use frame::{dedupe_names, Frame, RowRef, Scalar, Value};
pub use style::CellStyle;
pub use workbook::Workbook;
pub use worksheet::{FreezePanes, Worksheet};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
