//! Cell-related types

mod address;
mod value;

pub use address::{CellAddress, CellRange};
pub use value::CellValue;

use crate::style::CellStyle;

/// Complete data for a single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Explicit formatting, `None` for the default style
    pub style: Option<CellStyle>,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }

    /// Check if this cell carries neither a value nor a style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style.is_none()
    }
}
