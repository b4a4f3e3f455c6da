//! Errors raised by the document model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid cell reference {0}")]
    InvalidAddress(String),

    /// Row and the largest allowed row, both 0-based
    #[error("row {0} is past the sheet limit ({1})")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is past the sheet limit ({1})")]
    ColumnOutOfBounds(u16, u16),

    #[error("no sheet at index {0} (workbook has {1})")]
    SheetOutOfBounds(usize, usize),

    #[error("no sheet named '{0}'")]
    SheetNotFound(String),

    #[error("bad sheet name {0}")]
    InvalidSheetName(String),

    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),

    #[error("merge {0} overlaps an existing merged region")]
    MergedCellConflict(String),

    #[error("frame has no column '{0}'")]
    ColumnNotFound(String),

    #[error("frame row {row} out of range ({rows} rows)")]
    FrameRowOutOfRange { row: usize, rows: usize },

    #[error("column '{column}' has {values} values for {rows} rows")]
    ColumnLength {
        column: String,
        values: usize,
        rows: usize,
    },
}
