//! Report pipeline errors

use thiserror::Error;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can abort a report run or a single builder
#[derive(Debug, Error)]
pub enum ReportError {
    /// No row in the scan window carried enough values to be the header
    #[error("Header row not found within the first {scanned} rows")]
    HeaderNotFound { scanned: usize },

    /// A sheet the operation depends on is not in the workbook
    #[error("Sheet not found: {0}")]
    SheetMissing(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Workbook I/O error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] arrears_xlsx::XlsxError),

    /// Document model error
    #[error("Workbook error: {0}")]
    Core(#[from] arrears_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
