use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the fatal failure cases of the estimating pipeline.
///
/// Recoverable conditions (corrupt CSV rows, unresolved labels or sizes,
/// numeric text that does not parse) are logged and skipped instead of being
/// raised through this type.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a JSON rule table cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the delimited input cannot be opened or read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a workbook cannot be opened for editing or saved.
    #[error("Excel write error: {0}")]
    Workbook(String),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a required named sheet is absent from the workbook.
    #[error("sheet '{0}' not found in the workbook")]
    MissingSheet(String),

    /// Raised when a required header is absent from a tabular sheet.
    #[error("column '{column}' not found in the '{sheet}' sheet")]
    MissingColumn { sheet: String, column: String },

    /// Raised when the breakdown sheet carries no INPUT AREA marker.
    #[error("'INPUT AREA' not found in the '{0}' sheet")]
    MissingInputArea(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
