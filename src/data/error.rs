use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside the data layer. Loaders turn these into
/// [`Diagnostic`](super::diagnostics::Diagnostic)s at their boundary.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("xlsx export error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("{0} has no header row")]
    EmptyFile(PathBuf),

    #[error("unknown site: {0}")]
    UnknownSite(String),
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
