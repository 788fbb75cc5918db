use thiserror::Error;
use zqlz_core::ZqlzError;

pub type DmlResult<T> = Result<T, DmlError>;

/// Errors surfaced to callers of the data editing layer.
///
/// Metadata lookups that fail while resolving dependencies are not part of
/// this taxonomy: those degrade to partial trees and are only logged.
#[derive(Debug, Error)]
pub enum DmlError {
    #[error("column index {index} out of range (row has {column_count} columns)")]
    ColumnIndexOutOfRange { index: usize, column_count: usize },

    #[error("row index {index} out of range (store has {row_count} rows)")]
    RowIndexOutOfRange { index: usize, row_count: usize },

    #[error("row has {actual} values but the result has {expected} columns")]
    RowWidthMismatch { expected: usize, actual: usize },

    #[error("no key columns known for table {table}")]
    NoKeyColumns { table: String },

    #[error("no modified columns to update in table {table}")]
    NoModifiedColumns { table: String },

    #[error("statement has {placeholders} placeholders but {values} bound values")]
    PlaceholderMismatch { placeholders: usize, values: usize },

    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("metadata lookup failed: {0}")]
    Metadata(#[from] ZqlzError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
