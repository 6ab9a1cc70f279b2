//! Error types for the surveykit library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for surveykit operations.
///
/// Every message is written to be shown to an end user as-is.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// A referenced column does not exist in the table.
    #[error("Column '{column}' not found (available columns: {})", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// An operation would produce two columns with the same name.
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// The same column was named both as an id column and as a reshaped column.
    #[error("Columns used both as id and as reshaped columns: {}", .0.join(", "))]
    OverlappingColumns(Vec<String>),

    /// A column does not have the table's row count.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A grouping column has the wrong number of distinct levels.
    #[error("Column '{column}' needs {expected} distinct groups, found {found}")]
    InvalidGroupCount {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Not enough complete observations to compute a result.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A numeric operation met a text cell.
    #[error("Column '{column}' has a non-numeric value at row {row}")]
    NonNumeric { column: String, row: usize },

    /// A cell that must be present is missing.
    #[error("Column '{column}' has a missing value at row {row}")]
    MissingValue { column: String, row: usize },

    /// An argument is outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A numeric computation could not be completed.
    #[error("Computation failed: {0}")]
    Computation(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SurveyError {
    /// Build a `ColumnNotFound` error listing the columns that do exist.
    pub fn column_not_found<'a>(
        column: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        SurveyError::ColumnNotFound {
            column: column.into(),
            available: available.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Result type alias for surveykit operations.
pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_message_lists_columns() {
        let err = SurveyError::column_not_found("age", ["id", "score"]);
        assert_eq!(
            err.to_string(),
            "Column 'age' not found (available columns: id, score)"
        );
    }

    #[test]
    fn test_group_count_message() {
        let err = SurveyError::InvalidGroupCount {
            column: "condition".to_string(),
            expected: 2,
            found: 3,
        };
        assert!(err.to_string().contains("found 3"));
    }
}
