//! Reshape requests as data.

use serde::{Deserialize, Serialize};

use super::engine::{long_to_wide, wide_to_long};
use crate::error::Result;
use crate::table::Table;

/// A reshape to apply to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReshapeOperation {
    /// Melt value columns into name/value pairs.
    WideToLong {
        id_columns: Vec<String>,
        value_columns: Vec<String>,
        name_label: String,
        value_label: String,
    },

    /// Spread name/value pairs into columns.
    LongToWide {
        id_columns: Vec<String>,
        names_from: String,
        values_from: String,
    },
}

impl ReshapeOperation {
    /// Apply the operation, returning a new table.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        match self {
            ReshapeOperation::WideToLong {
                id_columns,
                value_columns,
                name_label,
                value_label,
            } => wide_to_long(table, id_columns, value_columns, name_label, value_label),
            ReshapeOperation::LongToWide {
                id_columns,
                names_from,
                values_from,
            } => long_to_wide(table, id_columns, names_from, values_from),
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            ReshapeOperation::WideToLong {
                id_columns,
                value_columns,
                name_label,
                value_label,
            } => format!(
                "Wide to long: keep {:?}, melt {:?} into '{}'/'{}'",
                id_columns, value_columns, name_label, value_label
            ),
            ReshapeOperation::LongToWide {
                id_columns,
                names_from,
                values_from,
            } => format!(
                "Long to wide: group by {:?}, columns from '{}', values from '{}'",
                id_columns, names_from, values_from
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_json() {
        let op: ReshapeOperation = serde_json::from_str(
            r#"{"type":"long_to_wide","id_columns":["id"],"names_from":"t","values_from":"v"}"#,
        )
        .unwrap();
        assert!(op.description().contains("columns from 't'"));
    }
}
