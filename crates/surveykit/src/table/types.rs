//! Column type classification.

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Observed storage type of a column, derived from its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every present cell is a number.
    Numeric,
    /// Every present cell is text.
    Text,
    /// Every present cell is a boolean.
    Boolean,
    /// Present cells have more than one type.
    Mixed,
    /// Every cell is missing (or the column has no rows).
    Empty,
}

impl ColumnType {
    /// Classify a column from its cells.
    pub fn of(values: &[Value]) -> Self {
        let mut seen: Option<ColumnType> = None;

        for value in values {
            if value.is_missing() {
                continue;
            }
            let kind = match value {
                Value::Number(_) => ColumnType::Numeric,
                Value::Text(_) => ColumnType::Text,
                Value::Bool(_) => ColumnType::Boolean,
                Value::Missing => continue,
            };
            match seen {
                None => seen = Some(kind),
                Some(prev) if prev != kind => return ColumnType::Mixed,
                Some(_) => {}
            }
        }

        seen.unwrap_or(ColumnType::Empty)
    }

    /// Returns true if this column can be read as numbers without coercion.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Numeric | ColumnType::Boolean | ColumnType::Empty
        )
    }

    /// Returns true if any present cell is text.
    pub fn has_text(&self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::Mixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_columns() {
        assert_eq!(
            ColumnType::of(&[Value::from(1.0), Value::Missing]),
            ColumnType::Numeric
        );
        assert_eq!(ColumnType::of(&[Value::from("a")]), ColumnType::Text);
        assert_eq!(
            ColumnType::of(&[Value::from("a"), Value::from(2.0)]),
            ColumnType::Mixed
        );
        assert_eq!(ColumnType::of(&[Value::Missing]), ColumnType::Empty);
        assert_eq!(ColumnType::of(&[]), ColumnType::Empty);
    }

    #[test]
    fn test_numeric_predicates() {
        assert!(ColumnType::Boolean.is_numeric());
        assert!(!ColumnType::Mixed.is_numeric());
        assert!(ColumnType::Mixed.has_text());
    }
}
