//! In-memory column-oriented table.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};

use super::types::ColumnType;
use super::value::{Value, ValueKey};

/// An ordered set of uniquely named, equal-length columns.
///
/// Column lookup goes through an `IndexMap`, so a name is resolved once and
/// the column order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Vec<Value>>",
    into = "IndexMap<String, Vec<Value>>"
)]
pub struct Table {
    columns: IndexMap<String, Vec<Value>>,
    row_count: usize,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// Fails on duplicate names or unequal column lengths.
    pub fn from_columns<I, N>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Vec<Value>)>,
        N: Into<String>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a new column.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(SurveyError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.row_count = values.len();
        } else if values.len() != self.row_count {
            return Err(SurveyError::LengthMismatch {
                column: name,
                expected: self.row_count,
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Replace a column's values in place, or append it if absent.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if !self.columns.contains_key(&name) {
            return self.push_column(name, values);
        }
        if values.len() != self.row_count {
            return Err(SurveyError::LengthMismatch {
                column: name,
                expected: self.row_count,
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Builder form of [`Table::set_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.set_column(name, values)?;
        Ok(self)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterate over `(name, values)` in table order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Get a column by name, failing with `ColumnNotFound`.
    pub fn require_column(&self, name: &str) -> Result<&[Value]> {
        self.column(name)
            .ok_or_else(|| SurveyError::column_not_found(name, self.column_names()))
    }

    /// Check that every name exists, reporting the first absent one.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.require_column(name.as_ref())?;
        }
        Ok(())
    }

    /// Get a specific cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Get a row as cells in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.values().map(|c| &c[index]).collect())
    }

    /// Classify a column's cells.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(ColumnType::of)
    }

    /// Read a column as numbers.
    ///
    /// Missing cells become `None`; booleans read as 1/0; a text cell fails
    /// with `NonNumeric`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let values = self.require_column(name)?;
        values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                if value.is_missing() {
                    Ok(None)
                } else {
                    value.as_number().map(Some).ok_or_else(|| SurveyError::NonNumeric {
                        column: name.to_string(),
                        row,
                    })
                }
            })
            .collect()
    }

    /// Distinct non-missing values of a column, in order of first appearance.
    pub fn distinct_values(&self, name: &str) -> Result<Vec<Value>> {
        let values = self.require_column(name)?;
        let mut seen: HashSet<ValueKey> = HashSet::new();
        Ok(values
            .iter()
            .filter(|v| !v.is_missing())
            .filter(|v| seen.insert(v.key()))
            .cloned()
            .collect())
    }

    /// New table with only the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut out = Table::new();
        for name in names {
            let name = name.as_ref();
            out.push_column(name, self.require_column(name)?.to_vec())?;
        }
        out.row_count = self.row_count;
        Ok(out)
    }

    /// New table with the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let picked = rows
                    .iter()
                    .map(|&r| values.get(r).cloned().unwrap_or_default())
                    .collect();
                (name.clone(), picked)
            })
            .collect();
        Table {
            columns,
            row_count: rows.len(),
        }
    }

    /// New table without the first `count` rows.
    pub fn skip_rows(&self, count: usize) -> Table {
        let start = count.min(self.row_count);
        let rows: Vec<usize> = (start..self.row_count).collect();
        self.take_rows(&rows)
    }

    /// Rename columns in place, keeping their positions.
    ///
    /// Every old name is resolved against the table before any rename is
    /// applied, so `{a: b, b: a}` swaps two columns and `{a: b, b: c}` does
    /// not chain. Old names absent from the table are skipped. A target that
    /// would collide with a column that keeps its name fails with
    /// `DuplicateColumn`, leaving the table unchanged.
    pub fn rename_columns<'a>(
        &mut self,
        renames: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        let renames: IndexMap<&str, &str> = renames
            .into_iter()
            .filter(|(old, _)| self.columns.contains_key(*old))
            .collect();
        if renames.is_empty() {
            return Ok(());
        }

        let targets: Vec<String> = self
            .columns
            .keys()
            .map(|name| {
                renames
                    .get(name.as_str())
                    .map_or_else(|| name.clone(), |new| new.to_string())
            })
            .collect();
        let mut seen = HashSet::with_capacity(targets.len());
        if let Some(clash) = targets.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(SurveyError::DuplicateColumn(clash.clone()));
        }

        let columns = std::mem::take(&mut self.columns);
        self.columns = targets.into_iter().zip(columns.into_values()).collect();
        Ok(())
    }

    /// Remove a column, returning its values.
    pub fn remove_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let removed = self.columns.shift_remove(name);
        if self.columns.is_empty() {
            self.row_count = 0;
        }
        removed
    }
}

impl TryFrom<IndexMap<String, Vec<Value>>> for Table {
    type Error = SurveyError;

    fn try_from(columns: IndexMap<String, Vec<Value>>) -> Result<Self> {
        Table::from_columns(columns)
    }
}

impl From<Table> for IndexMap<String, Vec<Value>> {
    fn from(table: Table) -> Self {
        table.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns([
            ("id", vec![1.into(), 2.into(), 3.into()]),
            ("group", vec!["a".into(), "b".into(), "a".into()]),
            ("score", vec![10.0.into(), Value::Missing, 11.5.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let err = Table::from_columns([
            ("a", vec![1.into(), 2.into()]),
            ("b", vec![1.into()]),
        ])
        .unwrap_err();
        assert!(matches!(err, SurveyError::LengthMismatch { .. }));
    }

    #[test]
    fn test_from_columns_rejects_duplicates() {
        let err = Table::from_columns([("a", vec![1.into()]), ("a", vec![2.into()])]).unwrap_err();
        assert!(matches!(err, SurveyError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_require_column() {
        let table = sample();
        assert_eq!(table.require_column("id").unwrap().len(), 3);
        let err = table.require_column("age").unwrap_err();
        assert!(matches!(err, SurveyError::ColumnNotFound { ref column, .. } if column == "age"));
    }

    #[test]
    fn test_numeric_column() {
        let table = sample();
        assert_eq!(
            table.numeric_column("score").unwrap(),
            vec![Some(10.0), None, Some(11.5)]
        );
        assert!(matches!(
            table.numeric_column("group"),
            Err(SurveyError::NonNumeric { row: 0, .. })
        ));
    }

    #[test]
    fn test_distinct_values_first_appearance() {
        let table = sample();
        assert_eq!(
            table.distinct_values("group").unwrap(),
            vec![Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn test_select_and_take_rows() {
        let table = sample();
        let selected = table.select(&["score", "id"]).unwrap();
        assert_eq!(selected.column_names().collect::<Vec<_>>(), vec!["score", "id"]);

        let rows = table.take_rows(&[2, 0]);
        assert_eq!(rows.row_count(), 2);
        assert_eq!(rows.get(0, "id"), Some(&Value::from(3)));
    }

    #[test]
    fn test_skip_rows_saturates() {
        let table = sample();
        assert_eq!(table.skip_rows(1).row_count(), 2);
        assert_eq!(table.skip_rows(10).row_count(), 0);
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut table = sample();
        table.rename_columns([("group", "condition")]).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["id", "condition", "score"]
        );
        assert!(matches!(
            table.rename_columns([("id", "score")]),
            Err(SurveyError::DuplicateColumn(name)) if name == "score"
        ));
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["id", "condition", "score"]
        );
    }

    #[test]
    fn test_renames_resolve_against_original_names() {
        let mut swapped = sample();
        swapped.rename_columns([("id", "score"), ("score", "id")]).unwrap();
        assert_eq!(
            swapped.column_names().collect::<Vec<_>>(),
            vec!["score", "group", "id"]
        );
        assert_eq!(swapped.column("id"), sample().column("score"));

        let mut chained = sample();
        chained
            .rename_columns([("id", "group"), ("group", "label"), ("missing", "x")])
            .unwrap();
        assert_eq!(
            chained.column_names().collect::<Vec<_>>(),
            vec!["group", "label", "score"]
        );
        assert_eq!(chained.column("group"), sample().column("id"));
    }

    #[test]
    fn test_serde_validates_lengths() {
        let ok: Table = serde_json::from_str(r#"{"a":[1,2],"b":["x",null]}"#).unwrap();
        assert_eq!(ok.row_count(), 2);
        assert!(serde_json::from_str::<Table>(r#"{"a":[1,2],"b":["x"]}"#).is_err());
    }
}
