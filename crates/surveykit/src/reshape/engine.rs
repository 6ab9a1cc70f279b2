//! Pivoting tables between wide and long orientation.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, SurveyError};
use crate::table::{Table, Value, ValueKey};

/// Melt value columns into name/value pairs, one output row per input row
/// and value column.
///
/// Output columns are `id_columns` (in the given order), then
/// `name_label`, then `value_label`. Rows are grouped by input row, and
/// within a group follow the order of `value_columns`.
pub fn wide_to_long<S: AsRef<str>, T: AsRef<str>>(
    table: &Table,
    id_columns: &[S],
    value_columns: &[T],
    name_label: &str,
    value_label: &str,
) -> Result<Table> {
    table.require_columns(id_columns)?;
    table.require_columns(value_columns)?;

    let ids: Vec<&str> = id_columns.iter().map(AsRef::as_ref).collect();
    let values: Vec<&str> = value_columns.iter().map(AsRef::as_ref).collect();

    check_unique(&ids)?;
    check_unique(&values)?;
    check_disjoint(&ids, &values)?;
    if name_label == value_label {
        return Err(SurveyError::DuplicateColumn(name_label.to_string()));
    }
    for label in [name_label, value_label] {
        if ids.contains(&label) {
            return Err(SurveyError::DuplicateColumn(label.to_string()));
        }
    }

    // Resolve every column once, not per cell.
    let id_cells: Vec<&[Value]> = ids
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<_>>()?;
    let value_cells: Vec<&[Value]> = values
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<_>>()?;

    let out_rows = table.row_count() * values.len();
    let mut id_out: Vec<Vec<Value>> = vec![Vec::with_capacity(out_rows); ids.len()];
    let mut name_out = Vec::with_capacity(out_rows);
    let mut value_out = Vec::with_capacity(out_rows);

    for row in 0..table.row_count() {
        for (name, column) in values.iter().zip(&value_cells) {
            for (out, cells) in id_out.iter_mut().zip(&id_cells) {
                out.push(cells[row].clone());
            }
            name_out.push(Value::from(*name));
            value_out.push(column[row].clone());
        }
    }

    let mut out = Table::new();
    for (name, cells) in ids.iter().zip(id_out) {
        out.push_column(*name, cells)?;
    }
    out.push_column(name_label, name_out)?;
    out.push_column(value_label, value_out)?;

    log::debug!(
        "wide_to_long: {}x{} -> {}x{}",
        table.row_count(),
        table.column_count(),
        out.row_count(),
        out.column_count()
    );
    Ok(out)
}

/// Spread name/value pairs back into one column per distinct name.
///
/// Rows are grouped by the tuple of `id_columns` values, in order of first
/// appearance. New columns follow the first appearance of each name across
/// the whole table; a group without a row for some name gets a missing cell.
/// When a group has several rows for the same name, the last one wins.
pub fn long_to_wide<S: AsRef<str>>(
    table: &Table,
    id_columns: &[S],
    names_from: &str,
    values_from: &str,
) -> Result<Table> {
    table.require_columns(id_columns)?;
    let name_cells = table.require_column(names_from)?;
    let value_cells = table.require_column(values_from)?;

    let ids: Vec<&str> = id_columns.iter().map(AsRef::as_ref).collect();
    check_unique(&ids)?;
    if names_from == values_from {
        return Err(SurveyError::OverlappingColumns(vec![names_from.to_string()]));
    }
    check_disjoint(&ids, &[names_from, values_from])?;

    let id_cells: Vec<&[Value]> = ids
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<_>>()?;

    // Group index per distinct id tuple, mapped to the first row that produced it.
    let mut groups: IndexMap<Vec<ValueKey>, usize> = IndexMap::new();
    let mut row_groups = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let key: Vec<ValueKey> = id_cells.iter().map(|c| c[row].key()).collect();
        let entry = groups.entry(key);
        row_groups.push(entry.index());
        entry.or_insert(row);
    }
    let first_rows: Vec<usize> = groups.values().copied().collect();

    // New column labels in order of first appearance.
    let mut names: IndexSet<String> = IndexSet::new();
    let mut row_names = Vec::with_capacity(table.row_count());
    for (row, cell) in name_cells.iter().enumerate() {
        let label = cell.label().ok_or_else(|| SurveyError::MissingValue {
            column: names_from.to_string(),
            row,
        })?;
        let (index, _) = names.insert_full(label);
        row_names.push(index);
    }
    for label in &names {
        if ids.contains(&label.as_str()) {
            return Err(SurveyError::DuplicateColumn(label.clone()));
        }
    }

    let mut spread: Vec<Vec<Value>> = vec![vec![Value::Missing; groups.len()]; names.len()];
    let mut filled: Vec<Vec<bool>> = vec![vec![false; groups.len()]; names.len()];
    let mut duplicates = 0usize;
    for row in 0..table.row_count() {
        let group = row_groups[row];
        let name = row_names[row];
        if filled[name][group] {
            duplicates += 1;
        }
        filled[name][group] = true;
        spread[name][group] = value_cells[row].clone();
    }
    if duplicates > 0 {
        log::warn!(
            "long_to_wide: {} rows share an id/name pair with an earlier row; kept the last value",
            duplicates
        );
    }

    let mut out = Table::new();
    for (name, cells) in ids.iter().zip(&id_cells) {
        let column = first_rows.iter().map(|&r| cells[r].clone()).collect();
        out.push_column(*name, column)?;
    }
    for (label, cells) in names.into_iter().zip(spread) {
        out.push_column(label, cells)?;
    }

    log::debug!(
        "long_to_wide: {}x{} -> {}x{}",
        table.row_count(),
        table.column_count(),
        out.row_count(),
        out.column_count()
    );
    Ok(out)
}

fn check_unique(names: &[&str]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(*name) {
            return Err(SurveyError::DuplicateColumn(name.to_string()));
        }
    }
    Ok(())
}

fn check_disjoint(ids: &[&str], others: &[&str]) -> Result<()> {
    let overlap: Vec<String> = others
        .iter()
        .filter(|c| ids.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if overlap.is_empty() {
        Ok(())
    } else {
        Err(SurveyError::OverlappingColumns(overlap))
    }
}
