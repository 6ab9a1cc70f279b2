//! Column extraction, listwise deletion and categorical coding.

use crate::error::Result;
use crate::table::{Table, Value};

/// A column coerced to a categorical factor.
///
/// Levels are sorted: numerically when every present cell is a number,
/// lexicographically otherwise.
#[derive(Debug, Clone)]
pub(crate) struct Factor {
    pub levels: Vec<String>,
    /// Level index per row; `None` for missing cells.
    pub codes: Vec<Option<usize>>,
}

impl Factor {
    pub fn from_column(table: &Table, name: &str) -> Result<Self> {
        let cells = table.require_column(name)?;
        let numeric = cells
            .iter()
            .filter(|c| !c.is_missing())
            .all(|c| matches!(c, Value::Number(_)));

        let mut distinct: Vec<&Value> = Vec::new();
        for cell in cells.iter().filter(|c| !c.is_missing()) {
            if !distinct.iter().any(|d| d.key() == cell.key()) {
                distinct.push(cell);
            }
        }
        distinct.sort_by(|a, b| {
            if numeric {
                let x = a.as_number().unwrap_or(f64::NAN);
                let y = b.as_number().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            } else {
                a.to_string().cmp(&b.to_string())
            }
        });

        let mut levels: Vec<String> = Vec::with_capacity(distinct.len());
        for value in distinct {
            let label = value.to_string();
            if levels.last() != Some(&label) {
                levels.push(label);
            }
        }

        let codes = cells
            .iter()
            .map(|c| {
                c.label()
                    .and_then(|label| levels.iter().position(|l| *l == label))
            })
            .collect();

        Ok(Self { levels, codes })
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Treatment-coded indicator columns (first level is the reference).
    pub fn dummies(&self) -> Vec<Vec<f64>> {
        (1..self.levels.len())
            .map(|level| {
                self.codes
                    .iter()
                    .map(|c| if *c == Some(level) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect()
    }
}

/// Rows where every `numeric` column holds a number and every `factor`
/// column is present. A text cell in a numeric column is an error.
pub(crate) fn complete_rows(table: &Table, numeric: &[&str], factors: &[&str]) -> Result<Vec<usize>> {
    let numeric_cols = numeric
        .iter()
        .map(|name| table.numeric_column(name))
        .collect::<Result<Vec<_>>>()?;
    let factor_cols = factors
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..table.row_count())
        .filter(|&row| {
            numeric_cols.iter().all(|c| c[row].is_some())
                && factor_cols.iter().all(|c| !c[row].is_missing())
        })
        .collect())
}

/// Numeric cells of a column, skipping missing ones.
pub(crate) fn numeric_values(table: &Table, name: &str) -> Result<Vec<f64>> {
    Ok(table.numeric_column(name)?.into_iter().flatten().collect())
}

/// Element-wise products of two sets of indicator columns.
pub(crate) fn interaction(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    a.iter()
        .flat_map(|ca| {
            b.iter()
                .map(move |cb| ca.iter().zip(cb).map(|(x, y)| x * y).collect::<Vec<f64>>())
        })
        .collect()
}

/// Z-standardize with the sample standard deviation.
pub(crate) fn standardize(values: &[f64]) -> Vec<f64> {
    let m = super::numeric::mean(values);
    let sd = super::numeric::std_dev(values);
    values.iter().map(|v| (v - m) / sd).collect()
}
