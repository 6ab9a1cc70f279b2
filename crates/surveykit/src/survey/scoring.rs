//! Scale item scoring.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::table::{Table, Value};

/// Reverse-code scale items: every cell `x` becomes `min + max - x`.
///
/// Only the named columns change. Missing cells stay missing. Values outside
/// `[min_value, max_value]` are reflected all the same.
pub fn reverse_score<S: AsRef<str>>(
    table: &Table,
    items: &[S],
    min_value: f64,
    max_value: f64,
) -> Result<Table> {
    if !(min_value < max_value) {
        return Err(SurveyError::InvalidArgument(format!(
            "scale minimum ({}) must be below maximum ({})",
            min_value, max_value
        )));
    }
    table.require_columns(items)?;

    let mut out = table.clone();
    for item in items {
        let item = item.as_ref();
        let reversed: Vec<Value> = table
            .numeric_column(item)?
            .into_iter()
            .map(|cell| Value::from(cell.map(|x| min_value + max_value - x)))
            .collect();
        out.set_column(item, reversed)?;
    }

    log::debug!("reverse-scored {} items on [{}, {}]", items.len(), min_value, max_value);
    Ok(out)
}

/// How item responses combine into a scale score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMethod {
    Mean,
    Sum,
}

/// Add a row-wise scale score column computed from `items`.
///
/// A row with any missing item gets a missing score. An existing column
/// named `output` is replaced.
pub fn score_scale<S: AsRef<str>>(
    table: &Table,
    items: &[S],
    method: ScaleMethod,
    output: &str,
) -> Result<Table> {
    if items.is_empty() {
        return Err(SurveyError::InvalidArgument(
            "a scale needs at least one item".to_string(),
        ));
    }
    let columns = items
        .iter()
        .map(|item| table.numeric_column(item.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let scores: Vec<Value> = (0..table.row_count())
        .map(|row| {
            let cells: Option<Vec<f64>> = columns.iter().map(|c| c[row]).collect();
            let cells = cells?;
            let total: f64 = cells.iter().sum();
            Some(match method {
                ScaleMethod::Sum => total,
                ScaleMethod::Mean => total / cells.len() as f64,
            })
        })
        .map(Value::from)
        .collect();

    table.clone().with_column(output, scores)
}
