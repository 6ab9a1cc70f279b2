//! Descriptive statistics.

use serde::{Deserialize, Serialize};

use super::design::Factor;
use super::numeric::{mean, median, std_dev};
use crate::error::Result;
use crate::table::Table;

/// Summary of one variable, optionally within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptives {
    pub variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Number of non-missing values.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub sd: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl Descriptives {
    fn from_values(variable: &str, group: Option<String>, values: &[f64]) -> Self {
        let (min, max) = if values.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        Self {
            variable: variable.to_string(),
            group,
            count: values.len(),
            mean: mean(values),
            sd: std_dev(values),
            min,
            max,
            median: median(values),
        }
    }
}

/// Count, mean, SD, min, max and median per variable, and per group level
/// when `group` is given. Missing values are excluded throughout; rows with
/// a missing group are left out of grouped summaries.
pub fn descriptive_stats<S: AsRef<str>>(
    table: &Table,
    vars: &[S],
    group: Option<&str>,
) -> Result<Vec<Descriptives>> {
    table.require_columns(vars)?;
    let factor = group.map(|g| Factor::from_column(table, g)).transpose()?;

    let mut out = Vec::new();
    for var in vars {
        let var = var.as_ref();
        let cells = table.numeric_column(var)?;

        match &factor {
            None => {
                let values: Vec<f64> = cells.iter().flatten().copied().collect();
                out.push(Descriptives::from_values(var, None, &values));
            }
            Some(factor) => {
                for (level_idx, level) in factor.levels.iter().enumerate() {
                    let values: Vec<f64> = cells
                        .iter()
                        .zip(&factor.codes)
                        .filter(|(_, code)| **code == Some(level_idx))
                        .filter_map(|(cell, _)| *cell)
                        .collect();
                    out.push(Descriptives::from_values(var, Some(level.clone()), &values));
                }
            }
        }
    }

    Ok(out)
}
