//! Internal-consistency reliability.

use serde::{Deserialize, Serialize};

use super::design::{complete_rows, numeric_values};
use super::numeric::{mean, pearson, std_dev, variance};
use crate::error::{Result, SurveyError};
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatistics {
    pub item: String,
    pub mean: f64,
    pub sd: f64,
    /// Correlation of the item with the sum of the other items.
    pub corrected_item_total: f64,
    /// Alpha of the scale without this item; absent for two-item scales.
    pub alpha_if_dropped: Option<f64>,
}

/// Output of [`cronbach_alpha`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reliability {
    pub alpha: f64,
    /// Alpha computed from the mean inter-item correlation.
    pub standardized_alpha: f64,
    /// Complete rows used.
    pub n: usize,
    pub items: Vec<ItemStatistics>,
}

/// Cronbach's alpha over `items`, using only rows where every item is present.
pub fn cronbach_alpha<S: AsRef<str>>(table: &Table, items: &[S]) -> Result<Reliability> {
    if items.len() < 2 {
        return Err(SurveyError::InvalidArgument(format!(
            "Cronbach's alpha needs at least 2 items, got {}",
            items.len()
        )));
    }
    table.require_columns(items)?;
    let names: Vec<&str> = items.iter().map(|s| s.as_ref()).collect();

    let rows = complete_rows(table, &names, &[])?;
    if rows.len() < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "Cronbach's alpha needs at least 2 complete rows, found {}",
            rows.len()
        )));
    }
    let data = table.take_rows(&rows);
    let columns = names
        .iter()
        .map(|name| numeric_values(&data, name))
        .collect::<Result<Vec<_>>>()?;

    let alpha = raw_alpha(&columns)?;
    let standardized_alpha = standardized_alpha(&columns);

    let totals = row_totals(&columns);
    let items = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let rest: Vec<f64> = totals.iter().zip(&columns[i]).map(|(t, v)| t - v).collect();
            let others: Vec<Vec<f64>> = columns
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| c.clone())
                .collect();
            let alpha_if_dropped = if others.len() >= 2 {
                raw_alpha(&others).ok()
            } else {
                None
            };
            ItemStatistics {
                item: name.to_string(),
                mean: mean(&columns[i]),
                sd: std_dev(&columns[i]),
                corrected_item_total: pearson(&columns[i], &rest),
                alpha_if_dropped,
            }
        })
        .collect();

    log::debug!(
        "cronbach alpha over {} items and {} rows: {}",
        names.len(),
        rows.len(),
        alpha
    );

    Ok(Reliability {
        alpha,
        standardized_alpha,
        n: rows.len(),
        items,
    })
}

fn row_totals(columns: &[Vec<f64>]) -> Vec<f64> {
    (0..columns[0].len())
        .map(|row| columns.iter().map(|c| c[row]).sum())
        .collect()
}

fn raw_alpha(columns: &[Vec<f64>]) -> Result<f64> {
    let k = columns.len() as f64;
    let item_variance: f64 = columns.iter().map(|c| variance(c)).sum();
    let total_variance = variance(&row_totals(columns));
    if total_variance == 0.0 || !total_variance.is_finite() {
        return Err(SurveyError::Computation(
            "scale total has no variance".to_string(),
        ));
    }
    Ok(k / (k - 1.0) * (1.0 - item_variance / total_variance))
}

fn standardized_alpha(columns: &[Vec<f64>]) -> f64 {
    let k = columns.len();
    let mut sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..k {
        for j in (i + 1)..k {
            sum += pearson(&columns[i], &columns[j]);
            pairs += 1;
        }
    }
    let r_bar = sum / pairs as f64;
    let k = k as f64;
    k * r_bar / (1.0 + (k - 1.0) * r_bar)
}
