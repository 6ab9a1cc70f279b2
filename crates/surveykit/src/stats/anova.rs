//! One-way, two-way and repeated-measures analysis of variance.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::design::{Factor, complete_rows, interaction, numeric_values};
use super::linalg::ols;
use super::numeric::f_upper_p;
use crate::error::{Result, SurveyError};
use crate::table::{Table, ValueKey};

/// Which ANOVA model to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "design", rename_all = "snake_case")]
pub enum AnovaDesign {
    OneWay {
        dv: String,
        factor: String,
    },
    TwoWay {
        dv: String,
        factor_a: String,
        factor_b: String,
        interaction: bool,
    },
    /// Long-format data: one row per subject per level of `within`.
    RepeatedMeasures {
        dv: String,
        subject: String,
        within: String,
    },
}

/// One line of an ANOVA table. The residual line has no F or p.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaRow {
    pub term: String,
    pub sum_sq: f64,
    pub df: f64,
    pub mean_sq: f64,
    pub f: Option<f64>,
    pub p_value: Option<f64>,
    /// Share of the total sum of squares; absent for repeated measures.
    pub eta_sq: Option<f64>,
}

/// Output of [`run_anova`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaTable {
    pub formula: String,
    pub rows: Vec<AnovaRow>,
    /// Observations used after listwise deletion.
    pub n: usize,
    /// Subjects kept, for repeated measures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<usize>,
}

impl AnovaTable {
    /// Look up a row by term name.
    pub fn row(&self, term: &str) -> Option<&AnovaRow> {
        self.rows.iter().find(|r| r.term == term)
    }
}

/// Fit the ANOVA model described by `design`.
pub fn run_anova(table: &Table, design: &AnovaDesign) -> Result<AnovaTable> {
    match design {
        AnovaDesign::OneWay { dv, factor } => {
            table.require_columns(&[dv, factor])?;
            let rows = complete_rows(table, &[dv.as_str()], &[factor.as_str()])?;
            let data = table.take_rows(&rows);
            let y = numeric_values(&data, dv)?;
            let f = level_checked(&data, factor)?;

            let terms = vec![(format!("C({})", factor), f.dummies())];
            let rows = sequential_anova(&y, terms)?;
            Ok(AnovaTable {
                formula: format!("{} ~ C({})", dv, factor),
                rows,
                n: y.len(),
                subjects: None,
            })
        }

        AnovaDesign::TwoWay {
            dv,
            factor_a,
            factor_b,
            interaction: with_interaction,
        } => {
            table.require_columns(&[dv, factor_a, factor_b])?;
            let rows = complete_rows(table, &[dv.as_str()], &[factor_a.as_str(), factor_b.as_str()])?;
            let data = table.take_rows(&rows);
            let y = numeric_values(&data, dv)?;
            let fa = level_checked(&data, factor_a)?;
            let fb = level_checked(&data, factor_b)?;

            let (da, db) = (fa.dummies(), fb.dummies());
            let name_a = format!("C({})", factor_a);
            let name_b = format!("C({})", factor_b);
            let mut formula = format!("{} ~ {} + {}", dv, name_a, name_b);

            let mut terms = vec![(name_a.clone(), da.clone()), (name_b.clone(), db.clone())];
            if *with_interaction {
                let name_ab = format!("{}:{}", name_a, name_b);
                formula = format!("{} + {}", formula, name_ab);
                terms.push((name_ab, interaction(&da, &db)));
            }

            let rows = sequential_anova(&y, terms)?;
            Ok(AnovaTable {
                formula,
                rows,
                n: y.len(),
                subjects: None,
            })
        }

        AnovaDesign::RepeatedMeasures { dv, subject, within } => {
            table.require_columns(&[dv, subject, within])?;
            repeated_measures(table, dv, subject, within)
        }
    }
}

fn level_checked(table: &Table, name: &str) -> Result<Factor> {
    let factor = Factor::from_column(table, name)?;
    if factor.level_count() < 2 {
        return Err(SurveyError::InvalidGroupCount {
            column: name.to_string(),
            expected: 2,
            found: factor.level_count(),
        });
    }
    Ok(factor)
}

/// Type I sums of squares: each term's reduction in residual sum of squares
/// when added after the terms before it.
fn sequential_anova(y: &[f64], terms: Vec<(String, Vec<Vec<f64>>)>) -> Result<Vec<AnovaRow>> {
    let n = y.len();
    let k: usize = 1 + terms.iter().map(|(_, cols)| cols.len()).sum::<usize>();
    if n <= k {
        return Err(SurveyError::InsufficientData(format!(
            "{} observations leave no residual degrees of freedom for {} parameters",
            n, k
        )));
    }

    let mut columns = vec![vec![1.0; n]];
    let mut previous = ols(&columns, y)?.rss;
    let total = previous;

    let mut effects = Vec::with_capacity(terms.len());
    for (term, cols) in terms {
        let df = cols.len() as f64;
        columns.extend(cols);
        let rss = ols(&columns, y)?.rss;
        effects.push((term, (previous - rss).max(0.0), df));
        previous = rss;
    }

    let df_resid = (n - columns.len()) as f64;
    let ms_resid = previous / df_resid;
    log::debug!(
        "anova fit: n={}, parameters={}, residual ss={}",
        n,
        columns.len(),
        previous
    );

    let mut rows = Vec::with_capacity(effects.len() + 1);
    for (term, ss, df) in effects {
        let ms = ss / df;
        let f = ms / ms_resid;
        rows.push(AnovaRow {
            term,
            sum_sq: ss,
            df,
            mean_sq: ms,
            f: Some(f),
            p_value: Some(f_upper_p(f, df, df_resid)?),
            eta_sq: Some(ss / total),
        });
    }
    rows.push(AnovaRow {
        term: "Residual".to_string(),
        sum_sq: previous,
        df: df_resid,
        mean_sq: ms_resid,
        f: None,
        p_value: None,
        eta_sq: Some(previous / total),
    });
    Ok(rows)
}

fn repeated_measures(table: &Table, dv: &str, subject: &str, within: &str) -> Result<AnovaTable> {
    let rows = complete_rows(table, &[dv], &[subject, within])?;
    let data = table.take_rows(&rows);
    let y = numeric_values(&data, dv)?;
    let factor = level_checked(&data, within)?;
    let levels = factor.level_count();
    let subjects_col = data.require_column(subject)?;

    // Per subject: (sum, count) per level.
    let mut cells: IndexMap<ValueKey, Vec<(f64, usize)>> = IndexMap::new();
    let mut duplicated = false;
    for (row, value) in y.iter().enumerate() {
        let Some(level) = factor.codes[row] else {
            continue;
        };
        let entry = cells
            .entry(subjects_col[row].key())
            .or_insert_with(|| vec![(0.0, 0); levels]);
        duplicated |= entry[level].1 > 0;
        entry[level].0 += value;
        entry[level].1 += 1;
    }
    if duplicated {
        log::warn!(
            "repeated measures: averaging duplicate '{}' x '{}' cells",
            subject,
            within
        );
    }

    let total_subjects = cells.len();
    let matrix: Vec<Vec<f64>> = cells
        .into_values()
        .filter(|levels| levels.iter().all(|(_, count)| *count > 0))
        .map(|levels| levels.iter().map(|(sum, count)| sum / *count as f64).collect())
        .collect();
    if matrix.len() < total_subjects {
        log::warn!(
            "repeated measures: dropped {} subject(s) missing a level of '{}'",
            total_subjects - matrix.len(),
            within
        );
    }

    let n_subjects = matrix.len();
    if n_subjects < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "repeated measures needs at least 2 subjects with every level of '{}', found {}",
            within, n_subjects
        )));
    }

    // Additive subject + condition model on the cell means; its residual is
    // the subject-by-condition error term.
    let cell_means: Vec<f64> = matrix.concat();
    let subject_effect = indicator_columns(cell_means.len(), n_subjects, |row| row / levels);
    let within_effect = indicator_columns(cell_means.len(), levels, |row| row % levels);

    let term = format!("C({})", within);
    let mut rows = sequential_anova(
        &cell_means,
        vec![
            (format!("C({})", subject), subject_effect),
            (term.clone(), within_effect),
        ],
    )?;
    rows.remove(0);
    for row in &mut rows {
        row.eta_sq = None;
    }
    log::debug!(
        "repeated measures fit: subjects={}, levels={}, F={:?}",
        n_subjects,
        levels,
        rows.first().and_then(|r| r.f)
    );

    Ok(AnovaTable {
        formula: format!("{} ~ {} + Error({}/{})", dv, term, subject, term),
        rows,
        n: n_subjects * levels,
        subjects: Some(n_subjects),
    })
}

/// Treatment-coded indicators for `count` categories, where `category`
/// maps a row index to its category. Category 0 is the reference.
fn indicator_columns(rows: usize, count: usize, category: impl Fn(usize) -> usize) -> Vec<Vec<f64>> {
    (1..count)
        .map(|level| {
            (0..rows)
                .map(|row| if category(row) == level { 1.0 } else { 0.0 })
                .collect()
        })
        .collect()
}

/// One-way F test of equal means across `samples`, fitted as a linear
/// model on group indicators. Returns `(F, df_between, df_within)`.
pub(crate) fn group_f_test(samples: &[Vec<f64>]) -> Result<(f64, f64, f64)> {
    let y: Vec<f64> = samples.concat();
    let membership: Vec<usize> = samples
        .iter()
        .enumerate()
        .flat_map(|(group, sample)| std::iter::repeat(group).take(sample.len()))
        .collect();
    let dummies = indicator_columns(y.len(), samples.len(), |row| membership[row]);

    let rows = sequential_anova(&y, vec![("group".to_string(), dummies)])?;
    let (effect, residual) = (&rows[0], &rows[1]);
    let total = effect.sum_sq + residual.sum_sq;
    if total == 0.0 || residual.sum_sq <= 1e-12 * total {
        return Err(SurveyError::Computation(
            "no within-group variance".to_string(),
        ));
    }
    Ok((effect.f.unwrap_or(f64::NAN), effect.df, residual.df))
}
