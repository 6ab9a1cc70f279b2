//! Two-sample, paired and pairwise t-tests.

use serde::{Deserialize, Serialize};

use super::design::{Factor, complete_rows, numeric_values};
use super::numeric::{adjust_p_values, mean, std_dev, t_critical, t_two_sided_p, variance};
use crate::config::AnalysisConfig;
use crate::error::{Result, SurveyError};
use crate::table::Table;

/// Which comparison to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "design", rename_all = "snake_case")]
pub enum TTestDesign {
    /// Compare two columns, as paired observations or as independent samples.
    Within { a: String, b: String, paired: bool },
    /// Compare `dv` between the two levels of `group`.
    Between { dv: String, group: String },
    /// Paired comparison of every pair of columns.
    MultipleTrials { columns: Vec<String> },
}

/// Flavor of t statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TTestKind {
    Paired,
    Student,
    Welch,
}

/// One two-sided comparison of `a` against `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub a: String,
    pub b: String,
    pub kind: TTestKind,
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    /// `mean_a - mean_b` (mean of differences when paired).
    pub mean_difference: f64,
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
    /// Multiplicity-adjusted p-value, for pairwise designs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_adjusted: Option<f64>,
    pub ci_low: f64,
    pub ci_high: f64,
    pub cohens_d: f64,
    pub significant: bool,
}

/// Summary of one compared column or group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub label: String,
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
}

impl SampleSummary {
    fn new(label: &str, values: &[f64]) -> Self {
        Self {
            label: label.to_string(),
            n: values.len(),
            mean: mean(values),
            sd: std_dev(values),
        }
    }
}

/// Output of [`run_t_test`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestReport {
    pub design: TTestDesign,
    pub comparisons: Vec<TTestResult>,
    pub summaries: Vec<SampleSummary>,
}

/// Run the t-test described by `design`.
///
/// Missing values are dropped listwise over the columns each comparison
/// uses. A between-subject design needs exactly two groups.
pub fn run_t_test(table: &Table, design: &TTestDesign, config: &AnalysisConfig) -> Result<TTestReport> {
    config.validate()?;
    match design {
        TTestDesign::Within { a, b, paired } => {
            table.require_columns(&[a, b])?;
            let (result, xs, ys) = if *paired {
                let rows = complete_rows(table, &[a.as_str(), b.as_str()], &[])?;
                let data = table.take_rows(&rows);
                let xs = numeric_values(&data, a)?;
                let ys = numeric_values(&data, b)?;
                (paired_test(a, &xs, b, &ys, config)?, xs, ys)
            } else {
                let xs = numeric_values(table, a)?;
                let ys = numeric_values(table, b)?;
                (
                    independent_test(a, &xs, b, &ys, config.welch_correction, config)?,
                    xs,
                    ys,
                )
            };
            Ok(TTestReport {
                design: design.clone(),
                comparisons: vec![result],
                summaries: vec![SampleSummary::new(a, &xs), SampleSummary::new(b, &ys)],
            })
        }

        TTestDesign::Between { dv, group } => {
            table.require_columns(&[dv, group])?;
            let rows = complete_rows(table, &[dv.as_str()], &[group.as_str()])?;
            let data = table.take_rows(&rows);
            let factor = Factor::from_column(&data, group)?;
            if factor.level_count() != 2 {
                return Err(SurveyError::InvalidGroupCount {
                    column: group.clone(),
                    expected: 2,
                    found: factor.level_count(),
                });
            }

            let values = numeric_values(&data, dv)?;
            let split = |level: usize| -> Vec<f64> {
                values
                    .iter()
                    .zip(&factor.codes)
                    .filter(|(_, code)| **code == Some(level))
                    .map(|(v, _)| *v)
                    .collect()
            };
            let xs = split(0);
            let ys = split(1);
            let (la, lb) = (&factor.levels[0], &factor.levels[1]);

            let result = independent_test(la, &xs, lb, &ys, config.welch_correction, config)?;
            Ok(TTestReport {
                design: design.clone(),
                comparisons: vec![result],
                summaries: vec![SampleSummary::new(la, &xs), SampleSummary::new(lb, &ys)],
            })
        }

        TTestDesign::MultipleTrials { columns } => {
            if columns.len() < 2 {
                return Err(SurveyError::InvalidArgument(format!(
                    "multiple-trials t-test needs at least 2 columns, got {}",
                    columns.len()
                )));
            }
            table.require_columns(columns)?;

            let mut comparisons = Vec::new();
            for i in 0..columns.len() {
                for j in (i + 1)..columns.len() {
                    let (a, b) = (&columns[i], &columns[j]);
                    let rows = complete_rows(table, &[a.as_str(), b.as_str()], &[])?;
                    let data = table.take_rows(&rows);
                    let xs = numeric_values(&data, a)?;
                    let ys = numeric_values(&data, b)?;
                    comparisons.push(paired_test(a, &xs, b, &ys, config)?);
                }
            }

            let raw: Vec<f64> = comparisons.iter().map(|c| c.p_value).collect();
            for (comparison, adjusted) in comparisons.iter_mut().zip(adjust_p_values(&raw, config.p_adjust)) {
                comparison.p_adjusted = Some(adjusted);
                comparison.significant = adjusted < config.alpha;
            }

            let summaries = columns
                .iter()
                .map(|c| Ok(SampleSummary::new(c, &numeric_values(table, c)?)))
                .collect::<Result<Vec<_>>>()?;

            Ok(TTestReport {
                design: design.clone(),
                comparisons,
                summaries,
            })
        }
    }
}

fn paired_test(a: &str, xs: &[f64], b: &str, ys: &[f64], config: &AnalysisConfig) -> Result<TTestResult> {
    let n = xs.len();
    if n < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "paired t-test of '{}' and '{}' needs at least 2 complete pairs, found {}",
            a, b, n
        )));
    }

    let diffs: Vec<f64> = xs.iter().zip(ys).map(|(x, y)| x - y).collect();
    let mean_d = mean(&diffs);
    let sd_d = std_dev(&diffs);
    let se = sd_d / (n as f64).sqrt();
    if se == 0.0 {
        return Err(SurveyError::Computation(format!(
            "differences between '{}' and '{}' have zero variance",
            a, b
        )));
    }

    let df = (n - 1) as f64;
    let t = mean_d / se;
    let p_value = t_two_sided_p(t, df)?;
    let margin = t_critical(config.confidence_level, df)? * se;

    Ok(TTestResult {
        a: a.to_string(),
        b: b.to_string(),
        kind: TTestKind::Paired,
        n_a: n,
        n_b: n,
        mean_a: mean(xs),
        mean_b: mean(ys),
        mean_difference: mean_d,
        t,
        df,
        p_value,
        p_adjusted: None,
        ci_low: mean_d - margin,
        ci_high: mean_d + margin,
        cohens_d: mean_d / sd_d,
        significant: p_value < config.alpha,
    })
}

fn independent_test(
    a: &str,
    xs: &[f64],
    b: &str,
    ys: &[f64],
    welch: bool,
    config: &AnalysisConfig,
) -> Result<TTestResult> {
    if xs.len() < 2 || ys.len() < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "t-test of '{}' and '{}' needs at least 2 values per sample, found {} and {}",
            a,
            b,
            xs.len(),
            ys.len()
        )));
    }

    let n1 = xs.len() as f64;
    let n2 = ys.len() as f64;
    let (m1, m2) = (mean(xs), mean(ys));
    let (v1, v2) = (variance(xs), variance(ys));
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0);

    let (se, df) = if welch {
        let (q1, q2) = (v1 / n1, v2 / n2);
        let se2 = q1 + q2;
        let df = se2 * se2 / (q1 * q1 / (n1 - 1.0) + q2 * q2 / (n2 - 1.0));
        (se2.sqrt(), df)
    } else {
        ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), n1 + n2 - 2.0)
    };
    if se == 0.0 || !df.is_finite() {
        return Err(SurveyError::Computation(format!(
            "'{}' and '{}' both have zero variance",
            a, b
        )));
    }

    let diff = m1 - m2;
    let t = diff / se;
    let p_value = t_two_sided_p(t, df)?;
    let margin = t_critical(config.confidence_level, df)? * se;

    Ok(TTestResult {
        a: a.to_string(),
        b: b.to_string(),
        kind: if welch { TTestKind::Welch } else { TTestKind::Student },
        n_a: xs.len(),
        n_b: ys.len(),
        mean_a: m1,
        mean_b: m2,
        mean_difference: diff,
        t,
        df,
        p_value,
        p_adjusted: None,
        ci_low: diff - margin,
        ci_high: diff + margin,
        cohens_d: diff / pooled.sqrt(),
        significant: p_value < config.alpha,
    })
}
