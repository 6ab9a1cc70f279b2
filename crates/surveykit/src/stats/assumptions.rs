//! Normality and homogeneity-of-variance checks.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::design::{Factor, complete_rows, numeric_values};
use super::diagnostic::{ComputationWarning, Diagnostic};
use super::anova::group_f_test;
use super::numeric::{f_upper_p, mean, median, sorted, variance};
use crate::config::{AnalysisConfig, LeveneCenter};
use crate::error::{Result, SurveyError};
use crate::table::Table;

/// Shapiro-Wilk result for the whole sample or one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub n: usize,
    pub w: f64,
    pub p_value: f64,
    pub normal: bool,
}

/// Levene (mean-centered) or Brown-Forsythe (median-centered) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomogeneityTest {
    pub center: LeveneCenter,
    pub statistic: f64,
    pub df1: f64,
    pub df2: f64,
    pub p_value: f64,
    pub equal_variances: bool,
}

/// Output of [`check_assumptions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionReport {
    pub dv: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub normality: Vec<NormalityTest>,
    /// Samples the normality test was not run on, and why.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ComputationWarning>,
    /// Present only when a grouping column was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homogeneity: Option<Diagnostic<HomogeneityTest>>,
}

/// Test `dv` for normality, overall or per level of `group`, and for equal
/// variances across groups.
///
/// Samples whose size falls outside the configured bounds are skipped and
/// listed in `skipped`. A homogeneity test that cannot be computed is
/// reported inside the result rather than returned as an error.
pub fn check_assumptions(
    table: &Table,
    dv: &str,
    group: Option<&str>,
    config: &AnalysisConfig,
) -> Result<AssumptionReport> {
    config.validate()?;
    let mut report = AssumptionReport {
        dv: dv.to_string(),
        group: group.map(str::to_string),
        normality: Vec::new(),
        skipped: Vec::new(),
        homogeneity: None,
    };

    let Some(group) = group else {
        table.require_column(dv)?;
        let values = numeric_values(table, dv)?;
        normality_or_skip(&mut report, None, &values, config);
        return Ok(report);
    };

    table.require_columns(&[dv, group])?;
    let rows = complete_rows(table, &[dv], &[group])?;
    let data = table.take_rows(&rows);
    let values = numeric_values(&data, dv)?;
    let factor = Factor::from_column(&data, group)?;

    let samples: Vec<Vec<f64>> = (0..factor.level_count())
        .map(|level| {
            values
                .iter()
                .zip(&factor.codes)
                .filter(|(_, code)| **code == Some(level))
                .map(|(v, _)| *v)
                .collect()
        })
        .collect();

    for (label, sample) in factor.levels.iter().zip(&samples) {
        normality_or_skip(&mut report, Some(label), sample, config);
    }

    report.homogeneity = Some(match levene(&samples, config.levene_center) {
        Ok((statistic, df1, df2, p_value)) => Diagnostic::ok(HomogeneityTest {
            center: config.levene_center,
            statistic,
            df1,
            df2,
            p_value,
            equal_variances: p_value >= config.alpha,
        }),
        Err(e) => Diagnostic::absent(ComputationWarning::new("homogeneity", e.to_string())),
    });

    Ok(report)
}

fn normality_or_skip(
    report: &mut AssumptionReport,
    group: Option<&String>,
    sample: &[f64],
    config: &AnalysisConfig,
) {
    let n = sample.len();
    let which = match group {
        Some(label) => format!("group '{}'", label),
        None => "sample".to_string(),
    };
    if n < config.normality_min_group || n > config.normality_max_group {
        report.skipped.push(ComputationWarning::new(
            "normality",
            format!(
                "{} has {} values, outside [{}, {}]; normality not tested",
                which, n, config.normality_min_group, config.normality_max_group
            ),
        ));
        return;
    }

    match shapiro_wilk(sample) {
        Ok((w, p_value)) => report.normality.push(NormalityTest {
            group: group.cloned(),
            n,
            w,
            p_value,
            normal: p_value >= config.alpha,
        }),
        Err(e) => report.skipped.push(ComputationWarning::new(
            "normality",
            format!("{}: {}", which, e),
        )),
    }
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| SurveyError::Computation(e.to_string()))
}

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk W and its p-value, using Royston's approximation for
/// 3 <= n <= 5000.
pub(crate) fn shapiro_wilk(sample: &[f64]) -> Result<(f64, f64)> {
    let n = sample.len();
    if !(3..=5000).contains(&n) {
        return Err(SurveyError::InsufficientData(format!(
            "Shapiro-Wilk needs between 3 and 5000 values, got {}",
            n
        )));
    }
    let x = sorted(sample);
    let sxx = variance(&x) * (n - 1) as f64;
    if sxx <= 0.0 {
        return Err(SurveyError::Computation("all values are identical".to_string()));
    }

    let normal = standard_normal()?;
    let nf = n as f64;
    let half = n / 2;

    // Coefficients for the upper half; the lower half mirrors them.
    let mut a = vec![0.0; half];
    if n == 3 {
        a[0] = 0.5f64.sqrt();
    } else {
        let m: Vec<f64> = (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
            .collect();
        let summ2: f64 = m.iter().map(|v| v * v).sum();
        let u = 1.0 / nf.sqrt();
        let (m_n, m_n1) = (m[n - 1], m[n - 2]);

        let a_n = poly(&[0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056], u)
            + m_n / summ2.sqrt();
        a[0] = a_n;
        if n > 5 {
            let a_n1 = poly(&[0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633], u)
                + m_n1 / summ2.sqrt();
            a[1] = a_n1;
            let phi = (summ2 - 2.0 * m_n * m_n - 2.0 * m_n1 * m_n1)
                / (1.0 - 2.0 * a_n * a_n - 2.0 * a_n1 * a_n1);
            for (i, coefficient) in a.iter_mut().enumerate().skip(2) {
                *coefficient = m[n - 1 - i] / phi.sqrt();
            }
        } else {
            let phi = (summ2 - 2.0 * m_n * m_n) / (1.0 - 2.0 * a_n * a_n);
            for (i, coefficient) in a.iter_mut().enumerate().skip(1) {
                *coefficient = m[n - 1 - i] / phi.sqrt();
            }
        }
    }

    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, coefficient)| coefficient * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / sxx).min(1.0);

    if n == 3 {
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return Ok((w, p.clamp(0.0, 1.0)));
    }

    let log_1mw = (1.0 - w).ln();
    let z = if n <= 11 {
        let gamma = poly(&[-2.273, 0.459], nf);
        if log_1mw >= gamma {
            return Ok((w, 0.0));
        }
        let mu = poly(&[0.5440, -0.39978, 0.025054, -0.0006714], nf);
        let sigma = poly(&[1.3822, -0.77857, 0.062767, -0.0020322], nf).exp();
        (-(gamma - log_1mw).ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = poly(&[-1.5861, -0.31082, -0.083751, 0.0038915], ln_n);
        let sigma = poly(&[-0.4803, -0.082676, 0.0030302], ln_n).exp();
        (log_1mw - mu) / sigma
    };

    let p = 1.0 - normal.cdf(z);
    Ok((w, p.clamp(0.0, 1.0)))
}

/// Levene statistic, its degrees of freedom and upper-tail p-value.
pub(crate) fn levene(samples: &[Vec<f64>], center: LeveneCenter) -> Result<(f64, f64, f64, f64)> {
    let k = samples.len();
    if k < 2 {
        return Err(SurveyError::InsufficientData(format!(
            "homogeneity of variance needs at least 2 groups, found {}",
            k
        )));
    }
    if let Some(empty) = samples.iter().position(|s| s.len() < 2) {
        return Err(SurveyError::InsufficientData(format!(
            "homogeneity of variance needs at least 2 values per group; group {} has {}",
            empty + 1,
            samples[empty].len()
        )));
    }

    let deviations: Vec<Vec<f64>> = samples
        .iter()
        .map(|s| {
            let c = match center {
                LeveneCenter::Mean => mean(s),
                LeveneCenter::Median => median(s),
            };
            s.iter().map(|v| (v - c).abs()).collect()
        })
        .collect();

    let (statistic, df1, df2) = group_f_test(&deviations)?;
    Ok((statistic, df1, df2, f_upper_p(statistic, df1, df2)?))
}
