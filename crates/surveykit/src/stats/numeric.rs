//! Shared numeric helpers and distribution lookups.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use statrs::statistics::{Data, Median, Statistics};

use crate::config::PAdjust;
use crate::error::{Result, SurveyError};

pub(crate) fn mean(xs: &[f64]) -> f64 {
    xs.iter().mean()
}

/// Sample variance (n - 1 denominator). NaN below two observations.
pub(crate) fn variance(xs: &[f64]) -> f64 {
    xs.iter().variance()
}

pub(crate) fn std_dev(xs: &[f64]) -> f64 {
    xs.iter().std_dev()
}

pub(crate) fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut out = xs.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

pub(crate) fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    Data::new(xs.to_vec()).median()
}

/// Pearson correlation. NaN when either side has no variance.
pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() {
        return f64::NAN;
    }
    xs.iter().covariance(ys.iter()) / (std_dev(xs) * std_dev(ys))
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| SurveyError::Computation(format!("t distribution with df={}: {}", df, e)))
}

/// Two-sided p-value for a t statistic.
pub(crate) fn t_two_sided_p(t: f64, df: f64) -> Result<f64> {
    if t.is_nan() {
        return Err(SurveyError::Computation("t statistic is undefined".to_string()));
    }
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = students_t(df)?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Critical t value for a two-sided interval at `confidence`.
pub(crate) fn t_critical(confidence: f64, df: f64) -> Result<f64> {
    let dist = students_t(df)?;
    Ok(dist.inverse_cdf(1.0 - (1.0 - confidence) / 2.0))
}

/// Upper-tail p-value for an F statistic.
pub(crate) fn f_upper_p(f: f64, df1: f64, df2: f64) -> Result<f64> {
    if f.is_nan() {
        return Err(SurveyError::Computation("F statistic is undefined".to_string()));
    }
    if f.is_infinite() {
        return Ok(0.0);
    }
    if f <= 0.0 {
        return Ok(1.0);
    }
    let dist = FisherSnedecor::new(df1, df2).map_err(|e| {
        SurveyError::Computation(format!("F distribution with df=({}, {}): {}", df1, df2, e))
    })?;
    Ok((1.0 - dist.cdf(f)).clamp(0.0, 1.0))
}

/// Adjust a family of p-values for multiple comparisons.
pub(crate) fn adjust_p_values(p_values: &[f64], method: PAdjust) -> Vec<f64> {
    let m = p_values.len() as f64;
    match method {
        PAdjust::None => p_values.to_vec(),
        PAdjust::Bonferroni => p_values.iter().map(|p| (p * m).min(1.0)).collect(),
        PAdjust::Holm => {
            let mut order: Vec<usize> = (0..p_values.len()).collect();
            order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

            let mut adjusted = vec![0.0; p_values.len()];
            let mut running = 0.0f64;
            for (rank, &idx) in order.iter().enumerate() {
                let candidate = ((m - rank as f64) * p_values[idx]).min(1.0);
                running = running.max(candidate);
                adjusted[idx] = running;
            }
            adjusted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_moments() {
        let xs = [10.0, 12.0, 14.0, 16.0, 18.0];
        assert_eq!(mean(&xs), 14.0);
        assert_eq!(variance(&xs), 10.0);
        assert_eq!(median(&xs), 14.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert!(variance(&[1.0]).is_nan());
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_t_p_value_symmetry() {
        let p1 = t_two_sided_p(2.0, 10.0).unwrap();
        let p2 = t_two_sided_p(-2.0, 10.0).unwrap();
        assert!((p1 - p2).abs() < 1e-12);
        assert!(p1 > 0.05 && p1 < 0.1);
        assert!((t_two_sided_p(0.0, 5.0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_t_critical_large_df_near_normal() {
        let t = t_critical(0.95, 10_000.0).unwrap();
        assert!((t - 1.9602).abs() < 1e-3);
    }

    #[test]
    fn test_f_p_value() {
        // F(2, 6) = 12 is significant at the 1% level.
        let p = f_upper_p(12.0, 2.0, 6.0).unwrap();
        assert!(p > 0.005 && p < 0.01);
        assert_eq!(f_upper_p(0.0, 2.0, 6.0).unwrap(), 1.0);
    }

    #[test]
    fn test_p_adjust() {
        let ps = [0.01, 0.04, 0.03];
        let bonf = adjust_p_values(&ps, PAdjust::Bonferroni);
        assert!((bonf[0] - 0.03).abs() < 1e-12);
        assert!((bonf[1] - 0.12).abs() < 1e-12);

        let holm = adjust_p_values(&ps, PAdjust::Holm);
        assert!((holm[0] - 0.03).abs() < 1e-12);
        assert!((holm[2] - 0.06).abs() < 1e-12);
        assert!((holm[1] - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((r - 1.0).abs() < 1e-12);
    }
}
