//! Multiple linear regression with optional hierarchical comparison.

use serde::{Deserialize, Serialize};

use super::design::{complete_rows, numeric_values, standardize};
use super::diagnostic::{ComputationWarning, Diagnostic};
use super::linalg::{OlsFit, ols};
use super::numeric::{f_upper_p, mean, std_dev, t_two_sided_p};
use crate::error::{Result, SurveyError};
use crate::table::Table;

/// Model specification for [`run_multiple_regression`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionOptions {
    pub dv: String,
    pub predictors: Vec<String>,
    /// Entered first; when present a covariates-only model is also fitted.
    pub covariates: Vec<String>,
    /// Z-standardize every variable before fitting.
    pub standardize: bool,
}

impl RegressionOptions {
    pub fn new<S: Into<String>>(dv: impl Into<String>, predictors: impl IntoIterator<Item = S>) -> Self {
        Self {
            dv: dv.into(),
            predictors: predictors.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn covariates<S: Into<String>>(mut self, covariates: impl IntoIterator<Item = S>) -> Self {
        self.covariates = covariates.into_iter().map(Into::into).collect();
        self
    }

    pub fn standardized(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    /// Covariates followed by predictors.
    fn terms(&self) -> Vec<&str> {
        self.covariates
            .iter()
            .chain(&self.predictors)
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t: f64,
    pub p_value: f64,
}

/// Summary of one fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    pub formula: String,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f: f64,
    pub f_p_value: f64,
    pub df_model: f64,
    pub df_resid: f64,
    pub n: usize,
}

impl ModelFit {
    pub fn coefficient(&self, term: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.term == term)
    }
}

/// Nested-model test of the predictors over the covariates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalComparison {
    pub r_squared_change: f64,
    pub f_change: f64,
    pub df_num: f64,
    pub df_den: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vif {
    pub term: String,
    pub vif: f64,
}

/// Output of [`run_multiple_regression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub model: ModelFit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covariates_model: Option<ModelFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<HierarchicalComparison>,
    pub vif: Diagnostic<Vec<Vif>>,
}

/// Fit `dv ~ covariates + predictors` by least squares.
///
/// Rows missing any model variable are dropped. Variance inflation factors
/// are computed when there are at least two terms; failure to compute them
/// is reported in `vif` instead of failing the call.
pub fn run_multiple_regression(table: &Table, options: &RegressionOptions) -> Result<RegressionResult> {
    if options.predictors.is_empty() {
        return Err(SurveyError::InvalidArgument(
            "regression needs at least one predictor".to_string(),
        ));
    }
    let terms = options.terms();
    let mut variables = vec![options.dv.as_str()];
    variables.extend(&terms);
    table.require_columns(&variables)?;
    for (i, name) in variables.iter().enumerate() {
        if variables[..i].contains(name) {
            return Err(SurveyError::InvalidArgument(format!(
                "'{}' appears more than once in the model",
                name
            )));
        }
    }

    let rows = complete_rows(table, &variables, &[])?;
    let data = table.take_rows(&rows);
    let mut columns = variables
        .iter()
        .map(|name| numeric_values(&data, name))
        .collect::<Result<Vec<_>>>()?;
    if options.standardize {
        for (name, values) in variables.iter().zip(columns.iter_mut()) {
            let sd = std_dev(values);
            if sd == 0.0 || !sd.is_finite() {
                return Err(SurveyError::Computation(format!(
                    "'{}' has no variance and cannot be standardized",
                    name
                )));
            }
            *values = standardize(values);
        }
    }

    let y = columns.remove(0);
    let model = fit_model(&options.dv, &terms, &columns, &y)?;

    let (covariates_model, comparison) = if options.covariates.is_empty() {
        (None, None)
    } else {
        let k = options.covariates.len();
        let reduced = fit_model(&options.dv, &terms[..k], &columns[..k], &y)?;
        let comparison = compare(&reduced, &model)?;
        (Some(reduced), Some(comparison))
    };

    let vif = if terms.len() >= 2 && y.len() > terms.len() + 1 {
        variance_inflation(&terms, &columns)
    } else {
        Diagnostic::skipped()
    };

    Ok(RegressionResult {
        model,
        covariates_model,
        comparison,
        vif,
    })
}

fn with_intercept(columns: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    let mut design = Vec::with_capacity(columns.len() + 1);
    design.push(vec![1.0; n]);
    design.extend(columns.iter().cloned());
    design
}

fn r_squared(fit: &OlsFit, y: &[f64]) -> Result<f64> {
    let m = mean(y);
    let tss: f64 = y.iter().map(|v| (v - m).powi(2)).sum();
    if tss == 0.0 {
        return Err(SurveyError::Computation(
            "dependent variable has no variance".to_string(),
        ));
    }
    Ok(1.0 - fit.rss / tss)
}

fn fit_model(dv: &str, terms: &[&str], columns: &[Vec<f64>], y: &[f64]) -> Result<ModelFit> {
    let n = y.len();
    let p = terms.len();
    if n <= p + 1 {
        return Err(SurveyError::InsufficientData(format!(
            "{} complete rows cannot fit {} terms plus an intercept with residual degrees of freedom",
            n, p
        )));
    }

    let fit = ols(&with_intercept(columns, n), y)?;
    let r2 = r_squared(&fit, y)?;
    let df_resid = fit.df_resid();
    let df_model = p as f64;

    let names = std::iter::once("Intercept").chain(terms.iter().copied());
    let coefficients = names
        .zip(fit.coefficients.iter().zip(fit.standard_errors()))
        .map(|(term, (&estimate, std_error))| {
            let t = estimate / std_error;
            Ok(Coefficient {
                term: term.to_string(),
                estimate,
                std_error,
                t,
                p_value: t_two_sided_p(t, df_resid)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (f, f_p_value) = if p == 0 {
        (f64::NAN, f64::NAN)
    } else {
        let f = (r2 / df_model) / ((1.0 - r2) / df_resid);
        (f, f_upper_p(f, df_model, df_resid)?)
    };

    let rhs = if terms.is_empty() { "1".to_string() } else { terms.join(" + ") };
    log::debug!("regression fit: {} ~ {} on {} rows, R2={}", dv, rhs, n, r2);

    Ok(ModelFit {
        formula: format!("{} ~ {}", dv, rhs),
        coefficients,
        r_squared: r2,
        adj_r_squared: 1.0 - (1.0 - r2) * (n as f64 - 1.0) / df_resid,
        f,
        f_p_value,
        df_model,
        df_resid,
        n,
    })
}

fn compare(reduced: &ModelFit, full: &ModelFit) -> Result<HierarchicalComparison> {
    let change = full.r_squared - reduced.r_squared;
    let df_num = full.df_model - reduced.df_model;
    let df_den = full.df_resid;
    let f_change = (change / df_num) / ((1.0 - full.r_squared) / df_den);
    Ok(HierarchicalComparison {
        r_squared_change: change,
        f_change,
        df_num,
        df_den,
        p_value: f_upper_p(f_change.max(0.0), df_num, df_den)?,
    })
}

fn variance_inflation(terms: &[&str], columns: &[Vec<f64>]) -> Diagnostic<Vec<Vif>> {
    let n = columns[0].len();
    let mut out = Vec::with_capacity(terms.len());
    for (j, term) in terms.iter().enumerate() {
        let others: Vec<Vec<f64>> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != j)
            .map(|(_, c)| c.clone())
            .collect();
        let target = &columns[j];

        let r2 = match ols(&with_intercept(&others, n), target).and_then(|fit| r_squared(&fit, target)) {
            Ok(r2) => r2,
            Err(e) => {
                return Diagnostic::absent(ComputationWarning::new(
                    "vif",
                    format!("could not compute VIF for '{}': {}", term, e),
                ));
            }
        };
        if r2 >= 1.0 - 1e-12 {
            return Diagnostic::absent(ComputationWarning::new(
                "vif",
                format!("'{}' is perfectly explained by the other terms", term),
            ));
        }
        out.push(Vif {
            term: term.to_string(),
            vif: 1.0 / (1.0 - r2),
        });
    }
    Diagnostic::ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn column(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_simple_regression() {
        let table = Table::from_columns([
            ("x", column(&[1.0, 2.0, 3.0, 4.0, 5.0])),
            ("y", column(&[2.0, 4.0, 5.0, 4.0, 5.0])),
        ])
        .unwrap();
        let result = run_multiple_regression(&table, &RegressionOptions::new("y", ["x"])).unwrap();
        let model = &result.model;

        assert_eq!(model.formula, "y ~ x");
        assert!(close(model.r_squared, 0.6, 1e-10));
        assert!(close(model.adj_r_squared, 1.0 - 0.4 * 4.0 / 3.0, 1e-10));
        assert!(close(model.f, 4.5, 1e-9));
        assert!(close(model.coefficient("x").unwrap().estimate, 0.6, 1e-10));
        assert!(close(model.coefficient("Intercept").unwrap().estimate, 2.2, 1e-10));
        assert_eq!(model.n, 5);
        assert!(!result.vif.is_present());
        assert!(result.vif.warnings.is_empty());
        assert!(result.comparison.is_none());
    }

    fn two_predictor_table() -> Table {
        Table::from_columns([
            ("x1", column(&[-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0])),
            ("x2", column(&[-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0])),
            ("y", column(&[1.0, 3.0, 2.0, 5.0, 2.0, 3.0, 4.0, 6.0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_orthogonal_predictors_have_unit_vif() {
        let options = RegressionOptions::new("y", ["x1", "x2"]);
        let result = run_multiple_regression(&two_predictor_table(), &options).unwrap();
        let vif = result.vif.value.unwrap();
        assert_eq!(vif.len(), 2);
        assert!(vif.iter().all(|v| close(v.vif, 1.0, 1e-10)));
    }

    #[test]
    fn test_hierarchical_comparison() {
        let options = RegressionOptions::new("y", ["x2"]).covariates(["x1"]);
        let result = run_multiple_regression(&two_predictor_table(), &options).unwrap();

        let reduced = result.covariates_model.as_ref().unwrap();
        let comparison = result.comparison.as_ref().unwrap();
        assert_eq!(reduced.formula, "y ~ x1");
        assert_eq!(result.model.formula, "y ~ x1 + x2");
        assert!(close(
            comparison.r_squared_change,
            result.model.r_squared - reduced.r_squared,
            1e-12
        ));
        assert!(comparison.r_squared_change > 0.0);
        assert_eq!(comparison.df_num, 1.0);
        assert_eq!(comparison.df_den, 5.0);
    }

    #[test]
    fn test_standardized_slope_is_correlation() {
        let table = Table::from_columns([
            ("x", column(&[1.0, 2.0, 3.0, 4.0, 5.0])),
            ("y", column(&[2.0, 4.0, 5.0, 4.0, 5.0])),
        ])
        .unwrap();
        let options = RegressionOptions::new("y", ["x"]).standardized(true);
        let model = run_multiple_regression(&table, &options).unwrap().model;
        assert!(close(model.coefficient("x").unwrap().estimate, 0.6f64.sqrt(), 1e-10));
        assert!(close(model.coefficient("Intercept").unwrap().estimate, 0.0, 1e-10));
    }

    #[test]
    fn test_listwise_deletion_and_errors() {
        let table = Table::from_columns([
            ("x", vec![1.into(), 2.into(), Value::Missing, 4.into(), 5.into()]),
            ("y", vec![1.into(), 3.into(), 2.into(), 4.into(), 6.into()]),
        ])
        .unwrap();
        let result = run_multiple_regression(&table, &RegressionOptions::new("y", ["x"])).unwrap();
        assert_eq!(result.model.n, 4);

        assert!(matches!(
            run_multiple_regression(&table, &RegressionOptions::new("y", ["z"])),
            Err(SurveyError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            run_multiple_regression(&table, &RegressionOptions::new("y", Vec::<String>::new())),
            Err(SurveyError::InvalidArgument(_))
        ));
        assert!(matches!(
            run_multiple_regression(&table, &RegressionOptions::new("y", ["y"])),
            Err(SurveyError::InvalidArgument(_))
        ));
    }
}
