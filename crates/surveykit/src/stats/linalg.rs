//! Ordinary least squares on small dense design matrices.

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SurveyError};

/// Singular values below this fraction of the largest count as zero.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// A fitted least-squares model.
#[derive(Debug, Clone)]
pub(crate) struct OlsFit {
    pub coefficients: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// `(X'X)^-1`, for coefficient standard errors.
    pub xtx_inv: DMatrix<f64>,
    pub n: usize,
}

impl OlsFit {
    /// Residual degrees of freedom.
    pub fn df_resid(&self) -> f64 {
        self.n as f64 - self.coefficients.len() as f64
    }

    /// Standard errors of the coefficients.
    pub fn standard_errors(&self) -> Vec<f64> {
        let sigma2 = self.rss / self.df_resid();
        self.xtx_inv
            .diagonal()
            .iter()
            .map(|v| (sigma2 * v).sqrt())
            .collect()
    }
}

/// Fit `y ~ columns` by singular value decomposition of the design.
///
/// `columns` holds one vector per regressor (include a column of ones for an
/// intercept). Fails when the design is rank deficient.
pub(crate) fn ols(columns: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    let k = columns.len();
    let n = y.len();
    if k == 0 {
        return Err(SurveyError::Computation("model has no terms".to_string()));
    }
    if columns.iter().any(|c| c.len() != n) {
        return Err(SurveyError::Computation(
            "design columns and response differ in length".to_string(),
        ));
    }
    if n < k {
        return Err(SurveyError::InsufficientData(format!(
            "{} observations cannot fit {} parameters",
            n, k
        )));
    }

    let x = DMatrix::from_fn(n, k, |row, col| columns[col][row]);
    let response = DVector::from_column_slice(y);

    let svd = x.clone().svd(true, true);
    let largest = svd.singular_values.max();
    if largest == 0.0 || !largest.is_finite() {
        return Err(SurveyError::Computation("design matrix is singular".to_string()));
    }
    let eps = SINGULAR_TOLERANCE * largest;
    if svd.rank(eps) < k {
        return Err(SurveyError::Computation(
            "design matrix is singular (collinear terms or empty cells)".to_string(),
        ));
    }

    let beta = svd
        .solve(&response, eps)
        .map_err(|e| SurveyError::Computation(format!("least squares failed: {}", e)))?;
    let xtx_inv = x
        .tr_mul(&x)
        .try_inverse()
        .ok_or_else(|| SurveyError::Computation("X'X is not invertible".to_string()))?;
    let rss = (&response - &x * &beta).norm_squared();

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        rss,
        xtx_inv,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_regression() {
        let ones = vec![1.0; 5];
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 5.0, 4.0, 5.0];

        let fit = ols(&[ones, x], &y).unwrap();
        assert!((fit.coefficients[0] - 2.2).abs() < 1e-10);
        assert!((fit.coefficients[1] - 0.6).abs() < 1e-10);
        assert!((fit.rss - 2.4).abs() < 1e-10);
        assert_eq!(fit.df_resid(), 3.0);
    }

    #[test]
    fn test_standard_errors() {
        let ones = vec![1.0; 5];
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 5.0, 4.0, 5.0];

        // sigma^2 = 2.4 / 3 = 0.8 and Sxx = 10.
        let se = ols(&[ones, x], &y).unwrap().standard_errors();
        assert!((se[1] - (0.8f64 / 10.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_collinear_design_is_singular() {
        let ones = vec![1.0; 4];
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let x2: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let y = vec![1.0, 2.0, 3.0, 5.0];
        assert!(matches!(
            ols(&[ones, x, x2], &y),
            Err(SurveyError::Computation(_))
        ));
    }

    #[test]
    fn test_too_few_observations() {
        let ones = vec![1.0; 2];
        let x = vec![1.0, 2.0];
        let z = vec![3.0, 1.0];
        assert!(matches!(
            ols(&[ones, x, z], &[1.0, 2.0]),
            Err(SurveyError::InsufficientData(_))
        ));
    }
}
