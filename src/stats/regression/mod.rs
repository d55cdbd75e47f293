//! Regression analysis module

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordinary least squares fit of `y = intercept + slope · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRegression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination (R²)
    pub r_squared: f64,
    /// Fitted values of the pairs used in the fit
    pub fitted_values: Vec<f64>,
    /// Residuals of the pairs used in the fit
    pub residuals: Vec<f64>,
    /// Number of pairs left after dropping those with a NaN
    pub n_used: usize,
}

impl SimpleRegression {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Perform simple linear regression of `y` on `x`
///
/// Pairs where either value is NaN are dropped. When every `y` is equal the
/// fit is exact and R² is 1.
///
/// # Errors
/// * `LengthMismatch` if the inputs differ in length
/// * `InsufficientData` if fewer than two complete pairs remain
/// * `Domain` if all remaining `x` are equal
pub fn simple_linear_regression(x: &[f64], y: &[f64]) -> Result<SimpleRegression> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();

    let n = xs.len();
    if n < 2 {
        return Err(Error::InsufficientData(format!(
            "Regression requires at least 2 complete pairs, got {}",
            n
        )));
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in xs.iter().zip(&ys) {
        sxx += (xi - mean_x).powi(2);
        sxy += (xi - mean_x) * (yi - mean_y);
    }

    if sxx == 0.0 {
        return Err(Error::Domain(
            "Predictor has zero variance; slope is undefined".into(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let fitted_values: Vec<f64> = xs.iter().map(|&xi| intercept + slope * xi).collect();
    let residuals: Vec<f64> = ys
        .iter()
        .zip(&fitted_values)
        .map(|(yi, fi)| yi - fi)
        .collect();

    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = ys.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

    Ok(SimpleRegression {
        slope,
        intercept,
        r_squared,
        fitted_values,
        residuals,
        n_used: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_regression() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.1, 4.05, 5.9, 8.1, 9.95];

        let result = simple_linear_regression(&x, &y).unwrap();

        // y ≈ 2x, so intercept should be close to 0 and slope close to 2
        assert!((result.intercept - 0.095).abs() < 1e-9);
        assert!((result.slope - 1.975).abs() < 1e-9);
        assert!(result.r_squared > 0.99);
        assert_eq!(result.residuals.len(), 5);
    }

    #[test]
    fn test_nan_pairs_dropped() {
        let x = vec![1.0, f64::NAN, 2.0, 3.0];
        let y = vec![3.0, 100.0, 5.0, f64::NAN];

        let result = simple_linear_regression(&x, &y).unwrap();
        assert_eq!(result.n_used, 2);
        assert!((result.slope - 2.0).abs() < 1e-12);
        assert!((result.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            simple_linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(Error::Domain(_))
        ));
        assert!(matches!(
            simple_linear_regression(&[1.0], &[1.0]),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            simple_linear_regression(&[1.0, 2.0], &[1.0]),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_constant_response_is_exact_fit() {
        let result = simple_linear_regression(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_eq!(result.slope, 0.0);
        assert_eq!(result.r_squared, 1.0);
    }
}
