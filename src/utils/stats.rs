//! Statistical utility functions.
//!
//! The maximum-likelihood primitives here are shared by the bias corrector
//! and the mixture model. Bias (mean error) and scale (error standard
//! deviation) are estimated by separate functions so callers can combine
//! them independently.

use crate::core::EnsembleMatrix;
use crate::error::{DressingError, Result};

/// Approximate quantile function for standard normal distribution.
///
/// Uses the Abramowitz and Stegun approximation (formula 26.2.23).
///
/// # Arguments
/// * `p` - Probability value (0.0 to 1.0)
///
/// # Returns
/// The z-score corresponding to the given probability.
///
/// # Example
/// ```
/// use ensemble_dressing::utils::quantile_normal;
///
/// // 95% confidence level -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let t = if p < 0.5 {
        (-2.0 * p.ln()).sqrt()
    } else {
        (-2.0 * (1.0 - p).ln()).sqrt()
    };

    // Abramowitz and Stegun coefficients
    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;
    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let result = t - (c0 + c1 * t + c2 * t * t) / (1.0 + d1 * t + d2 * t * t + d3 * t * t * t);

    if p < 0.5 {
        -result
    } else {
        result
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (n denominator), the ML estimate under a
/// Gaussian model.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    (sum_sq / values.len() as f64).sqrt()
}

fn check_targets(n_samples: usize, y: &[f64]) -> Result<()> {
    if n_samples != y.len() {
        return Err(DressingError::ShapeMismatch {
            expected: n_samples,
            got: y.len(),
        });
    }
    if y.is_empty() {
        return Err(DressingError::EmptyData);
    }
    Ok(())
}

/// Errors of every member against the observed targets: `E[i, j] = X[i, j] - y[i]`.
pub fn error_matrix(x: &EnsembleMatrix, y: &[f64]) -> Result<EnsembleMatrix> {
    check_targets(x.n_samples(), y)?;
    let data = x
        .rows()
        .zip(y)
        .flat_map(|(row, &target)| row.iter().map(move |v| v - target))
        .collect();
    EnsembleMatrix::from_row_major(x.n_samples(), x.n_members(), data)
}

/// Per-member maximum-likelihood bias: the mean error of each column.
pub fn maximum_likelihood_bias(x: &EnsembleMatrix, y: &[f64]) -> Result<Vec<f64>> {
    Ok(error_matrix(x, y)?.column_means())
}

/// Per-member maximum-likelihood standard deviation of the errors.
pub fn maximum_likelihood_std(x: &EnsembleMatrix, y: &[f64]) -> Result<Vec<f64>> {
    let errors = error_matrix(x, y)?;
    Ok((0..errors.n_members())
        .map(|j| population_std_dev(&errors.column_vec(j)))
        .collect())
}

/// Maximum-likelihood bias of a single member's predictions.
pub fn member_bias(predictions: &[f64], y: &[f64]) -> Result<f64> {
    check_targets(predictions.len(), y)?;
    let errors: Vec<f64> = predictions.iter().zip(y).map(|(p, t)| p - t).collect();
    Ok(mean(&errors))
}

/// Maximum-likelihood error standard deviation of a single member's predictions.
pub fn member_std(predictions: &[f64], y: &[f64]) -> Result<f64> {
    check_targets(predictions.len(), y)?;
    let errors: Vec<f64> = predictions.iter().zip(y).map(|(p, t)| p - t).collect();
    Ok(population_std_dev(&errors))
}
