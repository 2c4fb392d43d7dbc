//! Per-member constant bias correction.

use crate::core::EnsembleMatrix;
use crate::correction::traits::{BiasCorrector, Fittable};
use crate::error::{DressingError, Result};
use crate::utils::stats::{maximum_likelihood_bias, maximum_likelihood_std};

/// Assignment of ensemble members to groups sharing one correction.
///
/// Grouped correction is not supported yet; correctors reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    /// Group label of each member, indexed by column.
    pub labels: Vec<usize>,
}

/// Removes the maximum-likelihood constant offset of each ensemble member.
///
/// Under an i.i.d. Gaussian error model the ML estimate of a constant offset
/// is the sample mean of the member's errors `X[:, j] - y`. `fit` also keeps
/// the per-member error standard deviation, which `predict` does not use.
///
/// # Example
/// ```
/// use ensemble_dressing::core::EnsembleMatrix;
/// use ensemble_dressing::correction::{Fittable, SimpleBiasCorrector};
///
/// let x = EnsembleMatrix::from_rows(vec![vec![2.0, 0.0], vec![3.0, 1.0]]).unwrap();
/// let y = [1.0, 2.0];
///
/// let mut corrector = SimpleBiasCorrector::new(2).unwrap();
/// corrector.fit(&x, &y).unwrap();
///
/// let corrected = corrector.predict(&x).unwrap();
/// assert_eq!(corrected.row(0), &[1.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleBiasCorrector {
    member_count: usize,
    intercept_per_model: Vec<f64>,
    deviation_per_model: Vec<f64>,
    is_fitted: bool,
}

impl SimpleBiasCorrector {
    /// Create an unfitted corrector for `member_count` members.
    pub fn new(member_count: usize) -> Result<Self> {
        if member_count == 0 {
            return Err(DressingError::InvalidParameter(
                "member_count must be positive".to_string(),
            ));
        }
        Ok(Self {
            member_count,
            intercept_per_model: vec![0.0; member_count],
            deviation_per_model: vec![0.0; member_count],
            is_fitted: false,
        })
    }

    /// Create a corrector that shares corrections within member groups.
    ///
    /// Always fails: grouped correction is not implemented.
    pub fn with_grouping(member_count: usize, grouping: Grouping) -> Result<Self> {
        if grouping.labels.len() != member_count {
            return Err(DressingError::DimensionMismatch {
                expected: member_count,
                got: grouping.labels.len(),
            });
        }
        Err(DressingError::InvalidParameter(
            "grouped bias correction is not supported".to_string(),
        ))
    }

    /// ML standard deviation of each member's errors from the last fit.
    pub fn deviations(&self) -> &[f64] {
        &self.deviation_per_model
    }
}

impl Fittable for SimpleBiasCorrector {
    type Output = EnsembleMatrix;

    fn fit(&mut self, x: &EnsembleMatrix, y: &[f64]) -> Result<()> {
        self.validate_members(x)?;
        let intercepts = maximum_likelihood_bias(x, y)?;
        let deviations = maximum_likelihood_std(x, y)?;

        log::debug!(
            "fit {} on {} cases: intercepts={:?}",
            self.name(),
            x.n_samples(),
            intercepts
        );

        self.intercept_per_model = intercepts;
        self.deviation_per_model = deviations;
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &EnsembleMatrix) -> Result<EnsembleMatrix> {
        self.validate_members(x)?;
        Ok(x.map_members(|j, v| v - self.intercept_per_model[j]))
    }

    fn member_count(&self) -> usize {
        self.member_count
    }

    fn name(&self) -> &str {
        "SimpleBiasCorrector"
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

impl BiasCorrector for SimpleBiasCorrector {
    fn intercepts(&self) -> &[f64] {
        &self.intercept_per_model
    }
}
