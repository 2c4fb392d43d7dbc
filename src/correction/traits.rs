//! Traits shared by every model fitted on an ensemble matrix.

use crate::core::EnsembleMatrix;
use crate::error::{DressingError, Result};

/// Common interface for models fitted on `(X, y)` pairs.
///
/// `X` holds one column per ensemble member and `y` the observed outcome of
/// each case. `fit` is the only state transition: it overwrites previous
/// parameters wholesale and leaves them untouched when validation fails.
pub trait Fittable {
    /// What `predict` produces for a matrix of new cases.
    type Output;

    /// Estimate the model parameters from training data.
    fn fit(&mut self, x: &EnsembleMatrix, y: &[f64]) -> Result<()>;

    /// Apply the model to new cases.
    ///
    /// Unfitted models use their initial parameters instead of failing.
    fn predict(&self, x: &EnsembleMatrix) -> Result<Self::Output>;

    /// Number of ensemble members the model was built for.
    fn member_count(&self) -> usize;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;

    /// Fail with [`DressingError::FitRequired`] for unfitted models.
    fn require_fitted(&self) -> Result<()> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(DressingError::FitRequired)
        }
    }

    /// Check that `x` has one column per member.
    fn validate_members(&self, x: &EnsembleMatrix) -> Result<()> {
        if x.n_members() != self.member_count() {
            return Err(DressingError::DimensionMismatch {
                expected: self.member_count(),
                got: x.n_members(),
            });
        }
        Ok(())
    }
}

/// A model removing a per-member additive bias from ensemble predictions.
pub trait BiasCorrector: Fittable<Output = EnsembleMatrix> {
    /// Estimated bias of each member, subtracted by `predict`.
    fn intercepts(&self) -> &[f64];
}

/// Type alias for boxed bias correctors.
pub type BoxedBiasCorrector = Box<dyn BiasCorrector>;
