//! Gaussian mixture dressing of ensemble forecasts.
//!
//! Each ensemble member is "dressed" with a normal distribution of the fitted
//! scale. The predictive distribution of a case is the weighted mixture of
//! those normals. Where each normal is centered is set by [`Centering`].

use crate::core::EnsembleMatrix;
use crate::correction::Fittable;
use crate::error::{DressingError, Result};
use crate::mixture::member::{BaseDistribution, MixtureMember};
use crate::utils::percentile::{percentiles, PercentileConfig};
use crate::utils::stats::{member_bias, member_std, quantile_normal};

/// How `fit` estimates member bias and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitStrategy {
    /// Estimate one bias and scale from the first member and share them
    /// across all members ("simple dressing").
    #[default]
    FirstMember,
    /// Estimate bias and scale independently for every member.
    PerMember,
}

/// Where each member's normal is centered when evaluating the mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Centering {
    /// Evaluate `member.cdf(x, mean - bias)`. The member shifts its argument
    /// by the same bias, so the normal sits on the raw member forecast and
    /// only the fitted scale changes the distribution.
    #[default]
    RawForecast,
    /// Center every normal on the bias-corrected forecast `mean - bias`, the
    /// same location [`GaussianMixtureModel::mean`] averages.
    CorrectedForecast,
}

/// Configuration for a [`GaussianMixtureModel`].
#[derive(Debug, Clone, Default)]
pub struct MixtureConfig {
    /// Parameter estimation strategy.
    pub fit_strategy: FitStrategy,
    /// Location of each member's normal.
    pub centering: Centering,
    /// Tolerance and iteration cap for percentile search.
    ///
    /// The initial guess and step are derived from the mixture itself.
    pub percentile: PercentileConfig,
}

impl MixtureConfig {
    /// Set the fit strategy.
    pub fn with_fit_strategy(mut self, strategy: FitStrategy) -> Self {
        self.fit_strategy = strategy;
        self
    }

    /// Set where member normals are centered.
    pub fn with_centering(mut self, centering: Centering) -> Self {
        self.centering = centering;
        self
    }

    /// Set the percentile search configuration.
    pub fn with_percentile(mut self, percentile: PercentileConfig) -> Self {
        self.percentile = percentile;
        self
    }
}

/// Univariate Gaussian mixture with one component per ensemble member.
///
/// Weights are uniform. Before `fit` every member has unit scale and no bias.
///
/// # Example
/// ```
/// use ensemble_dressing::core::EnsembleMatrix;
/// use ensemble_dressing::correction::Fittable;
/// use ensemble_dressing::mixture::GaussianMixtureModel;
///
/// let x = EnsembleMatrix::from_rows(vec![
///     vec![11.0, 10.5],
///     vec![13.5, 12.0],
///     vec![15.5, 15.0],
/// ])
/// .unwrap();
/// let y = [10.0, 12.0, 15.0];
///
/// let mut model = GaussianMixtureModel::new(2).unwrap();
/// model.fit(&x, &y).unwrap();
///
/// let p = model.cdf(12.0, &[13.0, 12.5]).unwrap();
/// assert!(p > 0.0 && p < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct GaussianMixtureModel {
    members: Vec<MixtureMember>,
    weights: Vec<f64>,
    config: MixtureConfig,
    is_fitted: bool,
}

impl GaussianMixtureModel {
    /// Create an unfitted mixture of `member_count` standard normal members.
    pub fn new(member_count: usize) -> Result<Self> {
        Self::with_config(member_count, MixtureConfig::default())
    }

    /// Create an unfitted mixture with explicit configuration.
    pub fn with_config(member_count: usize, config: MixtureConfig) -> Result<Self> {
        if member_count == 0 {
            return Err(DressingError::InvalidParameter(
                "member_count must be positive".to_string(),
            ));
        }
        // One freshly constructed member per index.
        let members = (0..member_count)
            .map(|_| MixtureMember::new(BaseDistribution::Normal))
            .collect();
        Ok(Self {
            members,
            weights: vec![1.0 / member_count as f64; member_count],
            config,
            is_fitted: false,
        })
    }

    /// Mixture components, one per member.
    pub fn members(&self) -> &[MixtureMember] {
        &self.members
    }

    /// Mutable access to the components. The member count cannot change.
    pub fn members_mut(&mut self) -> &mut [MixtureMember] {
        &mut self.members
    }

    /// Mixture weights; they sum to one.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn config(&self) -> &MixtureConfig {
        &self.config
    }

    fn check_means(&self, member_means: &[f64]) -> Result<()> {
        if member_means.len() != self.members.len() {
            return Err(DressingError::DimensionMismatch {
                expected: self.members.len(),
                got: member_means.len(),
            });
        }
        Ok(())
    }

    fn weighted_sum<F>(&self, member_means: &[f64], f: F) -> f64
    where
        F: Fn(&MixtureMember, f64) -> f64,
    {
        self.members
            .iter()
            .zip(member_means)
            .zip(&self.weights)
            .map(|((member, &mean), weight)| f(member, mean) * weight)
            .sum()
    }

    fn member_cdf(&self, member: &MixtureMember, x: f64, mean: f64) -> f64 {
        match self.config.centering {
            Centering::RawForecast => member.cdf(x, mean - member.bias()),
            Centering::CorrectedForecast => member.dressed_cdf(x, mean),
        }
    }

    fn member_pdf(&self, member: &MixtureMember, x: f64, mean: f64) -> f64 {
        match self.config.centering {
            Centering::RawForecast => member.pdf(x, mean - member.bias()),
            Centering::CorrectedForecast => member.dressed_pdf(x, mean),
        }
    }

    fn mixture_cdf(&self, x: f64, member_means: &[f64]) -> f64 {
        self.weighted_sum(member_means, |member, mean| self.member_cdf(member, x, mean))
    }

    /// Probability that the outcome is at most `x`.
    ///
    /// `member_means` holds every member's raw forecast for the case.
    pub fn cdf(&self, x: f64, member_means: &[f64]) -> Result<f64> {
        self.check_means(member_means)?;
        Ok(self.mixture_cdf(x, member_means))
    }

    /// Density of the outcome at `x`.
    pub fn pdf(&self, x: f64, member_means: &[f64]) -> Result<f64> {
        self.check_means(member_means)?;
        Ok(self.weighted_sum(member_means, |member, mean| {
            self.member_pdf(member, x, mean)
        }))
    }

    /// Point forecast: weighted mean of the bias-corrected member forecasts.
    pub fn mean(&self, member_means: &[f64]) -> Result<f64> {
        self.check_means(member_means)?;
        Ok(self.weighted_sum(member_means, |member, mean| {
            member.corrected_mean(mean)
        }))
    }

    /// The mixture CDF evaluated at every threshold, ready for CRPS scoring.
    pub fn discretized_cdf(&self, thresholds: &[f64], member_means: &[f64]) -> Result<Vec<f64>> {
        self.check_means(member_means)?;
        Ok(thresholds
            .iter()
            .map(|&t| self.mixture_cdf(t, member_means))
            .collect())
    }

    /// Discretized CDFs for every case of `x`.
    pub fn discretized_cdfs(&self, thresholds: &[f64], x: &EnsembleMatrix) -> Result<Vec<Vec<f64>>> {
        self.validate_members(x)?;
        x.rows()
            .map(|row| self.discretized_cdf(thresholds, row))
            .collect()
    }

    /// Outcome values at which the mixture CDF reaches each probability.
    ///
    /// Probabilities must lie strictly inside (0, 1).
    pub fn percentiles(&self, probabilities: &[f64], member_means: &[f64]) -> Result<Vec<f64>> {
        let center = match self.config.centering {
            Centering::RawForecast => {
                self.check_means(member_means)?;
                self.weighted_sum(member_means, |_, mean| mean)
            }
            Centering::CorrectedForecast => self.mean(member_means)?,
        };
        let spread = self
            .members
            .iter()
            .map(|m| m.scale())
            .filter(|s| s.is_finite() && *s > 0.0)
            .fold(0.0, f64::max);
        let step = if spread > 0.0 { spread } else { 1.0 };
        // Start near where a single normal would put the first percentile.
        let guess = probabilities
            .first()
            .map(|&p| center + step * quantile_normal(p))
            .filter(|g| g.is_finite())
            .unwrap_or(center);

        let search = self
            .config
            .percentile
            .clone()
            .with_initial_guess(guess)
            .with_initial_step(step);

        percentiles(
            |x| self.mixture_cdf(x, member_means),
            probabilities,
            &search,
        )
    }

    fn fit_first_member(&mut self, x: &EnsembleMatrix, y: &[f64]) -> Result<()> {
        let first = x.column_vec(0);
        let model_bias = member_bias(&first, y)?;
        let corrected: Vec<f64> = first.iter().map(|v| v - model_bias).collect();
        let model_std = member_std(&corrected, y)?;

        for member in &mut self.members {
            member.set_scale(model_std);
            member.set_bias(model_bias);
        }

        log::info!(
            "fit mixture with simple dressing: scale={model_std:.6}, bias={model_bias:.6}"
        );
        Ok(())
    }

    fn fit_per_member(&mut self, x: &EnsembleMatrix, y: &[f64]) -> Result<()> {
        let mut params = Vec::with_capacity(self.members.len());
        for j in 0..self.members.len() {
            let column = x.column_vec(j);
            let bias = member_bias(&column, y)?;
            let corrected: Vec<f64> = column.iter().map(|v| v - bias).collect();
            params.push((member_std(&corrected, y)?, bias));
        }

        for (member, (scale, bias)) in self.members.iter_mut().zip(params) {
            member.set_scale(scale);
            member.set_bias(bias);
        }

        log::info!(
            "fit mixture per member on {} cases ({} members)",
            x.n_samples(),
            self.members.len()
        );
        Ok(())
    }
}

impl Fittable for GaussianMixtureModel {
    /// Mixture mean of every case.
    type Output = Vec<f64>;

    fn fit(&mut self, x: &EnsembleMatrix, y: &[f64]) -> Result<()> {
        self.validate_members(x)?;
        if x.n_samples() != y.len() {
            return Err(DressingError::ShapeMismatch {
                expected: x.n_samples(),
                got: y.len(),
            });
        }
        if y.is_empty() {
            return Err(DressingError::EmptyData);
        }

        match self.config.fit_strategy {
            FitStrategy::FirstMember => self.fit_first_member(x, y)?,
            FitStrategy::PerMember => self.fit_per_member(x, y)?,
        }
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &EnsembleMatrix) -> Result<Vec<f64>> {
        self.validate_members(x)?;
        x.rows().map(|row| self.mean(row)).collect()
    }

    fn member_count(&self) -> usize {
        self.members.len()
    }

    fn name(&self) -> &str {
        "GaussianMixtureModel"
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statrs::distribution::{Continuous, ContinuousCDF, Normal};

    fn training_data() -> (EnsembleMatrix, Vec<f64>) {
        // Member 0 errors: [1, 2, 0.5, 0.5] -> bias 1.0, std sqrt(0.375)
        let x = EnsembleMatrix::from_rows(vec![
            vec![11.0, 9.0, 10.0],
            vec![14.0, 11.0, 12.5],
            vec![15.5, 14.0, 15.0],
            vec![8.5, 7.5, 8.0],
        ])
        .unwrap();
        (x, vec![10.0, 12.0, 15.0, 8.0])
    }

    #[test]
    fn new_mixture_has_uniform_weights_and_standard_members() {
        let model = GaussianMixtureModel::new(4).unwrap();
        assert_eq!(model.member_count(), 4);
        assert_eq!(model.members().len(), 4);
        assert_eq!(model.weights().len(), 4);
        assert_relative_eq!(model.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for member in model.members() {
            assert_eq!(member.scale(), 1.0);
            assert_eq!(member.bias(), 0.0);
        }
        assert!(!model.is_fitted());
    }

    #[test]
    fn weights_sum_to_one_for_awkward_counts() {
        for n in [1, 3, 7, 10, 51] {
            let model = GaussianMixtureModel::new(n).unwrap();
            assert_relative_eq!(model.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_members_is_rejected() {
        assert!(matches!(
            GaussianMixtureModel::new(0),
            Err(DressingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn members_are_independent() {
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.members_mut()[0].set_scale(5.0);
        model.members_mut()[0].set_bias(2.0);
        assert_eq!(model.members()[1].scale(), 1.0);
        assert_eq!(model.members()[2].bias(), 0.0);
    }

    #[test]
    fn unfitted_mixture_is_standard_normal_around_mean() {
        let model = GaussianMixtureModel::new(2).unwrap();
        let normal = Normal::new(0.0, 1.0).unwrap();
        assert_relative_eq!(
            model.cdf(1.0, &[0.0, 0.0]).unwrap(),
            normal.cdf(1.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(model.mean(&[1.0, 3.0]).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn fit_broadcasts_first_member_parameters() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted());
        for member in model.members() {
            assert_relative_eq!(member.bias(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(member.scale(), 0.375_f64.sqrt(), epsilon = 1e-12);
        }
        let first = model.members()[0].clone();
        assert!(model.members().iter().all(|m| *m == first));
    }

    #[test]
    fn per_member_strategy_fits_each_column() {
        let (x, y) = training_data();
        let config = MixtureConfig::default().with_fit_strategy(FitStrategy::PerMember);
        let mut model = GaussianMixtureModel::with_config(3, config).unwrap();
        model.fit(&x, &y).unwrap();

        // Member 1 errors: [-1, -1, -1, -0.5] -> bias -0.875
        assert_relative_eq!(model.members()[0].bias(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(model.members()[1].bias(), -0.875, epsilon = 1e-12);
        assert!(model.members()[1].scale() < model.members()[0].scale());
    }

    #[test]
    fn fit_validates_before_mutating() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();

        assert!(matches!(
            model.fit(&x, &y[..3]),
            Err(DressingError::ShapeMismatch {
                expected: 4,
                got: 3
            })
        ));
        let mut narrow = GaussianMixtureModel::new(2).unwrap();
        assert!(matches!(
            narrow.fit(&x, &y),
            Err(DressingError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        ));
        let empty = EnsembleMatrix::from_row_major(0, 3, vec![]).unwrap();
        assert!(matches!(model.fit(&empty, &[]), Err(DressingError::EmptyData)));

        assert!(!model.is_fitted());
        assert!(model.members().iter().all(|m| m.scale() == 1.0 && m.bias() == 0.0));
    }

    #[test]
    fn mean_removes_bias() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.fit(&x, &y).unwrap();
        assert_relative_eq!(
            model.mean(&[12.0, 13.0, 14.0]).unwrap(),
            12.0,
            epsilon = 1e-12
        );
    }

    fn shifted_pair(centering: Centering) -> GaussianMixtureModel {
        let config = MixtureConfig::default().with_centering(centering);
        let mut model = GaussianMixtureModel::with_config(2, config).unwrap();
        for member in model.members_mut() {
            member.set_bias(1.25);
            member.set_scale(0.25);
        }
        model
    }

    #[test]
    fn default_cdf_composes_member_cdf_at_mean_minus_bias() {
        let model = shifted_pair(Centering::default());
        let means = [20.0, 20.0];

        let composed: f64 = model
            .members()
            .iter()
            .zip(model.weights())
            .zip(means)
            .map(|((m, w), mean)| w * m.cdf(20.0, mean - m.bias()))
            .sum();
        assert_relative_eq!(model.cdf(20.0, &means).unwrap(), composed, epsilon = 1e-12);
        assert_relative_eq!(model.cdf(20.0, &means).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(
            model.cdf(20.25, &means).unwrap(),
            0.8413447460685429,
            epsilon = 1e-9
        );

        let normal = Normal::new(20.0, 0.25).unwrap();
        assert_relative_eq!(
            model.pdf(19.8, &means).unwrap(),
            normal.pdf(19.8),
            epsilon = 1e-12
        );
    }

    #[test]
    fn corrected_centering_shifts_cdf_by_bias() {
        let model = shifted_pair(Centering::CorrectedForecast);
        let means = [20.0, 20.0];
        assert_relative_eq!(
            model.cdf(20.0, &means).unwrap(),
            0.9999997133484281,
            epsilon = 1e-9
        );
        assert_relative_eq!(model.cdf(18.75, &means).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn corrected_cdf_is_centered_on_mixture_mean_for_identical_members() {
        let (x, y) = training_data();
        let config = MixtureConfig::default().with_centering(Centering::CorrectedForecast);
        let mut model = GaussianMixtureModel::with_config(3, config).unwrap();
        model.fit(&x, &y).unwrap();

        let means = [20.0, 20.0, 20.0];
        let center = model.mean(&means).unwrap();
        assert_relative_eq!(model.cdf(center, &means).unwrap(), 0.5, epsilon = 1e-12);

        let scale = model.members()[0].scale();
        let normal = Normal::new(center, scale).unwrap();
        assert_relative_eq!(
            model.cdf(center + scale, &means).unwrap(),
            normal.cdf(center + scale),
            epsilon = 1e-12
        );
    }

    #[test]
    fn cdf_is_monotone_and_bounded() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.fit(&x, &y).unwrap();

        let means = [10.0, 14.0, 12.0];
        let grid: Vec<f64> = (0..200).map(|i| 5.0 + i as f64 * 0.05).collect();
        let cdf = model.discretized_cdf(&grid, &means).unwrap();
        assert_eq!(cdf.len(), grid.len());
        for w in cdf.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(cdf[0] >= 0.0 && cdf[cdf.len() - 1] <= 1.0);
    }

    #[test]
    fn pdf_integrates_to_one() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.fit(&x, &y).unwrap();

        let means = [10.0, 14.0, 12.0];
        let dx = 0.001;
        let integral: f64 = (0..20_000)
            .map(|i| model.pdf(2.0 + i as f64 * dx, &means).unwrap() * dx)
            .sum();
        assert_relative_eq!(integral, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn wrong_member_means_length_is_rejected() {
        let model = GaussianMixtureModel::new(3).unwrap();
        assert!(matches!(
            model.cdf(0.0, &[1.0, 2.0]),
            Err(DressingError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
        assert!(model.mean(&[1.0; 4]).is_err());
        assert!(model.pdf(0.0, &[]).is_err());
    }

    #[test]
    fn predict_returns_mixture_mean_per_case() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.fit(&x, &y).unwrap();

        let means = model.predict(&x).unwrap();
        assert_eq!(means.len(), 4);
        assert_relative_eq!(means[0], 9.0, epsilon = 1e-12);
    }

    #[test]
    fn percentiles_invert_the_cdf() {
        let (x, y) = training_data();
        let means = [10.0, 14.0, 12.0];
        let probs = [0.1, 0.5, 0.9];
        for centering in [Centering::RawForecast, Centering::CorrectedForecast] {
            let config = MixtureConfig::default().with_centering(centering);
            let mut model = GaussianMixtureModel::with_config(3, config).unwrap();
            model.fit(&x, &y).unwrap();
            let values = model.percentiles(&probs, &means).unwrap();
            for (p, v) in probs.iter().zip(&values) {
                assert_relative_eq!(model.cdf(*v, &means).unwrap(), *p, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn discretized_cdfs_cover_every_case() {
        let (x, y) = training_data();
        let mut model = GaussianMixtureModel::new(3).unwrap();
        model.fit(&x, &y).unwrap();

        let thresholds = [8.0, 10.0, 12.0, 14.0];
        let cdfs = model.discretized_cdfs(&thresholds, &x).unwrap();
        assert_eq!(cdfs.len(), x.n_samples());
        assert!(cdfs.iter().all(|c| c.len() == thresholds.len()));
    }
}
