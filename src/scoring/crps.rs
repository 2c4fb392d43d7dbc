//! Continuous Ranked Probability Score on a discretized CDF.
//!
//! A probabilistic forecast is given as probabilities `P(y <= t)` at a fixed,
//! ascending grid of thresholds. The score of a case is the mean squared
//! difference between that discretized CDF and the step function of the
//! observed outcome. Lower is better; 0 is a perfect deterministic forecast.
//!
//! The mean over thresholds is a Riemann-sum approximation of the continuous
//! CRPS integral that assumes evenly spaced thresholds. Uneven grids are
//! accepted but weight densely sampled regions more heavily.

use crate::error::{DressingError, Result};

/// What to do with a predicted CDF that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidCdfPolicy {
    /// Log a warning and score the case as maximally wrong (1.0).
    #[default]
    Penalize,
    /// Abort scoring with [`DressingError::InvalidCdf`].
    Error,
}

/// Configuration for CRPS scoring.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Floating tolerance of the CDF validity check.
    pub tolerance: f64,
    /// Handling of invalid predicted CDFs.
    pub invalid_cdf_policy: InvalidCdfPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            invalid_cdf_policy: InvalidCdfPolicy::Penalize,
        }
    }
}

impl ScoringConfig {
    /// Set the validity check tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the invalid CDF policy.
    pub fn with_policy(mut self, policy: InvalidCdfPolicy) -> Self {
        self.invalid_cdf_policy = policy;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.tolerance >= 0.0) || !self.tolerance.is_finite() {
            return Err(DressingError::InvalidParameter(format!(
                "CDF tolerance must be non-negative and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Step function of the observation: 1 where `threshold >= actual`, else 0.
pub fn heaviside(thresholds: &[f64], actual: f64) -> Vec<f64> {
    thresholds
        .iter()
        .map(|&t| if t >= actual { 1.0 } else { 0.0 })
        .collect()
}

/// Describe why `case` is not a valid discretized CDF, if it is not.
///
/// Valid means the first probability lies in [0, 1] and every later one is at
/// most 1 and not below its predecessor, all up to `tolerance`. The check is
/// step-wise, so regressions within tolerance may add up over a long case.
pub fn cdf_violation(case: &[f64], tolerance: f64) -> Option<String> {
    let first = *case.first()?;
    if !(first >= -tolerance && first <= 1.0 + tolerance) {
        return Some(format!("first probability {first} outside [0, 1]"));
    }

    for (k, w) in case.windows(2).enumerate() {
        let (previous, p) = (w[0], w[1]);
        if !(p <= 1.0 + tolerance) {
            return Some(format!("probability {p} at index {} exceeds 1", k + 1));
        }
        if !(p >= previous - tolerance) {
            return Some(format!(
                "probability decreases to {p} at index {} after {previous}",
                k + 1
            ));
        }
    }
    None
}

/// Check whether `case` is a valid discretized CDF.
///
/// An empty case is not valid.
pub fn is_cdf_valid(case: &[f64], tolerance: f64) -> bool {
    !case.is_empty() && cdf_violation(case, tolerance).is_none()
}

fn validate_thresholds(thresholds: &[f64]) -> Result<()> {
    if thresholds.is_empty() {
        return Err(DressingError::EmptyData);
    }
    for (k, w) in thresholds.windows(2).enumerate() {
        if !(w[1] >= w[0]) {
            return Err(DressingError::InvalidParameter(format!(
                "thresholds must be ascending, got {} after {} at index {}",
                w[1],
                w[0],
                k + 1
            )));
        }
    }
    Ok(())
}

/// Scores discretized probabilistic forecasts against observed outcomes.
///
/// # Example
/// ```
/// use ensemble_dressing::scoring::CrpsScorer;
///
/// let scorer = CrpsScorer::default();
/// let thresholds = [0.0, 1.0, 2.0];
/// let score = scorer
///     .mean_score(&thresholds, &[vec![0.0, 0.5, 1.0], vec![0.0, 1.0, 1.0]], &[1.0, 0.0])
///     .unwrap();
/// assert!((score - 5.0 / 24.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrpsScorer {
    config: ScoringConfig,
}

impl CrpsScorer {
    /// Create a scorer with the given configuration.
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn score_case(&self, thresholds: &[f64], case: &[f64], actual: f64, index: usize) -> Result<f64> {
        let n = thresholds.len() as f64;

        let violation = if case.len() != thresholds.len() {
            Some(format!(
                "{} probabilities for {} thresholds",
                case.len(),
                thresholds.len()
            ))
        } else {
            cdf_violation(case, self.config.tolerance)
        };

        if let Some(reason) = violation {
            return match self.config.invalid_cdf_policy {
                InvalidCdfPolicy::Penalize => {
                    log::warn!("bad CDF in case {index}, scoring as maximally wrong: {reason}");
                    // Every threshold counts as a full mismatch.
                    Ok(n / n)
                }
                InvalidCdfPolicy::Error => Err(DressingError::InvalidCdf {
                    case: index,
                    reason,
                }),
            };
        }

        let sum: f64 = case
            .iter()
            .zip(heaviside(thresholds, actual))
            .map(|(forecast, observed)| (forecast - observed).powi(2))
            .sum();
        Ok(sum / n)
    }

    /// CRPS of a single case.
    pub fn score(&self, thresholds: &[f64], case: &[f64], actual: f64) -> Result<f64> {
        self.config.validate()?;
        validate_thresholds(thresholds)?;
        self.score_case(thresholds, case, actual, 0)
    }

    /// CRPS of every case, in order.
    pub fn score_batch<C>(&self, thresholds: &[f64], predictions: &[C], actuals: &[f64]) -> Result<Vec<f64>>
    where
        C: AsRef<[f64]>,
    {
        self.config.validate()?;
        if predictions.is_empty() {
            return Err(DressingError::EmptyData);
        }
        if predictions.len() != actuals.len() {
            return Err(DressingError::DimensionMismatch {
                expected: predictions.len(),
                got: actuals.len(),
            });
        }
        validate_thresholds(thresholds)?;

        predictions
            .iter()
            .zip(actuals)
            .enumerate()
            .map(|(i, (case, &actual))| self.score_case(thresholds, case.as_ref(), actual, i))
            .collect()
    }

    /// Mean CRPS over all cases.
    pub fn mean_score<C>(&self, thresholds: &[f64], predictions: &[C], actuals: &[f64]) -> Result<f64>
    where
        C: AsRef<[f64]>,
    {
        let scores = self.score_batch(thresholds, predictions, actuals)?;
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// CRPS of a single case with the default configuration.
///
/// Invalid CDFs score 1.0 and log a warning.
pub fn crps(thresholds: &[f64], case: &[f64], actual: f64) -> Result<f64> {
    CrpsScorer::default().score(thresholds, case, actual)
}

/// Mean CRPS over a batch of cases with the default configuration.
///
/// # Arguments
/// * `thresholds` - Ascending discretization grid
/// * `predictions` - One discretized CDF `P(y <= t)` per case, aligned to `thresholds`
/// * `actuals` - Observed outcome of each case
pub fn mean_crps<C>(thresholds: &[f64], predictions: &[C], actuals: &[f64]) -> Result<f64>
where
    C: AsRef<[f64]>,
{
    CrpsScorer::default().mean_score(thresholds, predictions, actuals)
}
