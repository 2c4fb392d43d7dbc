//! Percentile search over a monotone cumulative distribution function.
//!
//! The search first brackets the target probability by stepping away from an
//! initial guess with a doubling step, then bisects the bracket until it is
//! narrower than the configured tolerance. Both phases share an iteration cap,
//! so a CDF that never reaches the target fails with an error instead of
//! looping.

use crate::error::{DressingError, Result};

/// Configuration for percentile search.
#[derive(Debug, Clone)]
pub struct PercentileConfig {
    /// Width of the final bracket, in units of the CDF argument.
    pub tolerance: f64,
    /// Maximum number of CDF evaluations per phase (bracketing, bisection).
    pub max_iter: usize,
    /// Starting point of the first search.
    pub initial_guess: f64,
    /// First bracketing step (doubled on every expansion).
    pub initial_step: f64,
}

impl Default for PercentileConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iter: 200,
            initial_guess: 0.0,
            initial_step: 1.0,
        }
    }
}

impl PercentileConfig {
    /// Start the search at `guess`.
    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.initial_guess = guess;
        self
    }

    /// Set the first bracketing step.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Set the bracket width at which bisection stops.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0) {
            return Err(DressingError::InvalidParameter(format!(
                "percentile tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.initial_step > 0.0) || !self.initial_step.is_finite() {
            return Err(DressingError::InvalidParameter(format!(
                "percentile initial step must be positive and finite, got {}",
                self.initial_step
            )));
        }
        if !self.initial_guess.is_finite() {
            return Err(DressingError::InvalidParameter(
                "percentile initial guess must be finite".to_string(),
            ));
        }
        if self.max_iter == 0 {
            return Err(DressingError::InvalidParameter(
                "percentile max_iter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a single percentile search.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileSearch {
    /// Smallest bracketed value whose CDF is at or above the target.
    pub value: f64,
    /// CDF evaluated at `value`.
    pub cdf: f64,
    /// Total CDF evaluations spent.
    pub iterations: usize,
}

fn evaluate<F: Fn(f64) -> f64>(cdf: &F, x: f64) -> Result<f64> {
    let p = cdf(x);
    if p.is_nan() {
        return Err(DressingError::ComputationError(format!(
            "CDF returned NaN at {x}"
        )));
    }
    Ok(p)
}

/// Find the value at which `cdf` first reaches `probability`.
///
/// `probability` must lie strictly inside (0, 1).
pub fn find_percentile<F>(cdf: F, probability: f64, config: &PercentileConfig) -> Result<PercentileSearch>
where
    F: Fn(f64) -> f64,
{
    config.validate()?;
    if !(probability > 0.0 && probability < 1.0) {
        return Err(DressingError::InvalidParameter(format!(
            "percentile must lie in (0, 1), got {probability}"
        )));
    }

    let mut iterations = 1;
    let guess = config.initial_guess;
    let mut step = config.initial_step;

    // Bracket: cdf(lo) < p <= cdf(hi).
    let start = evaluate(&cdf, guess)?;
    let (mut lo, mut hi, mut hi_cdf) = if start < probability {
        let mut lo = guess;
        loop {
            let hi = lo + step;
            iterations += 1;
            let p = evaluate(&cdf, hi)?;
            if p >= probability {
                break (lo, hi, p);
            }
            if iterations > config.max_iter {
                return Err(DressingError::ComputationError(format!(
                    "could not bracket percentile {probability} above {guess}"
                )));
            }
            lo = hi;
            step *= 2.0;
        }
    } else {
        let mut hi = guess;
        let mut hi_cdf = start;
        loop {
            let lo = hi - step;
            iterations += 1;
            let p = evaluate(&cdf, lo)?;
            if p < probability {
                break (lo, hi, hi_cdf);
            }
            if iterations > config.max_iter {
                return Err(DressingError::ComputationError(format!(
                    "could not bracket percentile {probability} below {guess}"
                )));
            }
            hi = lo;
            hi_cdf = p;
            step *= 2.0;
        }
    };

    let mut bisections = 0;
    while hi - lo > config.tolerance {
        if bisections >= config.max_iter {
            return Err(DressingError::ComputationError(format!(
                "percentile {probability} did not converge within {} bisections",
                config.max_iter
            )));
        }
        let mid = lo + (hi - lo) / 2.0;
        if mid <= lo || mid >= hi {
            // Bracket is at floating-point resolution.
            break;
        }
        let p = evaluate(&cdf, mid)?;
        if p < probability {
            lo = mid;
        } else {
            hi = mid;
            hi_cdf = p;
        }
        bisections += 1;
    }

    let iterations = iterations + bisections;
    log::debug!(
        "percentile {probability} found at {hi} after {iterations} CDF evaluations"
    );

    Ok(PercentileSearch {
        value: hi,
        cdf: hi_cdf,
        iterations,
    })
}

/// Find the values corresponding to several percentiles.
///
/// Each search after the first starts from the previous result, so ascending
/// `probabilities` are found with the fewest evaluations.
///
/// # Example
/// ```
/// use ensemble_dressing::utils::percentile::{percentiles, PercentileConfig};
///
/// // Uniform distribution on [0, 10]
/// let cdf = |x: f64| (x / 10.0).clamp(0.0, 1.0);
/// let values = percentiles(cdf, &[0.25, 0.5], &PercentileConfig::default()).unwrap();
/// assert!((values[0] - 2.5).abs() < 1e-6);
/// assert!((values[1] - 5.0).abs() < 1e-6);
/// ```
pub fn percentiles<F>(cdf: F, probabilities: &[f64], config: &PercentileConfig) -> Result<Vec<f64>>
where
    F: Fn(f64) -> f64,
{
    let mut values = Vec::with_capacity(probabilities.len());
    let mut search = config.clone();
    for &p in probabilities {
        let found = find_percentile(&cdf, p, &search)?;
        search.initial_guess = found.value;
        values.push(found.value);
    }
    Ok(values)
}
