//! Mixture members: shifted and scaled copies of a base distribution.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Location-scale family a mixture member is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseDistribution {
    /// Univariate normal distribution.
    #[default]
    Normal,
}

impl BaseDistribution {
    /// Density at `x` for location `loc` and scale `scale`.
    ///
    /// A zero scale is a point mass at `loc`; a negative or NaN scale yields NaN.
    pub fn pdf(&self, x: f64, loc: f64, scale: f64) -> f64 {
        match self {
            BaseDistribution::Normal => {
                if scale == 0.0 {
                    return if x == loc { f64::INFINITY } else { 0.0 };
                }
                match Normal::new(loc, scale) {
                    Ok(normal) => normal.pdf(x),
                    Err(_) => f64::NAN,
                }
            }
        }
    }

    /// Cumulative probability at `x` for location `loc` and scale `scale`.
    ///
    /// A zero scale is a point mass at `loc`; a negative or NaN scale yields NaN.
    pub fn cdf(&self, x: f64, loc: f64, scale: f64) -> f64 {
        match self {
            BaseDistribution::Normal => {
                if scale == 0.0 {
                    return if x >= loc { 1.0 } else { 0.0 };
                }
                match Normal::new(loc, scale) {
                    Ok(normal) => normal.cdf(x),
                    Err(_) => f64::NAN,
                }
            }
        }
    }
}

/// One component of a mixture: a base distribution with its own scale and
/// an additive bias.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureMember {
    distribution: BaseDistribution,
    scale: f64,
    bias: f64,
}

impl MixtureMember {
    /// Create a member with unit scale and no bias.
    pub fn new(distribution: BaseDistribution) -> Self {
        Self {
            distribution,
            scale: 1.0,
            bias: 0.0,
        }
    }

    /// Set the initial scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Base distribution family.
    pub fn distribution(&self) -> BaseDistribution {
        self.distribution
    }

    /// Standard deviation of the member.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Additive bias of the member.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    /// Density of the base distribution at `x - bias`, located at `loc`.
    pub fn pdf(&self, x: f64, loc: f64) -> f64 {
        self.distribution.pdf(x - self.bias, loc, self.scale)
    }

    /// Cumulative probability of the base distribution at `x - bias`, located at `loc`.
    pub fn cdf(&self, x: f64, loc: f64) -> f64 {
        self.distribution.cdf(x - self.bias, loc, self.scale)
    }

    /// Member forecast with the bias removed.
    pub fn corrected_mean(&self, member_mean: f64) -> f64 {
        member_mean - self.bias
    }

    /// Density of the outcome at `x` given this member's raw forecast.
    ///
    /// Centered at the bias-corrected forecast.
    pub fn dressed_pdf(&self, x: f64, member_mean: f64) -> f64 {
        self.distribution
            .pdf(x, self.corrected_mean(member_mean), self.scale)
    }

    /// Probability that the outcome is at most `x` given this member's raw forecast.
    ///
    /// Centered at the bias-corrected forecast.
    pub fn dressed_cdf(&self, x: f64, member_mean: f64) -> f64 {
        self.distribution
            .cdf(x, self.corrected_mean(member_mean), self.scale)
    }
}
