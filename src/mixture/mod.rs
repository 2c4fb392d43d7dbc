//! Mixture models combining ensemble members into one predictive distribution.

mod gaussian;
mod member;

pub use gaussian::{Centering, FitStrategy, GaussianMixtureModel, MixtureConfig};
pub use member::{BaseDistribution, MixtureMember};
