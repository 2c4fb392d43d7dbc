//! Verification scores for probabilistic forecasts.

mod crps;

pub use crps::{
    cdf_violation, crps, heaviside, is_cdf_valid, mean_crps, CrpsScorer, InvalidCdfPolicy,
    ScoringConfig,
};
