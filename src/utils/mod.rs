//! Utility functions shared by the correctors, mixtures and scorers.

pub mod percentile;
pub mod stats;

pub use percentile::{find_percentile, percentiles, PercentileConfig, PercentileSearch};
pub use stats::{
    maximum_likelihood_bias, maximum_likelihood_std, member_bias, member_std, quantile_normal,
};
