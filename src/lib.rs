//! # ensemble-dressing
//!
//! Statistical post-processing and verification of ensemble forecasts.
//!
//! - [`correction`]: per-member bias correction fitted by maximum likelihood.
//! - [`mixture`]: Gaussian mixture "dressing" turning member forecasts into a
//!   predictive distribution.
//! - [`scoring`]: the Continuous Ranked Probability Score on discretized CDFs.
//!
//! A typical pipeline fits both models on a training ensemble, evaluates the
//! mixture CDF on a threshold grid for each new case and scores the result:
//!
//! ```
//! use ensemble_dressing::prelude::*;
//!
//! let x = EnsembleMatrix::from_rows(vec![
//!     vec![11.0, 10.5],
//!     vec![13.5, 12.0],
//!     vec![15.5, 15.0],
//!     vec![8.5, 8.5],
//! ])
//! .unwrap();
//! let y = [10.0, 12.0, 15.0, 8.0];
//!
//! let mut model = GaussianMixtureModel::new(2).unwrap();
//! model.fit(&x, &y).unwrap();
//!
//! let thresholds: Vec<f64> = (0..=40).map(|i| 5.0 + i as f64 * 0.25).collect();
//! let cdfs = model.discretized_cdfs(&thresholds, &x).unwrap();
//! let score = mean_crps(&thresholds, &cdfs, &y).unwrap();
//! assert!(score >= 0.0 && score < 0.25);
//! ```

pub mod core;
pub mod correction;
pub mod error;
pub mod mixture;
pub mod scoring;
pub mod utils;

pub use error::{DressingError, Result};

pub mod prelude {
    pub use crate::core::EnsembleMatrix;
    pub use crate::correction::{BiasCorrector, Fittable, SimpleBiasCorrector};
    pub use crate::error::{DressingError, Result};
    pub use crate::mixture::{Centering, FitStrategy, GaussianMixtureModel, MixtureConfig};
    pub use crate::scoring::{crps, mean_crps, CrpsScorer, InvalidCdfPolicy, ScoringConfig};
}
