//! Bias correction of ensemble member predictions.

mod simple;
mod traits;

pub use simple::{Grouping, SimpleBiasCorrector};
pub use traits::{BiasCorrector, BoxedBiasCorrector, Fittable};
