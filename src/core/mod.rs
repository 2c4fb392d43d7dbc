//! Core data structures for ensemble post-processing.

mod ensemble;

pub use ensemble::{EnsembleMatrix, ValueLayout};
