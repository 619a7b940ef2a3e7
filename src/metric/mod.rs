//! Accuracy metrics. Inputs are column-batched: each column is one sample.

pub mod accuracy;
pub mod categorical;

pub use accuracy::Accuracy;
pub use categorical::{CategoricalAccuracy, SparseCategoricalAccuracy};

use crate::error::Result;
use crate::math::matrix::Matrix;

/// Tolerance used by [`Accuracy`] when none is configured.
pub const DEFAULT_EPSILON: f64 = 1e-5;

pub trait Metric: Send + Sync {
    /// Fraction of samples in `[0, 1]` that the prediction gets right.
    fn calculate(&self, labels: &Matrix, predictions: &Matrix) -> Result<f64>;
}
