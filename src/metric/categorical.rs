use rayon::prelude::*;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::metric::Metric;

/// One-hot labels: correct when the argmax of label and prediction agree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoricalAccuracy;

/// Integer labels in a `1 x N` matrix: correct when the label equals the
/// argmax of the prediction column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SparseCategoricalAccuracy;

/// Index of the first maximum in column `j`.
fn argmax_column(m: &Matrix, j: usize) -> usize {
    let mut best = 0;
    for i in 1..m.row_count() {
        if m[(i, j)] > m[(best, j)] {
            best = i;
        }
    }
    best
}

fn fraction(hits: usize, samples: usize) -> f64 {
    if samples == 0 {
        0.0
    } else {
        hits as f64 / samples as f64
    }
}

impl Metric for CategoricalAccuracy {
    fn calculate(&self, labels: &Matrix, predictions: &Matrix) -> Result<f64> {
        if !labels.are_same_size(predictions) {
            return Err(NnError::DimensionMismatch { left: labels.size(), right: predictions.size() });
        }
        let samples = labels.column_count();
        let hits = (0..samples)
            .into_par_iter()
            .filter(|&j| argmax_column(labels, j) == argmax_column(predictions, j))
            .count();
        Ok(fraction(hits, samples))
    }
}

impl Metric for SparseCategoricalAccuracy {
    fn calculate(&self, labels: &Matrix, predictions: &Matrix) -> Result<f64> {
        if labels.row_count() != 1 || labels.column_count() != predictions.column_count() {
            return Err(NnError::DimensionMismatch { left: labels.size(), right: predictions.size() });
        }
        let samples = labels.column_count();
        let hits = (0..samples)
            .into_par_iter()
            .filter(|&j| labels[(0, j)] == argmax_column(predictions, j) as f64)
            .count();
        Ok(fraction(hits, samples))
    }
}
