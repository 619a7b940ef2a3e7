use std::sync::Mutex;

use rayon::prelude::*;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::metric::{Metric, DEFAULT_EPSILON};

/// Regression accuracy: a sample is correct when every output is within
/// `epsilon` of its label. An `epsilon` of zero means [`DEFAULT_EPSILON`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accuracy {
    pub epsilon: f64,
}

impl Accuracy {
    pub fn new(epsilon: f64) -> Accuracy {
        Accuracy { epsilon }
    }

    fn tolerance(&self) -> f64 {
        if self.epsilon == 0.0 {
            DEFAULT_EPSILON
        } else {
            self.epsilon
        }
    }
}

impl Metric for Accuracy {
    fn calculate(&self, labels: &Matrix, predictions: &Matrix) -> Result<f64> {
        if !labels.are_same_size(predictions) {
            return Err(NnError::DimensionMismatch { left: labels.size(), right: predictions.size() });
        }
        let samples = labels.column_count();
        if samples == 0 {
            return Ok(0.0);
        }
        let epsilon = self.tolerance();
        let correct = Mutex::new(0usize);

        (0..samples).into_par_iter().for_each(|j| {
            let hit = (0..labels.row_count()).all(|i| (labels[(i, j)] - predictions[(i, j)]).abs() <= epsilon);
            if hit {
                if let Ok(mut count) = correct.lock() {
                    *count += 1;
                }
            }
        });

        let correct = correct.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(correct as f64 / samples as f64)
    }
}
