use std::fmt;

use rand::Rng;

use crate::error::{NnError, Result};
use crate::layers::layer::LayerOutput;
use crate::math::matrix::Matrix;

/// Inverted dropout.
///
/// Each element survives with probability `1 - rate` and is scaled by
/// `1 / (1 - rate)` so the expected activation is unchanged. The network
/// skips this layer entirely at inference time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dropout {
    input_size: usize,
    rate: f64,
}

impl Dropout {
    /// Fails with `InvalidDropoutRate` unless `rate` is in `[0, 1)`.
    pub fn new(input_size: usize, rate: f64) -> Result<Dropout> {
        if !(0.0..1.0).contains(&rate) {
            return Err(NnError::InvalidDropoutRate(rate));
        }
        Ok(Dropout { input_size, rate })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.input_size
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn keep_probability(&self) -> f64 {
        1.0 - self.rate
    }

    /// Masks `x`. The scaled mask is returned in `linear` so the backward
    /// pass can reapply it.
    pub fn forward_propagate(&self, x: &Matrix) -> Result<LayerOutput> {
        if x.row_count() != self.input_size {
            return Err(NnError::NotConformable {
                left: (self.input_size, self.input_size),
                right: x.size(),
            });
        }
        let keep = self.keep_probability();
        let scale = 1.0 / keep;
        // one thread_rng per worker thread, one column per task
        let mask = x.map_columns(|column| {
            let mut rng = rand::thread_rng();
            column
                .iter()
                .map(|_| if rng.gen::<f64>() < keep { scale } else { 0.0 })
                .collect()
        });
        let activated = x.multiply_elementwise(&mask)?;
        Ok(LayerOutput { linear: mask, activated })
    }

    /// `upstream ⊙ mask`. Nothing to update.
    pub fn back_propagate(&self, upstream: &Matrix, cache: &LayerOutput) -> Result<Matrix> {
        upstream.multiply_elementwise(&cache.linear)
    }
}

impl fmt::Display for Dropout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dropout{{{} -> {}, rate: {}}}", self.input_size, self.input_size, self.rate)
    }
}
