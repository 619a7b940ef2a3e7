use std::fmt;

use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::init::WeightInitialization;
use crate::layers::layer::LayerOutput;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;

/// Fully-connected layer: `A = f(W·X + b)`.
///
/// `weights` is `(output_size, input_size)` and `bias` is `(output_size, 1)`.
/// Inputs are column-batched, one sample per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    weights: Matrix,
    bias: Matrix,
    activation: ActivationFunction,
}

impl Dense {
    /// Fails with `InvalidBiasSize` unless `bias` is `(weights.rows, 1)`.
    pub fn new(weights: Matrix, bias: Matrix, activation: ActivationFunction) -> Result<Dense> {
        if bias.row_count() != weights.row_count() || bias.column_count() != 1 {
            return Err(NnError::InvalidBiasSize {
                expected: weights.row_count(),
                got: bias.size(),
            });
        }
        Ok(Dense { weights, bias, activation })
    }

    /// Randomly initialised weights, zero bias.
    pub fn random(
        input_size: usize,
        output_size: usize,
        activation: ActivationFunction,
        init: WeightInitialization,
    ) -> Dense {
        Dense::random_with_rng(input_size, output_size, activation, init, &mut rand::thread_rng())
    }

    pub fn random_with_rng<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: ActivationFunction,
        init: WeightInitialization,
        rng: &mut R,
    ) -> Dense {
        Dense {
            weights: init.weights(input_size, output_size, rng),
            bias: Matrix::zeros(output_size, 1),
            activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.column_count()
    }

    pub fn output_size(&self) -> usize {
        self.weights.row_count()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    /// Returns `(Z, A)` with `Z = W·X + b` and `A = f(Z)`.
    ///
    /// Fails with `NotConformable` when `x` does not have `input_size` rows.
    pub fn forward_propagate(&self, x: &Matrix) -> Result<LayerOutput> {
        let mut bias = self.bias.clone();
        bias.broadcast(self.output_size(), x.column_count())?;
        let linear = self.weights.multiply(x)?.add(&bias)?;
        let activated = self.activation.activate(&linear);
        Ok(LayerOutput { linear, activated })
    }

    /// Backward step fused with the weight update.
    ///
    /// - `upstream` is `dL/dA` for this layer's output.
    /// - `input` is the `X` this layer saw on the forward pass.
    /// - `cache` is what `forward_propagate(input)` returned.
    ///
    /// Computes `dZ = f'(A) ⊙ upstream`, updates `W` and `b` once with the
    /// batch-averaged gradients, and returns `W_oldᵀ · dZ` for the previous layer.
    pub fn back_propagate(
        &mut self,
        upstream: &Matrix,
        input: &Matrix,
        cache: &LayerOutput,
        optimizer: &Sgd,
    ) -> Result<Matrix> {
        let dz = self.activation.backward(upstream, &cache.activated)?;
        let propagated = self.weights.transpose().multiply(&dz)?;

        let batch = input.column_count();
        let scale = 1.0 / batch as f64;
        let dw = dz.multiply(&input.transpose())?.multiply_by_scalar(scale);
        let db = dz.multiply(&Matrix::ones(batch, 1))?.multiply_by_scalar(scale);

        optimizer.step(&mut self.weights, &dw)?;
        optimizer.step(&mut self.bias, &db)?;

        Ok(propagated)
    }
}

impl fmt::Display for Dense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dense{{{} -> {}, activation: {}}}",
            self.input_size(),
            self.output_size(),
            self.activation
        )
    }
}
