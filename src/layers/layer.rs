use std::fmt;

use crate::error::Result;
use crate::layers::dense::Dense;
use crate::layers::dropout::Dropout;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;

/// What a layer caches from its forward pass.
///
/// For `Dense` this is `(Z, A)`. For `Dropout`, `linear` holds the scaled
/// keep mask and `activated` the masked input.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOutput {
    pub linear: Matrix,
    pub activated: Matrix,
}

impl LayerOutput {
    /// Cache entry for the raw network input: both slots are `x`.
    pub fn input(x: &Matrix) -> LayerOutput {
        LayerOutput { linear: x.deep_copy(), activated: x.deep_copy() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}

impl Layer {
    pub fn input_size(&self) -> usize {
        match self {
            Layer::Dense(d) => d.input_size(),
            Layer::Dropout(d) => d.input_size(),
        }
    }

    pub fn output_size(&self) -> usize {
        match self {
            Layer::Dense(d) => d.output_size(),
            Layer::Dropout(d) => d.output_size(),
        }
    }

    /// True for layers that only act during training and are skipped by `predict`.
    pub fn is_training(&self) -> bool {
        matches!(self, Layer::Dropout(_))
    }

    pub fn forward_propagate(&self, x: &Matrix) -> Result<LayerOutput> {
        match self {
            Layer::Dense(d) => d.forward_propagate(x),
            Layer::Dropout(d) => d.forward_propagate(x),
        }
    }

    /// Returns the gradient for the previous layer, updating parameters on the way.
    pub fn back_propagate(
        &mut self,
        upstream: &Matrix,
        input: &Matrix,
        cache: &LayerOutput,
        optimizer: &Sgd,
    ) -> Result<Matrix> {
        match self {
            Layer::Dense(d) => d.back_propagate(upstream, input, cache, optimizer),
            Layer::Dropout(d) => d.back_propagate(upstream, cache),
        }
    }
}

impl From<Dense> for Layer {
    fn from(d: Dense) -> Self {
        Layer::Dense(d)
    }
}

impl From<Dropout> for Layer {
    fn from(d: Dropout) -> Self {
        Layer::Dropout(d)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Dense(d) => d.fmt(f),
            Layer::Dropout(d) => d.fmt(f),
        }
    }
}
