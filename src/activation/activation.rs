use std::fmt;
use std::str::FromStr;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// SELU scale.
pub const SELU_LAMBDA: f64 = 1.0507;
/// SELU negative-side saturation.
pub const SELU_ALPHA: f64 = 1.6733;

/// Activation applied after a dense layer's linear transform.
///
/// Matrices passed in are column-batched: each column is one sample.
/// Layer-level derivatives are computed from the cached activated output
/// `A = f(Z)`, never from `Z`, so nothing transcendental is re-evaluated on
/// the backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationFunction {
    Linear,
    Sigmoid,
    ReLU,
    SELU,
    /// Column-wise normalised exponential. Vector-valued, so the scalar
    /// `apply`/`derivative` return NaN.
    Softmax,
    /// Softmax forward pass whose gradient is owned by `CCELossWithSoftmax`.
    /// Its backward step is a pass-through; never pair it with another loss.
    SoftmaxWithCCE,
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 6] = [
        ActivationFunction::Linear,
        ActivationFunction::Sigmoid,
        ActivationFunction::ReLU,
        ActivationFunction::SELU,
        ActivationFunction::Softmax,
        ActivationFunction::SoftmaxWithCCE,
    ];

    /// Registry name, as stored in checkpoints.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Linear => "Linear",
            ActivationFunction::Sigmoid => "Sigmoid",
            ActivationFunction::ReLU => "ReLU",
            ActivationFunction::SELU => "SELU",
            ActivationFunction::Softmax => "Softmax",
            ActivationFunction::SoftmaxWithCCE => "SoftmaxWithCCE",
        }
    }

    /// Looks an activation up by its exact registry name.
    pub fn from_name(name: &str) -> Result<ActivationFunction> {
        ActivationFunction::ALL
            .into_iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| NnError::UnknownActivation(name.to_owned()))
    }

    /// Element-wise activation.
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::SELU => {
                if x >= 0.0 {
                    SELU_LAMBDA * x
                } else {
                    SELU_LAMBDA * SELU_ALPHA * (x.exp() - 1.0)
                }
            }
            ActivationFunction::Softmax | ActivationFunction::SoftmaxWithCCE => f64::NAN,
        }
    }

    /// Element-wise derivative with respect to the input `x`.
    ///
    /// ReLU uses 1 at `x = 0`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => 1.0,
            ActivationFunction::Sigmoid => {
                let fx = self.apply(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x >= 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::SELU => {
                if x >= 0.0 {
                    SELU_LAMBDA
                } else {
                    SELU_LAMBDA * SELU_ALPHA * x.exp()
                }
            }
            ActivationFunction::Softmax | ActivationFunction::SoftmaxWithCCE => f64::NAN,
        }
    }

    /// Returns `f(z)` as a new matrix, one column per sample.
    pub fn activate(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Linear => z.clone(),
            ActivationFunction::Softmax | ActivationFunction::SoftmaxWithCCE => {
                z.map_columns(softmax_column)
            }
            other => z.map(|x| other.apply(x)),
        }
    }

    /// Activates `m` in place; the handle is the only thing mutated.
    pub fn apply_matrix(&self, m: &mut Matrix) {
        if *self != ActivationFunction::Linear {
            *m = self.activate(m);
        }
    }

    /// Element-wise `f'` expressed through the cached output `a = f(z)`.
    ///
    /// - Sigmoid: `a * (1 - a)`
    /// - ReLU: `1` where `a > 0`, else `0`. An input of exactly zero is
    ///   indistinguishable from a negative one here and gets `0`.
    /// - SELU: `λ` where `a >= 0`, else `a + λα` (equal to `λα·e^z`).
    /// - Softmax: the Jacobian diagonal `a * (1 - a)`; `backward` uses the full Jacobian.
    /// - SoftmaxWithCCE: all ones, the paired loss already produced `dL/dZ`.
    pub fn derivative_matrix(&self, output: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Linear | ActivationFunction::SoftmaxWithCCE => {
                Matrix::ones(output.row_count(), output.column_count())
            }
            ActivationFunction::Sigmoid | ActivationFunction::Softmax => output.map(|a| a * (1.0 - a)),
            ActivationFunction::ReLU => output.map(|a| if a > 0.0 { 1.0 } else { 0.0 }),
            ActivationFunction::SELU => output.map(|a| {
                if a >= 0.0 {
                    SELU_LAMBDA
                } else {
                    a + SELU_LAMBDA * SELU_ALPHA
                }
            }),
        }
    }

    /// Turns `dL/dA` into `dL/dZ` given the cached output `A`.
    ///
    /// Softmax applies the per-sample Jacobian-vector product
    /// `dz_i = a_i * (g_i - sum_j g_j * a_j)`; every other variant is the
    /// Hadamard product with `derivative_matrix`.
    pub fn backward(&self, upstream: &Matrix, output: &Matrix) -> Result<Matrix> {
        match self {
            ActivationFunction::Linear | ActivationFunction::SoftmaxWithCCE => {
                if !upstream.are_same_size(output) {
                    return Err(NnError::DimensionMismatch {
                        left: upstream.size(),
                        right: output.size(),
                    });
                }
                Ok(upstream.clone())
            }
            ActivationFunction::Softmax => {
                let weighted = upstream.multiply_elementwise(output)?;
                let mut totals = Matrix::ones(1, output.row_count()).multiply(&weighted)?;
                totals.broadcast(output.row_count(), output.column_count())?;
                output.multiply_elementwise(&upstream.subtract(&totals)?)
            }
            _ => upstream.multiply_elementwise(&self.derivative_matrix(output)),
        }
    }

    /// True for the softmax variants, which need a whole column at once.
    pub fn is_vector_valued(&self) -> bool {
        matches!(self, ActivationFunction::Softmax | ActivationFunction::SoftmaxWithCCE)
    }
}

/// Numerically stable softmax of one sample.
fn softmax_column(column: Vec<f64>) -> Vec<f64> {
    let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exponents: Vec<f64> = column.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exponents.iter().sum();
    exponents.into_iter().map(|e| e / total).collect()
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationFunction {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self> {
        ActivationFunction::from_name(s)
    }
}
