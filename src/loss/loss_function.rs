use std::fmt;
use std::str::FromStr;

use crate::error::{NnError, Result};
use crate::loss::cross_entropy::{CategoricalCrossEntropyLoss, CceLossWithSoftmax};
use crate::loss::log_loss::LogLoss;
use crate::loss::square::SquareLoss;
use crate::math::matrix::Matrix;

/// Cost between labels and predictions.
///
/// Matrices are column-batched: row `i` is output `i`, column `j` is sample `j`.
pub trait Loss: Send + Sync {
    /// Per-scalar cost.
    fn apply(&self, label: f64, prediction: f64) -> f64;

    /// Per-scalar `dCost/dPrediction`.
    fn derivative(&self, label: f64, prediction: f64) -> f64;

    /// `1 x N` row vector; entry `j` is sample `j`'s cost summed over outputs.
    fn apply_matrix(&self, labels: &Matrix, predictions: &Matrix) -> Result<Matrix> {
        let costs = labels.zip_map(predictions, |y, p| self.apply(y, p))?;
        Matrix::ones(1, costs.row_count()).multiply(&costs)
    }

    /// Gradient with the shape of `predictions`.
    fn derivative_matrix(&self, labels: &Matrix, predictions: &Matrix) -> Result<Matrix> {
        labels.zip_map(predictions, |y, p| self.derivative(y, p))
    }
}

/// The closed set of losses a network can be trained with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossFunction {
    SquareLoss(SquareLoss),
    LogLoss(LogLoss),
    CategoricalCrossEntropyLoss(CategoricalCrossEntropyLoss),
    /// Must be paired with a `SoftmaxWithCCE` output layer.
    CCELossWithSoftmax(CceLossWithSoftmax),
}

impl LossFunction {
    pub const NAMES: [&'static str; 4] =
        ["SquareLoss", "LogLoss", "CategoricalCrossEntropyLoss", "CCELossWithSoftmax"];

    pub fn square() -> Self {
        LossFunction::SquareLoss(SquareLoss)
    }

    pub fn log() -> Self {
        LossFunction::LogLoss(LogLoss)
    }

    pub fn categorical_cross_entropy() -> Self {
        LossFunction::CategoricalCrossEntropyLoss(CategoricalCrossEntropyLoss::default())
    }

    pub fn cce_with_softmax() -> Self {
        LossFunction::CCELossWithSoftmax(CceLossWithSoftmax::default())
    }

    /// Registry name, as stored in checkpoints.
    pub fn name(&self) -> &'static str {
        match self {
            LossFunction::SquareLoss(_) => "SquareLoss",
            LossFunction::LogLoss(_) => "LogLoss",
            LossFunction::CategoricalCrossEntropyLoss(_) => "CategoricalCrossEntropyLoss",
            LossFunction::CCELossWithSoftmax(_) => "CCELossWithSoftmax",
        }
    }

    /// Resolves a registry name; cross-entropy variants get the default epsilon.
    pub fn from_name(name: &str) -> Result<LossFunction> {
        match name {
            "SquareLoss" => Ok(LossFunction::square()),
            "LogLoss" => Ok(LossFunction::log()),
            "CategoricalCrossEntropyLoss" => Ok(LossFunction::categorical_cross_entropy()),
            "CCELossWithSoftmax" => Ok(LossFunction::cce_with_softmax()),
            other => Err(NnError::UnknownLoss(other.to_owned())),
        }
    }

    fn inner(&self) -> &dyn Loss {
        match self {
            LossFunction::SquareLoss(l) => l,
            LossFunction::LogLoss(l) => l,
            LossFunction::CategoricalCrossEntropyLoss(l) => l,
            LossFunction::CCELossWithSoftmax(l) => l,
        }
    }
}

impl Loss for LossFunction {
    fn apply(&self, label: f64, prediction: f64) -> f64 {
        self.inner().apply(label, prediction)
    }

    fn derivative(&self, label: f64, prediction: f64) -> f64 {
        self.inner().derivative(label, prediction)
    }

    fn apply_matrix(&self, labels: &Matrix, predictions: &Matrix) -> Result<Matrix> {
        self.inner().apply_matrix(labels, predictions)
    }

    fn derivative_matrix(&self, labels: &Matrix, predictions: &Matrix) -> Result<Matrix> {
        self.inner().derivative_matrix(labels, predictions)
    }
}

impl fmt::Display for LossFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LossFunction {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self> {
        LossFunction::from_name(s)
    }
}
