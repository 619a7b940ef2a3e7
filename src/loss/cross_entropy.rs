use crate::error::Result;
use crate::loss::loss_function::Loss;
use crate::math::matrix::Matrix;

/// Floor applied to predictions before `ln` and division.
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Categorical cross-entropy over one-hot (or soft) labels.
///
/// The prediction is floored at `epsilon`, never the label:
///
///   cost  = -y * ln(max(p, epsilon))
///   dcost = -y / max(p, epsilon)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoricalCrossEntropyLoss {
    pub epsilon: f64,
}

impl CategoricalCrossEntropyLoss {
    pub fn new(epsilon: f64) -> Self {
        CategoricalCrossEntropyLoss { epsilon }
    }

    // NaN must survive so a diverged network still reports a NaN cost.
    fn floor(&self, prediction: f64) -> f64 {
        if prediction.is_nan() {
            prediction
        } else {
            prediction.max(self.epsilon)
        }
    }
}

impl Default for CategoricalCrossEntropyLoss {
    fn default() -> Self {
        CategoricalCrossEntropyLoss { epsilon: DEFAULT_EPSILON }
    }
}

impl Loss for CategoricalCrossEntropyLoss {
    fn apply(&self, label: f64, prediction: f64) -> f64 {
        -label * self.floor(prediction).ln()
    }

    fn derivative(&self, label: f64, prediction: f64) -> f64 {
        -label / self.floor(prediction)
    }
}

/// Cross-entropy fused with a softmax output.
///
/// Shares the cost of [`CategoricalCrossEntropyLoss`] but returns the
/// gradient with respect to the softmax *input*:
///
///   dL/dZ = p - y
///
/// Only correct when the last layer uses `SoftmaxWithCCE`, whose backward
/// step passes this gradient through untouched. Nothing checks the pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CceLossWithSoftmax {
    pub cross_entropy: CategoricalCrossEntropyLoss,
}

impl CceLossWithSoftmax {
    pub fn new(epsilon: f64) -> Self {
        CceLossWithSoftmax { cross_entropy: CategoricalCrossEntropyLoss::new(epsilon) }
    }
}

impl Loss for CceLossWithSoftmax {
    fn apply(&self, label: f64, prediction: f64) -> f64 {
        self.cross_entropy.apply(label, prediction)
    }

    fn derivative(&self, label: f64, prediction: f64) -> f64 {
        prediction - label
    }

    fn derivative_matrix(&self, labels: &Matrix, predictions: &Matrix) -> Result<Matrix> {
        predictions.subtract(labels)
    }
}
