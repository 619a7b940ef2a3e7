use crate::loss::loss_function::Loss;

/// Halved squared error, for regression heads.
///
///   cost  = 0.5 * (y - p)^2
///   dcost = p - y
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SquareLoss;

impl Loss for SquareLoss {
    fn apply(&self, label: f64, prediction: f64) -> f64 {
        0.5 * (label - prediction).powi(2)
    }

    fn derivative(&self, label: f64, prediction: f64) -> f64 {
        prediction - label
    }
}
