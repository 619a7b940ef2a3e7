use crate::loss::loss_function::Loss;

/// Binary log loss, for sigmoid heads.
///
///   cost  = -y * ln(p) - (1 - y) * ln(1 - p)
///   dcost = (p - y) / (p - p^2)
///
/// Both blow up at `p ∈ {0, 1}`. The trainer's gradient clipping and its
/// divergence check are what keep a run from silently producing NaN weights.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogLoss;

impl Loss for LogLoss {
    fn apply(&self, label: f64, prediction: f64) -> f64 {
        -label * prediction.ln() - (1.0 - label) * (1.0 - prediction).ln()
    }

    fn derivative(&self, label: f64, prediction: f64) -> f64 {
        (prediction - label) / (prediction - prediction * prediction)
    }
}
