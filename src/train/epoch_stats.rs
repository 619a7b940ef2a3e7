use serde::{Deserialize, Serialize};

/// Per-epoch figures, sent on `progress_tx` and collected in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean batch cost over the epoch.
    pub avg_cost: f64,
    /// Mean batch accuracy in [0, 1].
    pub avg_accuracy: f64,
    /// Learning rate the epoch ran with.
    pub learning_rate: f64,
    pub elapsed_ms: u64,
}

/// Everything a finished `train` call reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub epochs: Vec<EpochStats>,
}

impl TrainingSummary {
    pub fn final_cost(&self) -> Option<f64> {
        self.epochs.last().map(|s| s.avg_cost)
    }

    pub fn final_accuracy(&self) -> Option<f64> {
        self.epochs.last().map(|s| s.avg_accuracy)
    }
}
