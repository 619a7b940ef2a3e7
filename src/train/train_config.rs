use std::sync::mpsc;
use std::sync::Arc;

use crate::metric::{Accuracy, Metric};
use crate::network::checkpoint::CheckpointSink;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;

pub const DEFAULT_EPOCH_COUNT: usize = 5;
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Hyperparameters and hooks for one `Network::train` run.
///
/// # Fields
/// - `epoch_count`           full passes over the batches
/// - `initial_learning_rate` step size before decay
/// - `learning_rate_decay`   `lr = initial / (1 + decay * epoch)`
/// - `weight_decay`          L2 coefficient added to every gradient
/// - `clip_value`            bound on inter-layer gradients, `+inf` for none
/// - `accuracy_metric`       scores each batch's predictions
/// - `progress_tx`           receives one `EpochStats` per finished epoch
/// - `checkpoint`            receives the network after every epoch
///
/// Zero `epoch_count`, `initial_learning_rate` or `clip_value` fall back to
/// their defaults when training starts.
#[derive(Clone)]
pub struct TrainingParameters {
    pub epoch_count: usize,
    pub initial_learning_rate: f64,
    pub learning_rate_decay: f64,
    pub weight_decay: f64,
    pub clip_value: f64,
    pub accuracy_metric: Arc<dyn Metric>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub checkpoint: Option<Arc<dyn CheckpointSink>>,
    current_epoch: usize,
}

impl Default for TrainingParameters {
    fn default() -> Self {
        TrainingParameters {
            epoch_count: DEFAULT_EPOCH_COUNT,
            initial_learning_rate: DEFAULT_LEARNING_RATE,
            learning_rate_decay: 0.0,
            weight_decay: 0.0,
            clip_value: f64::INFINITY,
            accuracy_metric: Arc::new(Accuracy::default()),
            progress_tx: None,
            checkpoint: None,
            current_epoch: 0,
        }
    }
}

impl TrainingParameters {
    pub fn new(epoch_count: usize, initial_learning_rate: f64, accuracy_metric: Arc<dyn Metric>) -> Self {
        TrainingParameters { epoch_count, initial_learning_rate, accuracy_metric, ..Default::default() }
    }

    pub fn with_epochs(mut self, epoch_count: usize) -> Self {
        self.epoch_count = epoch_count;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.initial_learning_rate = learning_rate;
        self
    }

    pub fn with_learning_rate_decay(mut self, decay: f64) -> Self {
        self.learning_rate_decay = decay;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_clip_value(mut self, clip_value: f64) -> Self {
        self.clip_value = clip_value;
        self
    }

    pub fn with_metric(mut self, metric: Arc<dyn Metric>) -> Self {
        self.accuracy_metric = metric;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_checkpoint(mut self, sink: Arc<dyn CheckpointSink>) -> Self {
        self.checkpoint = Some(sink);
        self
    }

    /// Replaces zero values with defaults.
    pub fn validate(&mut self) {
        if self.epoch_count == 0 {
            self.epoch_count = DEFAULT_EPOCH_COUNT;
        }
        if self.initial_learning_rate == 0.0 {
            self.initial_learning_rate = DEFAULT_LEARNING_RATE;
        }
        self.clip_value = self.clip_bound();
    }

    /// Magnitude gradients are clipped to. Zero or NaN means unbounded and
    /// the sign of a negative value is dropped.
    pub fn clip_bound(&self) -> f64 {
        if self.clip_value == 0.0 || self.clip_value.is_nan() {
            f64::INFINITY
        } else {
            self.clip_value.abs()
        }
    }

    pub fn current_epoch(&self) -> usize {
        self.current_epoch
    }

    pub fn reset_epoch(&mut self) {
        self.current_epoch = 0;
    }

    pub fn increment_epoch(&mut self) {
        self.current_epoch += 1;
    }

    pub fn learning_rate(&self) -> f64 {
        self.initial_learning_rate / (1.0 + self.learning_rate_decay * self.current_epoch as f64)
    }

    /// Update rule for the current epoch.
    pub fn optimizer(&self) -> Sgd {
        Sgd::new(self.learning_rate(), self.weight_decay)
    }
}
