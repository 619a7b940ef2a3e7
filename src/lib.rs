pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod metric;
pub mod optim;
pub mod train;
pub mod dataset;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{Dense, Dropout, Layer, LayerOutput, WeightInitialization};
pub use network::{CheckpointSink, DirectoryCheckpoints, Network};
pub use loss::{Loss, LossFunction};
pub use metric::{Accuracy, CategoricalAccuracy, Metric, SparseCategoricalAccuracy};
pub use optim::sgd::Sgd;
pub use train::{EpochStats, TrainingParameters, TrainingSummary};
pub use error::{NnError, Result};
