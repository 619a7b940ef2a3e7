pub mod loss_function;
pub mod square;
pub mod log_loss;
pub mod cross_entropy;

pub use loss_function::{Loss, LossFunction};
pub use square::SquareLoss;
pub use log_loss::LogLoss;
pub use cross_entropy::{CategoricalCrossEntropyLoss, CceLossWithSoftmax};
