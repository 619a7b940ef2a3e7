pub mod dense;
pub mod dropout;
pub mod init;
pub mod layer;

pub use dense::Dense;
pub use dropout::Dropout;
pub use init::WeightInitialization;
pub use layer::{Layer, LayerOutput};
