pub mod matrix;
pub mod scalar;

pub use matrix::Matrix;
pub use scalar::Scalar;
