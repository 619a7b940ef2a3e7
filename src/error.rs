use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Every failure the matrix engine, the layers and the trainer can report.
#[derive(Debug, Error)]
pub enum NnError {
    /// Elementwise operation on matrices of different sizes.
    #[error("dimension mismatch: {left:?} vs {right:?}")]
    DimensionMismatch { left: (usize, usize), right: (usize, usize) },

    /// Matrix product where `left.cols != right.rows`.
    #[error("matrices are not conformable under multiplication: {left:?} x {right:?}")]
    NotConformable { left: (usize, usize), right: (usize, usize) },

    #[error("index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange { row: usize, col: usize, rows: usize, cols: usize },

    #[error("cannot broadcast {from:?} to {to:?}: target must be a positive multiple")]
    InvalidBroadcast { from: (usize, usize), to: (usize, usize) },

    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix is singular")]
    SingularMatrix,

    /// Empty or ragged literal data, or an incomplete checkpoint record.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid bias size: expected {expected}x1, got {got:?}")]
    InvalidBiasSize { expected: usize, got: (usize, usize) },

    /// Training samples, labels or layer chain do not line up.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("dropout rate must be in [0, 1), got {0}")]
    InvalidDropoutRate(f64),

    #[error("unknown activation function: {0}")]
    UnknownActivation(String),

    #[error("unknown loss function: {0}")]
    UnknownLoss(String),

    #[error("unknown layer type: {0}")]
    UnknownLayerType(String),

    /// Cost became NaN, infinite or exactly zero. Weights already updated are kept.
    #[error("training diverged at epoch {epoch}, batch {batch}: cost = {cost}")]
    DivergedTraining { epoch: usize, batch: usize, cost: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
