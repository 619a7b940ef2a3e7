//! Helpers that turn per-sample rows into the column-batched matrices the
//! network trains on.

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Splits `samples` (one `Vec` per sample) into batches of at most
/// `batch_size` samples, each batch a `(features, n)` matrix.
///
/// The last batch holds the remainder. A `batch_size` of zero puts every
/// sample in one batch.
pub fn batch_samples(samples: &[Vec<f64>], batch_size: usize) -> Result<Vec<Matrix>> {
    if samples.is_empty() {
        return Err(NnError::InvalidData("no samples to batch".to_owned()));
    }
    let size = if batch_size == 0 { samples.len() } else { batch_size };
    samples
        .chunks(size)
        .map(|chunk| Matrix::new(chunk.to_vec()).map(|m| m.transpose()))
        .collect()
}

/// Class indices become a `(class_count, n)` matrix of one-hot columns.
pub fn one_hot_encode(labels: &[usize], class_count: usize) -> Result<Matrix> {
    if let Some(&bad) = labels.iter().find(|&&label| label >= class_count) {
        return Err(NnError::InvalidData(format!("label {bad} out of range for {class_count} classes")));
    }
    Ok(Matrix::from_fn(class_count, labels.len(), |i, j| if labels[j] == i { 1.0 } else { 0.0 }))
}
