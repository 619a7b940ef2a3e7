use std::time::Instant;

use log::{debug, error, info, warn};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::train::epoch_stats::{EpochStats, TrainingSummary};
use crate::train::train_config::TrainingParameters;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` on matched batches and returns one `EpochStats` per epoch.
///
/// # Arguments
/// - `network` is modified in place
/// - `inputs`  batches of shape `(input_size, n_i)`, one sample per column
/// - `labels`  batches of shape `(output_size, n_i)`, matched by index
/// - `params`  taken by value; its epoch counter belongs to this run
///
/// # Errors
/// - `InvalidShape` before any work if a batch does not fit the network
/// - `DivergedTraining` as soon as the running epoch cost is NaN, infinite
///   or exactly zero. Weights updated so far are kept.
pub fn train_loop(
    network: &mut Network,
    inputs: &[Matrix],
    labels: &[Matrix],
    mut params: TrainingParameters,
) -> Result<TrainingSummary> {
    validate_batches(network, inputs, labels)?;
    params.validate();
    params.reset_epoch();

    let batch_count = inputs.len() as f64;
    let total_epochs = params.epoch_count;
    let mut summary = TrainingSummary::default();

    for epoch in 1..=total_epochs {
        let t_start = Instant::now();
        let learning_rate = params.learning_rate();
        let mut cost = 0.0;
        let mut accuracy = 0.0;

        for (batch, (x, y)) in inputs.iter().zip(labels).enumerate() {
            let cache = network.forward_propagate(x)?;
            let prediction = cache.last().map_or(x, |out| &out.activated);

            let batch_cost = network.compute_cost(prediction, y)?;
            cost += batch_cost / batch_count;
            debug!("epoch {epoch} batch {}: cost = {batch_cost:.6}", batch + 1);
            if !cost.is_finite() || cost == 0.0 {
                error!("training diverged at epoch {epoch}, batch {}: cost = {cost}", batch + 1);
                return Err(NnError::DivergedTraining { epoch, batch: batch + 1, cost });
            }

            accuracy += params.accuracy_metric.calculate(y, prediction)? / batch_count;
            network.back_propagate(y, &cache, &params)?;
        }

        info!("Epoch {epoch}/{total_epochs}, avg_cost: {cost:.6}, avg_accuracy: {accuracy:.4}");
        params.increment_epoch();

        let stats = EpochStats {
            epoch,
            total_epochs,
            avg_cost: cost,
            avg_accuracy: accuracy,
            learning_rate,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if let Some(ref tx) = params.progress_tx {
            if tx.send(stats.clone()).is_err() {
                debug!("progress receiver dropped");
            }
        }
        if let Some(ref sink) = params.checkpoint {
            if let Err(e) = sink.save(network, epoch) {
                warn!("could not write checkpoint for epoch {epoch}: {e}");
            }
        }

        summary.epochs.push(stats);
    }

    params.reset_epoch();
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn validate_batches(network: &Network, inputs: &[Matrix], labels: &[Matrix]) -> Result<()> {
    if inputs.is_empty() {
        return Err(NnError::InvalidShape("no training batches".to_owned()));
    }
    if inputs.len() != labels.len() {
        return Err(NnError::InvalidShape(format!(
            "{} input batches but {} label batches",
            inputs.len(),
            labels.len()
        )));
    }
    for (i, (x, y)) in inputs.iter().zip(labels).enumerate() {
        if x.row_count() != network.input_size() {
            return Err(NnError::InvalidShape(format!(
                "batch {i}: inputs have {} rows, network expects {}",
                x.row_count(),
                network.input_size()
            )));
        }
        if y.row_count() != network.output_size() {
            return Err(NnError::InvalidShape(format!(
                "batch {i}: labels have {} rows, network produces {}",
                y.row_count(),
                network.output_size()
            )));
        }
        if x.column_count() != y.column_count() {
            return Err(NnError::InvalidShape(format!(
                "batch {i}: {} input samples but {} labels",
                x.column_count(),
                y.column_count()
            )));
        }
        if x.column_count() == 0 {
            return Err(NnError::InvalidShape(format!("batch {i} is empty")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};

    use crate::activation::activation::ActivationFunction;
    use crate::layers::dense::Dense;
    use crate::layers::layer::Layer;
    use crate::loss::loss_function::LossFunction;
    use crate::metric::CategoricalAccuracy;

    fn linear(inputs: usize) -> Network {
        let dense = Dense::new(Matrix::zeros(1, inputs), Matrix::zeros(1, 1), ActivationFunction::Linear).unwrap();
        Network::new(vec![Layer::Dense(dense)], LossFunction::square()).unwrap()
    }

    #[test]
    fn shapes_are_checked_before_training() {
        let mut net = linear(2);
        let before = net.clone();
        let x = Matrix::zeros(3, 4);
        let y = Matrix::zeros(1, 4);
        let err = train_loop(&mut net, &[x], &[y], TrainingParameters::default());
        assert!(matches!(err, Err(NnError::InvalidShape(_))));
        assert_eq!(net, before);

        let x = Matrix::zeros(2, 4);
        let y = Matrix::zeros(1, 3);
        assert!(train_loop(&mut net, &[x.clone()], &[y], TrainingParameters::default()).is_err());
        assert!(train_loop(&mut net, &[x], &[], TrainingParameters::default()).is_err());
        assert!(train_loop(&mut net, &[], &[], TrainingParameters::default()).is_err());
    }

    #[test]
    fn one_stats_entry_per_epoch_is_reported() {
        let mut net = linear(1);
        let x = Matrix::new(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let y = Matrix::new(vec![vec![2.0, 4.0, 6.0]]).unwrap();
        let (tx, rx) = mpsc::channel();
        let params = TrainingParameters::default()
            .with_epochs(4)
            .with_learning_rate(0.05)
            .with_learning_rate_decay(1.0)
            .with_progress(tx);

        let summary = train_loop(&mut net, &[x], &[y], params).unwrap();
        let sent: Vec<EpochStats> = rx.try_iter().collect();
        assert_eq!(summary.epochs, sent);
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[3].epoch, 4);
        assert_eq!(sent[3].total_epochs, 4);
        assert!((sent[1].learning_rate - 0.025).abs() < 1e-12);
        assert!(sent[3].avg_cost < sent[0].avg_cost);
    }

    #[test]
    fn zero_epoch_count_means_default() {
        let mut net = linear(1);
        let x = Matrix::new(vec![vec![1.0]]).unwrap();
        let y = Matrix::new(vec![vec![1.0]]).unwrap();
        let summary = train_loop(&mut net, &[x], &[y], TrainingParameters::default().with_epochs(0)).unwrap();
        assert_eq!(summary.epochs.len(), 5);
    }

    #[test]
    fn perfect_fit_counts_as_divergence() {
        let mut net = linear(1);
        let x = Matrix::new(vec![vec![1.0]]).unwrap();
        let y = Matrix::zeros(1, 1);
        let err = train_loop(&mut net, &[x], &[y], TrainingParameters::default());
        assert!(matches!(err, Err(NnError::DivergedTraining { epoch: 1, batch: 1, cost }) if cost == 0.0));
    }

    #[test]
    fn injected_metric_is_used() {
        let dense = Dense::new(
            Matrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap(),
            Matrix::zeros(2, 1),
            ActivationFunction::Linear,
        )
        .unwrap();
        let mut net = Network::new(vec![Layer::Dense(dense)], LossFunction::square()).unwrap();
        let x = Matrix::new(vec![vec![0.9, 0.2], vec![0.1, 0.8]]).unwrap();
        let y = Matrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let params = TrainingParameters::default()
            .with_epochs(1)
            .with_learning_rate(1e-6)
            .with_metric(Arc::new(CategoricalAccuracy));
        let summary = train_loop(&mut net, &[x], &[y], params).unwrap();
        assert_eq!(summary.final_accuracy(), Some(1.0));
    }
}
