use std::sync::Arc;

use approx::assert_abs_diff_eq;
use ironnet::{
    Accuracy, ActivationFunction, CategoricalAccuracy, Dense, DirectoryCheckpoints, Layer, LossFunction, Matrix,
    Network, NnError, TrainingParameters, WeightInitialization,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn columns(samples: &[&[f64]]) -> Matrix {
    Matrix::new(samples.iter().map(|s| s.to_vec()).collect()).unwrap().transpose()
}

#[test]
fn linear_regression_converges_to_least_squares() {
    let x = columns(&[&[1.0, 5.0], &[2.0, 3.0], &[3.0, -1.0], &[6.0, 4.0], &[10.0, 10.0], &[11.0, 5.0]]);
    let y = Matrix::new(vec![vec![2.0, 2.0, 4.5, 4.0, 8.0, 20.0]]).unwrap();
    let dense = Dense::new(Matrix::zeros(1, 2), Matrix::zeros(1, 1), ActivationFunction::Linear).unwrap();
    let mut network = Network::new(vec![Layer::Dense(dense)], LossFunction::square()).unwrap();

    let params = TrainingParameters::new(100_000, 0.0005, Arc::new(Accuracy::default()));
    let summary = network.train(&[x], &[y], params).unwrap();

    let first = summary.epochs[0].avg_cost;
    let last = summary.final_cost().unwrap();
    assert!(last < first);

    let prediction = network.predict(&columns(&[&[6.0, 1.0]])).unwrap();
    assert_abs_diff_eq!(prediction[(0, 0)], 9.77306421, epsilon = 1e-4);
}

#[test]
fn log_loss_on_saturated_output_diverges() {
    // Sigmoid of a huge logit is exactly 1.0, so LogLoss yields NaN for label 1.
    let dense = Dense::new(
        Matrix::new(vec![vec![1000.0]]).unwrap(),
        Matrix::zeros(1, 1),
        ActivationFunction::Sigmoid,
    )
    .unwrap();
    let mut network = Network::new(vec![Layer::Dense(dense)], LossFunction::log()).unwrap();
    let x = Matrix::new(vec![vec![1.0]]).unwrap();
    let y = Matrix::new(vec![vec![1.0]]).unwrap();

    let result = network.train(&[x], &[y], TrainingParameters::default());
    assert!(matches!(result, Err(NnError::DivergedTraining { epoch: 1, batch: 1, cost }) if cost.is_nan()));
}

#[test]
fn nan_weights_diverge_under_cross_entropy() {
    let dense = Dense::new(
        Matrix::new(vec![vec![f64::NAN, 0.0], vec![0.0, 1.0]]).unwrap(),
        Matrix::zeros(2, 1),
        ActivationFunction::SoftmaxWithCCE,
    )
    .unwrap();
    let mut network = Network::new(vec![Layer::Dense(dense)], LossFunction::cce_with_softmax()).unwrap();
    let x = Matrix::new(vec![vec![1.0], vec![1.0]]).unwrap();
    let y = Matrix::new(vec![vec![1.0], vec![0.0]]).unwrap();

    let params = TrainingParameters::default().with_metric(Arc::new(CategoricalAccuracy));
    let result = network.train(&[x], &[y], params);
    assert!(matches!(result, Err(NnError::DivergedTraining { epoch: 1, batch: 1, cost }) if cost.is_nan()));
}

#[test]
fn softmax_classifier_learns_separable_clusters() {
    let mut rng = StdRng::seed_from_u64(42);
    let init = WeightInitialization::XavierUniform;
    let mut network = Network::new(
        vec![
            Layer::Dense(Dense::random_with_rng(2, 6, ActivationFunction::Sigmoid, init, &mut rng)),
            Layer::Dense(Dense::random_with_rng(6, 2, ActivationFunction::SoftmaxWithCCE, init, &mut rng)),
        ],
        LossFunction::cce_with_softmax(),
    )
    .unwrap();
    let x = columns(&[&[2.0, 2.0], &[2.5, 1.5], &[-2.0, -2.0], &[-1.5, -2.5]]);
    let y = ironnet::dataset::one_hot_encode(&[0, 0, 1, 1], 2).unwrap();

    let params = TrainingParameters::default()
        .with_epochs(500)
        .with_learning_rate(0.5)
        .with_clip_value(10.0)
        .with_metric(Arc::new(CategoricalAccuracy));
    let summary = network.train(&[x.clone()], &[y.clone()], params).unwrap();

    assert!(summary.final_cost().unwrap() < summary.epochs[0].avg_cost);
    let accuracy = ironnet::Metric::calculate(&CategoricalAccuracy, &y, &network.predict(&x).unwrap()).unwrap();
    assert_eq!(accuracy, 1.0);
}

#[test]
fn checkpoints_are_written_every_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let dense = Dense::new(Matrix::zeros(1, 1), Matrix::zeros(1, 1), ActivationFunction::Linear).unwrap();
    let mut network = Network::new(vec![Layer::Dense(dense)], LossFunction::square()).unwrap();
    let x = Matrix::new(vec![vec![1.0, 2.0]]).unwrap();
    let y = Matrix::new(vec![vec![3.0, 5.0]]).unwrap();

    let params = TrainingParameters::default()
        .with_epochs(3)
        .with_checkpoint(Arc::new(DirectoryCheckpoints::new(dir.path())));
    network.train(&[x], &[y], params).unwrap();

    for epoch in 1..=3 {
        assert!(dir.path().join(format!("epoch_{epoch}.json")).exists());
    }
    let last = Network::load_json(dir.path().join("epoch_3.json")).unwrap();
    assert_eq!(last, network);
}

#[test]
fn clipping_bounds_the_gradient_reaching_earlier_layers() {
    let hidden = Dense::new(Matrix::new(vec![vec![1.0]]).unwrap(), Matrix::zeros(1, 1), ActivationFunction::Linear)
        .unwrap();
    let output = Dense::new(Matrix::new(vec![vec![100.0]]).unwrap(), Matrix::zeros(1, 1), ActivationFunction::Linear)
        .unwrap();
    let mut network =
        Network::new(vec![Layer::Dense(hidden), Layer::Dense(output)], LossFunction::square()).unwrap();
    let x = Matrix::new(vec![vec![1.0]]).unwrap();
    let y = Matrix::new(vec![vec![0.0]]).unwrap();

    let cache = network.forward_propagate(&x).unwrap();
    let params = TrainingParameters::default().with_learning_rate(0.1).with_clip_value(1.0);
    network.back_propagate(&y, &cache, &params).unwrap();

    // output grad 100, propagated 100 * 100, clipped to 1 before reaching the hidden layer
    match &network.layers()[0] {
        Layer::Dense(d) => assert_abs_diff_eq!(d.weights()[(0, 0)], 1.0 - 0.1, epsilon = 1e-12),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn negative_clip_value_bounds_magnitude_without_flipping_sign() {
    let unit = || Dense::new(Matrix::new(vec![vec![1.0]]).unwrap(), Matrix::zeros(1, 1), ActivationFunction::Linear);
    let mut network =
        Network::new(vec![Layer::Dense(unit().unwrap()), Layer::Dense(unit().unwrap())], LossFunction::square()).unwrap();
    let x = Matrix::new(vec![vec![1.0]]).unwrap();
    let y = Matrix::new(vec![vec![0.0]]).unwrap();

    let cache = network.forward_propagate(&x).unwrap();
    let params = TrainingParameters::default().with_learning_rate(0.1).with_clip_value(-0.5);
    network.back_propagate(&y, &cache, &params).unwrap();

    // propagated gradient +1 is clipped to +0.5, so the hidden weight steps down
    match &network.layers()[0] {
        Layer::Dense(d) => assert_abs_diff_eq!(d.weights()[(0, 0)], 1.0 - 0.05, epsilon = 1e-12),
        other => panic!("unexpected {other}"),
    }
}
