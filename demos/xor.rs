use std::sync::{mpsc, Arc};
use std::thread;

use ironnet::{
    ActivationFunction, CategoricalAccuracy, DirectoryCheckpoints, EpochStats, LossFunction, Matrix, Network,
    TrainingParameters, WeightInitialization,
};

fn main() -> ironnet::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut network = Network::random(
        &[2, 8, 2],
        &[ActivationFunction::ReLU, ActivationFunction::SoftmaxWithCCE],
        LossFunction::cce_with_softmax(),
        WeightInitialization::He,
    )?;

    // one sample per column
    let inputs = Matrix::new(vec![vec![1.0, 1.0, 0.0, 0.0], vec![0.0, 1.0, 1.0, 0.0]])?;
    let labels = ironnet::dataset::one_hot_encode(&[1, 0, 1, 0], 2)?;

    let (tx, rx) = mpsc::channel::<EpochStats>();
    let reporter = thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 500 == 0 {
                println!(
                    "Epoch {}: cost = {:.6}, accuracy = {:.2}",
                    stats.epoch, stats.avg_cost, stats.avg_accuracy
                );
            }
        }
    });

    let mut params = TrainingParameters::default()
        .with_epochs(3000)
        .with_learning_rate(0.1)
        .with_clip_value(5.0)
        .with_metric(Arc::new(CategoricalAccuracy))
        .with_progress(tx);
    if let Some(dir) = std::env::args().nth(1) {
        params = params.with_checkpoint(Arc::new(DirectoryCheckpoints::new(dir)));
    }

    let summary = network.train(&[inputs.clone()], &[labels], params)?;
    let _ = reporter.join();

    println!("{network}");
    println!("final cost: {:.6}", summary.final_cost().unwrap_or(f64::NAN));
    let predictions = network.predict(&inputs)?;
    for j in 0..inputs.column_count() {
        println!(
            "Input: [{}, {}] -> P(1) = {:.4}",
            inputs[(0, j)],
            inputs[(1, j)],
            predictions[(1, j)]
        );
    }
    Ok(())
}
