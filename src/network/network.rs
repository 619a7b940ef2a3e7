use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::warn;

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::Dense;
use crate::layers::init::WeightInitialization;
use crate::layers::layer::{Layer, LayerOutput};
use crate::loss::loss_function::{Loss, LossFunction};
use crate::math::matrix::Matrix;
use crate::network::checkpoint::NetworkCheckpoint;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainingParameters;
use crate::train::TrainingSummary;

/// An ordered stack of layers with one loss on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
    loss: LossFunction,
}

impl Network {
    /// Fails with `InvalidShape` when `layers` is empty or two neighbours
    /// disagree on size.
    pub fn new(layers: Vec<Layer>, loss: LossFunction) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::InvalidShape("a network needs at least one layer".to_owned()));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(NnError::InvalidShape(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].output_size(),
                    i + 1,
                    pair[1].input_size()
                )));
            }
        }

        let fused_output = matches!(
            layers.last(),
            Some(Layer::Dense(d)) if d.activation() == ActivationFunction::SoftmaxWithCCE
        );
        if matches!(loss, LossFunction::CCELossWithSoftmax(_)) != fused_output {
            warn!("CCELossWithSoftmax and a SoftmaxWithCCE output layer should be used together");
        }

        Ok(Network { layers, loss })
    }

    /// Dense stack with `sizes[i] -> sizes[i + 1]` using `activations[i]`.
    pub fn random(
        sizes: &[usize],
        activations: &[ActivationFunction],
        loss: LossFunction,
        init: WeightInitialization,
    ) -> Result<Network> {
        if sizes.len() < 2 || activations.len() != sizes.len() - 1 {
            return Err(NnError::InvalidShape(format!(
                "{} layer sizes need {} activations, got {}",
                sizes.len(),
                sizes.len().saturating_sub(1),
                activations.len()
            )));
        }
        let layers = sizes
            .windows(2)
            .zip(activations)
            .map(|(pair, &activation)| Layer::Dense(Dense::random(pair[0], pair[1], activation, init)))
            .collect();
        Network::new(layers, loss)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn loss(&self) -> LossFunction {
        self.loss
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::output_size)
    }

    /// Inference pass. Training-only layers are skipped.
    pub fn predict(&self, x: &Matrix) -> Result<Matrix> {
        let mut current = x.deep_copy();
        for layer in self.layers.iter().filter(|l| !l.is_training()) {
            current = layer.forward_propagate(&current)?.activated;
        }
        Ok(current)
    }

    /// Training pass. Entry `0` is the input itself and entry `i + 1` is
    /// layer `i`'s output.
    pub fn forward_propagate(&self, x: &Matrix) -> Result<Vec<LayerOutput>> {
        let mut cache = Vec::with_capacity(self.layers.len() + 1);
        cache.push(LayerOutput::input(x));
        for layer in &self.layers {
            let next = {
                let input = &cache[cache.len() - 1].activated;
                layer.forward_propagate(input)?
            };
            cache.push(next);
        }
        Ok(cache)
    }

    /// Runs the backward pass and updates every layer once.
    ///
    /// The gradient each layer hands to its predecessor is clipped to
    /// `[-clip_value, clip_value]`.
    pub fn back_propagate(&mut self, y: &Matrix, cache: &[LayerOutput], params: &TrainingParameters) -> Result<()> {
        if cache.len() != self.layers.len() + 1 {
            return Err(NnError::InvalidShape(format!(
                "cache has {} entries for {} layers",
                cache.len(),
                self.layers.len()
            )));
        }
        let optimizer = params.optimizer();
        let clip = params.clip_bound();
        let mut grad = self.loss.derivative_matrix(y, &cache[self.layers.len()].activated)?;
        for (j, layer) in self.layers.iter_mut().enumerate().rev() {
            grad = layer
                .back_propagate(&grad, &cache[j].activated, &cache[j + 1], &optimizer)?
                .clip(-clip, clip);
        }
        Ok(())
    }

    /// Mean per-sample cost of a batch.
    pub fn compute_cost(&self, prediction: &Matrix, label: &Matrix) -> Result<f64> {
        let costs = self.loss.apply_matrix(label, prediction)?;
        Ok(costs.sum() / costs.column_count() as f64)
    }

    /// Mini-batch gradient descent over matched `(inputs[i], labels[i])` batches.
    pub fn train(&mut self, inputs: &[Matrix], labels: &[Matrix], params: TrainingParameters) -> Result<TrainingSummary> {
        train_loop(self, inputs, labels, params)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&NetworkCheckpoint::from(self))?)
    }

    pub fn from_json_str(json: &str) -> Result<Network> {
        let checkpoint: NetworkCheckpoint = serde_json::from_str(json)?;
        Network::try_from(checkpoint)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &NetworkCheckpoint::from(self))?;
        Ok(())
    }

    /// Reads a network previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let reader = BufReader::new(File::open(path)?);
        let checkpoint: NetworkCheckpoint = serde_json::from_reader(reader)?;
        Network::try_from(checkpoint)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network{{{} -> {}, loss: {}}}", self.input_size(), self.output_size(), self.loss)?;
        for layer in &self.layers {
            writeln!(f, "  {layer}")?;
        }
        Ok(())
    }
}
