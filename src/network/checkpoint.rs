//! On-disk checkpoint format.
//!
//! ```json
//! { "Layers": [ { "Weights": [[...]], "Bias": [[...]], "Activation": "ReLU", "Type": "Dense" },
//!               { "InputSize": 3, "Rate": 0.2, "Type": "Dropout" } ],
//!   "LossFunction": "SquareLoss" }
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::layers::dense::Dense;
use crate::layers::dropout::Dropout;
use crate::layers::layer::Layer;
use crate::loss::loss_function::LossFunction;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct NetworkCheckpoint {
    pub layers: Vec<LayerCheckpoint>,
    pub loss_function: String,
}

/// Flat record; which fields are present depends on `Type`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LayerCheckpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Matrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias: Option<Matrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl From<&Layer> for LayerCheckpoint {
    fn from(layer: &Layer) -> Self {
        match layer {
            Layer::Dense(d) => LayerCheckpoint {
                weights: Some(d.weights().clone()),
                bias: Some(d.bias().clone()),
                activation: Some(d.activation().name().to_owned()),
                input_size: None,
                rate: None,
                kind: "Dense".to_owned(),
            },
            Layer::Dropout(d) => LayerCheckpoint {
                weights: None,
                bias: None,
                activation: None,
                input_size: Some(d.input_size()),
                rate: Some(d.rate()),
                kind: "Dropout".to_owned(),
            },
        }
    }
}

fn missing(kind: &str, field: &str) -> NnError {
    NnError::InvalidData(format!("{kind} layer is missing \"{field}\""))
}

impl TryFrom<LayerCheckpoint> for Layer {
    type Error = NnError;

    fn try_from(c: LayerCheckpoint) -> Result<Layer> {
        match c.kind.as_str() {
            "Dense" => {
                let weights = c.weights.ok_or_else(|| missing("Dense", "Weights"))?;
                let bias = c.bias.ok_or_else(|| missing("Dense", "Bias"))?;
                let name = c.activation.ok_or_else(|| missing("Dense", "Activation"))?;
                let activation = ActivationFunction::from_name(&name)?;
                Ok(Layer::Dense(Dense::new(weights, bias, activation)?))
            }
            "Dropout" => {
                let input_size = c.input_size.ok_or_else(|| missing("Dropout", "InputSize"))?;
                let rate = c.rate.ok_or_else(|| missing("Dropout", "Rate"))?;
                Ok(Layer::Dropout(Dropout::new(input_size, rate)?))
            }
            other => Err(NnError::UnknownLayerType(other.to_owned())),
        }
    }
}

impl From<&Network> for NetworkCheckpoint {
    fn from(network: &Network) -> Self {
        NetworkCheckpoint {
            layers: network.layers().iter().map(LayerCheckpoint::from).collect(),
            loss_function: network.loss().name().to_owned(),
        }
    }
}

impl TryFrom<NetworkCheckpoint> for Network {
    type Error = NnError;

    fn try_from(c: NetworkCheckpoint) -> Result<Network> {
        let loss = LossFunction::from_name(&c.loss_function)?;
        let layers = c.layers.into_iter().map(Layer::try_from).collect::<Result<Vec<_>>>()?;
        Network::new(layers, loss)
    }
}

/// Receives the network at the end of every epoch.
pub trait CheckpointSink: Send + Sync {
    fn save(&self, network: &Network, epoch: usize) -> Result<()>;
}

/// Writes `<dir>/epoch_<n>.json`, creating `dir` if needed.
#[derive(Debug, Clone)]
pub struct DirectoryCheckpoints {
    pub dir: PathBuf,
}

impl DirectoryCheckpoints {
    pub fn new(dir: impl Into<PathBuf>) -> DirectoryCheckpoints {
        DirectoryCheckpoints { dir: dir.into() }
    }

    pub fn path_for(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("epoch_{epoch}.json"))
    }
}

impl CheckpointSink for DirectoryCheckpoints {
    fn save(&self, network: &Network, epoch: usize) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        network.save_json(self.path_for(epoch))
    }
}
