//! Hyperparameters of a `MoleculeModel`.
//!
//! Configs are usually read from JSON, every field but `num_tasks` and `encoder_input_dim` has a
//! default:
//!
//! ```json
//! {
//!     "num_tasks": 2,
//!     "dataset_type": "multiclass",
//!     "multiclass_num_classes": 5,
//!     "encoder_input_dim": 16,
//!     "ffn_num_layers": 3,
//!     "activation": "PReLU"
//! }
//! ```

use std::{fs, path::Path};

use machine_learning::{arch::activations::ActFn, initialization::WeightInit};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// The kind of targets a model predicts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetType {
    #[default]
    Regression,
    Classification,
    Multiclass,
}

/// Hidden stage activations, named the way users usually spell them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    #[serde(rename = "ReLU")]
    Relu,
    #[serde(rename = "LeakyReLU")]
    LeakyRelu,
    #[serde(rename = "PReLU")]
    Prelu,
    #[serde(rename = "tanh")]
    Tanh,
    #[serde(rename = "SELU")]
    Selu,
    #[serde(rename = "ELU")]
    Elu,
}

impl From<Activation> for ActFn {
    fn from(activation: Activation) -> Self {
        match activation {
            Activation::Relu => ActFn::Relu,
            Activation::LeakyRelu => ActFn::LeakyRelu,
            Activation::Prelu => ActFn::Prelu,
            Activation::Tanh => ActFn::Tanh,
            Activation::Selu => ActFn::Selu,
            Activation::Elu => ActFn::Elu,
        }
    }
}

/// How weight matrices are initialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitConfig {
    #[default]
    XavierNormal,
    XavierUniform,
}

impl From<InitConfig> for WeightInit {
    fn from(init: InitConfig) -> Self {
        match init {
            InitConfig::XavierNormal => WeightInit::XavierNormal,
            InitConfig::XavierUniform => WeightInit::XavierUniform,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub num_tasks: usize,
    #[serde(default)]
    pub dataset_type: DatasetType,
    #[serde(default = "default_num_classes")]
    pub multiclass_num_classes: usize,

    /// Width of the encoder's output.
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,
    /// Width of the molecule descriptors the encoder consumes.
    pub encoder_input_dim: usize,
    #[serde(default = "default_encoder_depth")]
    pub encoder_depth: usize,

    #[serde(default = "default_ffn_num_layers")]
    pub ffn_num_layers: usize,
    /// Defaults to `hidden_size`.
    #[serde(default)]
    pub ffn_hidden_size: Option<usize>,
    #[serde(default)]
    pub dropout: f32,
    #[serde(default)]
    pub activation: Activation,

    /// Appends the auxiliary features to the encoder output.
    #[serde(default)]
    pub use_input_features: bool,
    /// Feeds the head with the auxiliary features alone.
    #[serde(default)]
    pub features_only: bool,
    #[serde(default)]
    pub features_size: usize,

    /// Leaves the head's last projection out.
    #[serde(default)]
    pub featurizer: bool,

    #[serde(default)]
    pub init: InitConfig,
    #[serde(default)]
    pub seed: u64,
}

fn default_num_classes() -> usize {
    3
}

fn default_hidden_size() -> usize {
    300
}

fn default_encoder_depth() -> usize {
    3
}

fn default_ffn_num_layers() -> usize {
    2
}

impl ModelConfig {
    /// Creates a config with every optional field at its default.
    pub fn new(num_tasks: usize, encoder_input_dim: usize) -> Self {
        Self {
            num_tasks,
            dataset_type: DatasetType::default(),
            multiclass_num_classes: default_num_classes(),
            hidden_size: default_hidden_size(),
            encoder_input_dim,
            encoder_depth: default_encoder_depth(),
            ffn_num_layers: default_ffn_num_layers(),
            ffn_hidden_size: None,
            dropout: 0.,
            activation: Activation::default(),
            use_input_features: false,
            features_only: false,
            features_size: 0,
            featurizer: false,
            init: InitConfig::default(),
            seed: 0,
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn ffn_hidden_size(&self) -> usize {
        self.ffn_hidden_size.unwrap_or(self.hidden_size)
    }

    /// The width of the head's final projection: one value per task, or one per task and class.
    pub fn output_size(&self) -> usize {
        match self.dataset_type {
            DatasetType::Multiclass => self.num_tasks * self.multiclass_num_classes,
            _ => self.num_tasks,
        }
    }

    /// The width of the head's input.
    pub fn head_input_size(&self) -> usize {
        if self.features_only {
            return self.features_size;
        }

        if self.use_input_features {
            self.hidden_size + self.features_size
        } else {
            self.hidden_size
        }
    }

    /// Whether batches must carry auxiliary features.
    pub fn uses_features(&self) -> bool {
        self.features_only || self.use_input_features
    }

    /// Checks the ranges of every hyperparameter.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ModelError::InvalidConfig(msg));

        if self.num_tasks == 0 {
            return invalid("num_tasks must be greater than 0".into());
        }
        if self.hidden_size == 0 {
            return invalid("hidden_size must be greater than 0".into());
        }
        if self.encoder_input_dim == 0 {
            return invalid("encoder_input_dim must be greater than 0".into());
        }
        if self.encoder_depth == 0 {
            return invalid("encoder_depth must be greater than 0".into());
        }
        if self.ffn_num_layers == 0 {
            return invalid("ffn_num_layers must be greater than 0".into());
        }
        if self.ffn_hidden_size() == 0 {
            return invalid("ffn_hidden_size must be greater than 0".into());
        }
        if !(0. ..1.).contains(&self.dropout) {
            return invalid(format!("dropout ({}) must be in [0, 1)", self.dropout));
        }
        if self.dataset_type == DatasetType::Multiclass && self.multiclass_num_classes < 2 {
            return invalid(format!(
                "multiclass_num_classes ({}) must be at least 2",
                self.multiclass_num_classes
            ));
        }
        if self.uses_features() && self.features_size == 0 {
            return invalid("features_size must be greater than 0 when features are used".into());
        }

        Ok(())
    }
}
