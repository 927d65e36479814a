use crate::{
    config::{DatasetType, ModelConfig},
    error::{ModelError, Result},
};

/// The raw mode flags of a model.
///
/// At most one of `classification` and `multiclass` may be set, `OutputMode::from_flags` is the
/// single place enforcing it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskFlags {
    pub featurizer: bool,
    pub classification: bool,
    pub multiclass: bool,
}

impl TaskFlags {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            featurizer: config.featurizer,
            classification: config.dataset_type == DatasetType::Classification,
            multiclass: config.dataset_type == DatasetType::Multiclass,
        }
    }
}

/// How the head's output is post-processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Raw values.
    Regression,
    /// Sigmoid probabilities at inference, logits while training.
    Classification,
    /// `[batch, tasks, num_classes]`, softmax over classes at inference.
    Multiclass { num_classes: usize },
}

impl OutputMode {
    /// Resolves the output mode from the classification flags.
    ///
    /// # Errors
    /// `ModelError::ConfigurationConflict` if both flags are set.
    pub fn from_flags(flags: TaskFlags, num_classes: usize) -> Result<Self> {
        match (flags.classification, flags.multiclass) {
            (true, true) => Err(ModelError::ConfigurationConflict),
            (true, false) => Ok(Self::Classification),
            (false, true) => Ok(Self::Multiclass { num_classes }),
            (false, false) => Ok(Self::Regression),
        }
    }

    /// The width of the head's final projection for `num_tasks` tasks.
    pub fn output_size(&self, num_tasks: usize) -> usize {
        match *self {
            Self::Multiclass { num_classes } => num_tasks * num_classes,
            _ => num_tasks,
        }
    }
}
