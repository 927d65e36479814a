mod flags;
mod head;
mod output;

use log::{debug, info, warn};
use machine_learning::{
    MlErr, Mode,
    arch::{
        Sequential,
        activations::{sigmoid_inplace, softmax_inplace},
        stages::StageSpec,
    },
    initialization::{self, WeightInit},
};
use ndarray::{Array2, Axis, concatenate};
use rand::{SeedableRng, rngs::StdRng};

pub use flags::{OutputMode, TaskFlags};
pub use head::{HeadLayout, HeadShape, layout};
pub use output::{Batch, Output, RunMode};

use crate::{
    config::ModelConfig,
    encoder::{DescriptorEncoder, Encoder},
    error::{ModelError, Result},
};

/// Where the head's input comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Embedding {
    Encoder,
    EncoderAndFeatures { features_size: usize },
    /// The encoder is still built and initialized but never run.
    FeaturesOnly { features_size: usize },
}

impl Embedding {
    fn from_config(config: &ModelConfig) -> Self {
        let features_size = config.features_size;

        if config.features_only {
            Self::FeaturesOnly { features_size }
        } else if config.use_input_features {
            Self::EncoderAndFeatures { features_size }
        } else {
            Self::Encoder
        }
    }

    fn width(&self, encoder_dim: usize) -> usize {
        match *self {
            Self::Encoder => encoder_dim,
            Self::EncoderAndFeatures { features_size } => encoder_dim + features_size,
            Self::FeaturesOnly { features_size } => features_size,
        }
    }
}

/// A molecular property predictor: an encoder followed by a feed-forward head.
///
/// The model owns a flat parameter buffer laid out as `[encoder | head]`, stages read their slice
/// of it on every call. Training code updates it through `params_mut`.
#[derive(Clone, Debug)]
pub struct MoleculeModel<E: Encoder> {
    encoder: E,
    embedding: Embedding,
    head: Sequential,
    feature_stages: usize,
    output_mode: OutputMode,
    featurizer: bool,
    num_tasks: usize,
    params: Vec<f32>,
}

/// Builds a model around a `DescriptorEncoder`, see `MoleculeModel::build`.
pub fn build_model(config: &ModelConfig) -> Result<MoleculeModel<DescriptorEncoder>> {
    MoleculeModel::build(config)
}

impl<E: Encoder> MoleculeModel<E> {
    /// Validates `config`, builds its encoder and assembles the model.
    ///
    /// # Errors
    /// `ModelError::InvalidConfig` for out of range hyperparameters, or any error building the
    /// encoder.
    pub fn build(config: &ModelConfig) -> Result<Self> {
        config.validate()?;

        let encoder = E::from_config(config)?;
        Self::assemble(config, TaskFlags::from_config(config), encoder)
    }

    /// Assembles a model from an already built encoder and initializes its parameters.
    ///
    /// `flags` decide the output mode and whether the head is truncated, `config` provides
    /// every width and rate.
    ///
    /// # Errors
    /// `ModelError::ConfigurationConflict` if both classification flags are set. Nothing is
    /// built in that case.
    pub fn assemble(config: &ModelConfig, flags: TaskFlags, encoder: E) -> Result<Self> {
        let output_mode = OutputMode::from_flags(flags, config.multiclass_num_classes)?;
        let output_size = output_mode.output_size(config.num_tasks);
        let embedding = Embedding::from_config(config);

        let shape = HeadShape {
            input: embedding.width(encoder.output_dim()),
            hidden: config.ffn_hidden_size(),
            output: output_size,
            depth: config.ffn_num_layers,
            dropout: config.dropout,
            act_fn: config.activation.into(),
        };

        if flags.featurizer && shape.depth == 1 {
            warn!("a single stage head has no projection to leave out, the featurizer keeps it");
        }

        let HeadLayout {
            specs,
            feature_stages,
        } = head::layout(shape, flags.featurizer);
        let head = Sequential::from_specs(specs)?;

        let mut model = Self {
            encoder,
            embedding,
            head,
            feature_stages,
            output_mode,
            featurizer: flags.featurizer,
            num_tasks: config.num_tasks,
            params: Vec::new(),
        };

        model.params = vec![0.; model.num_params()];
        model.initialize(config.init.into(), config.seed)?;

        info!(
            "assembled {:?} model: {} encoder params, {} head stages, {} head params",
            model.output_mode,
            model.encoder.size(),
            model.head.len(),
            model.head.size()
        );
        debug!(input = shape.input, hidden = shape.hidden, output = output_size; "head widths");

        Ok(model)
    }

    /// Re-initializes every parameter: Xavier weights, zero biases and default activation
    /// slopes. Deterministic for a given `seed`.
    pub fn initialize(&mut self, init: WeightInit, seed: u64) -> Result<()> {
        let mut blocks = self.encoder.blocks();
        blocks.extend(self.head.blocks());

        initialization::initialize(&mut self.params, &blocks, init, seed)?;
        Ok(())
    }

    /// Runs the model on `batch`.
    ///
    /// Featurizers return the truncated head's output as is. Otherwise regression outputs are
    /// raw, classification outputs are probabilities at inference and logits while training,
    /// and multiclass outputs are reshaped to `[batch, tasks, classes]` and normalized over
    /// classes at inference only.
    pub fn forward(&self, batch: &Batch<E::Input>, run_mode: RunMode) -> Result<Output> {
        let mut rng = Self::rng(run_mode);
        let mut mode = Self::mode(&mut rng);

        let x = self.embed(batch, &mut mode)?;
        let mut output = self.head.forward(self.head_params(), &mut mode, x.view())?;

        if self.featurizer {
            return Ok(Output::Flat(output));
        }

        match self.output_mode {
            OutputMode::Regression => Ok(Output::Flat(output)),
            OutputMode::Classification => {
                if !run_mode.is_training() {
                    sigmoid_inplace(&mut output);
                }

                Ok(Output::Flat(output))
            }
            OutputMode::Multiclass { num_classes } => {
                let (batch_size, width) = output.dim();
                let mut output = output
                    .into_shape_with_order((batch_size, self.num_tasks, num_classes))
                    .map_err(|_| MlErr::SizeMismatch {
                        what: "multiclass output width",
                        got: width,
                        expected: self.num_tasks * num_classes,
                    })?;

                if !run_mode.is_training() {
                    softmax_inplace(&mut output, Axis(2));
                }

                Ok(Output::PerClass(output))
            }
        }
    }

    /// Computes feature vectors for `batch`: the output of every head stage a featurizer would
    /// keep, whatever mode the model was built in.
    pub fn featurize(&self, batch: &Batch<E::Input>, run_mode: RunMode) -> Result<Array2<f32>> {
        let mut rng = Self::rng(run_mode);
        let mut mode = Self::mode(&mut rng);

        let x = self.embed(batch, &mut mode)?;
        let features =
            self.head
                .forward_prefix(self.feature_stages, self.head_params(), &mut mode, x.view())?;

        Ok(features)
    }

    /// Builds the head's input: the encoder output, extended with or replaced by the auxiliary
    /// features as configured.
    fn embed(&self, batch: &Batch<E::Input>, mode: &mut Mode) -> Result<Array2<f32>> {
        let batch_size = self.encoder.batch_size(&batch.molecules);

        let features = match self.embedding {
            Embedding::Encoder => None,
            Embedding::EncoderAndFeatures { features_size }
            | Embedding::FeaturesOnly { features_size } => {
                let features = batch.features.as_ref().ok_or(ModelError::MissingFeatures)?;
                check_size("auxiliary features width", features.ncols(), features_size)?;
                check_size("auxiliary features rows", features.nrows(), batch_size)?;
                Some(features)
            }
        };

        if let (Embedding::FeaturesOnly { .. }, Some(features)) = (self.embedding, features) {
            return Ok(features.to_owned());
        }

        let encoded = self
            .encoder
            .encode(self.encoder_params(), &batch.molecules, mode)?;
        check_size("encoder output width", encoded.ncols(), self.encoder.output_dim())?;

        let Some(features) = features else {
            return Ok(encoded);
        };

        let embedded = concatenate(Axis(1), &[encoded.view(), features.view()]).map_err(|_| {
            MlErr::SizeMismatch {
                what: "auxiliary features rows",
                got: features.nrows(),
                expected: encoded.nrows(),
            }
        })?;

        Ok(embedded)
    }

    fn rng(run_mode: RunMode) -> Option<StdRng> {
        match run_mode {
            RunMode::Training { seed } => Some(StdRng::seed_from_u64(seed)),
            RunMode::Inference => None,
        }
    }

    fn mode(rng: &mut Option<StdRng>) -> Mode<'_> {
        match rng {
            Some(rng) => Mode::Train(rng),
            None => Mode::Eval,
        }
    }

    fn encoder_params(&self) -> &[f32] {
        &self.params[..self.encoder.size()]
    }

    fn head_params(&self) -> &[f32] {
        &self.params[self.encoder.size()..]
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn head(&self) -> &Sequential {
        &self.head
    }

    /// The head's stage descriptors, in order.
    pub fn head_stages(&self) -> Vec<StageSpec> {
        self.head.specs()
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn is_featurizer(&self) -> bool {
        self.featurizer
    }

    pub fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    /// The width of the head's output before any reshaping.
    pub fn output_size(&self) -> usize {
        self.head
            .specs()
            .iter()
            .rev()
            .find_map(|spec| match *spec {
                StageSpec::Linear { output, .. } => Some(output),
                _ => None,
            })
            .unwrap_or_else(|| self.embedding.width(self.encoder.output_dim()))
    }

    /// Returns the amount of parameters in the model.
    pub fn num_params(&self) -> usize {
        self.encoder.size() + self.head.size()
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    /// Replaces every parameter.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if `params` is not `num_params()` long.
    pub fn load_params(&mut self, params: &[f32]) -> Result<()> {
        check_size("model parameters", params.len(), self.params.len())?;
        self.params.copy_from_slice(params);
        Ok(())
    }
}

fn check_size(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        }
        .into());
    }

    Ok(())
}
