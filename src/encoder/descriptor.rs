use machine_learning::{
    MlErr, Mode,
    arch::{ParamBlock, activations::ActFn, stages::Stage},
};
use ndarray::Array2;

use super::Encoder;
use crate::{config::ModelConfig, error::Result};

/// Encodes molecules from pooled per-molecule descriptors.
///
/// The descriptors are projected to `hidden_size` and then refined `depth - 1` times by a shared
/// hidden-to-hidden transform whose output is added back onto the projected input:
///
/// ```text
/// h0 = act(x · W_i + b_i)
/// h  = act(h0 + dropout(h) · W_h + b_h)
/// ```
#[derive(Clone, Debug)]
pub struct DescriptorEncoder {
    hidden_size: usize,
    depth: usize,
    w_i: Stage,
    w_h: Stage,
    act: Stage,
    dropout: Stage,
}

impl DescriptorEncoder {
    /// # Errors
    /// `MlErr::InvalidRate` if `dropout` is outside `[0, 1)`.
    pub fn new(
        input_dim: usize,
        hidden_size: usize,
        depth: usize,
        act_fn: ActFn,
        dropout: f32,
    ) -> Result<Self> {
        Ok(Self {
            hidden_size,
            depth,
            w_i: Stage::linear((input_dim, hidden_size)),
            w_h: Stage::linear((hidden_size, hidden_size)),
            act: Stage::activation(act_fn),
            dropout: Stage::dropout(dropout)?,
        })
    }

    fn stages(&self) -> [&Stage; 3] {
        [&self.w_i, &self.w_h, &self.act]
    }
}

impl Encoder for DescriptorEncoder {
    type Input = Array2<f32>;

    fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::new(
            config.encoder_input_dim,
            config.hidden_size,
            config.encoder_depth,
            config.activation.into(),
            config.dropout,
        )
    }

    fn output_dim(&self) -> usize {
        self.hidden_size
    }

    fn size(&self) -> usize {
        self.stages().iter().map(|stage| stage.size()).sum()
    }

    fn blocks(&self) -> Vec<ParamBlock> {
        self.stages().iter().flat_map(|stage| stage.blocks()).collect()
    }

    fn batch_size(&self, input: &Self::Input) -> usize {
        input.nrows()
    }

    fn encode(&self, params: &[f32], input: &Self::Input, mode: &mut Mode) -> Result<Array2<f32>> {
        if params.len() != self.size() {
            return Err(MlErr::SizeMismatch {
                what: "encoder parameters",
                got: params.len(),
                expected: self.size(),
            }
            .into());
        }

        let (w_i, rest) = params.split_at(self.w_i.size());
        let (w_h, act) = rest.split_at(self.w_h.size());

        let h0 = self.w_i.forward(w_i, mode, input.to_owned())?;
        let h0 = self.act.forward(act, mode, h0)?;

        let mut h = h0.clone();
        for _ in 1..self.depth {
            let message = self.dropout.forward(&[], mode, h)?;
            let message = self.w_h.forward(w_h, mode, message)?;
            h = self.act.forward(act, mode, message + &h0)?;
        }

        Ok(h)
    }
}
