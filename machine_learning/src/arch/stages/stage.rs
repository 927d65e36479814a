use ndarray::Array2;

use super::StageSpec;
use crate::{Mode, Result, arch::ParamBlock, arch::activations::ActFn};

#[derive(Clone, Debug)]
pub enum Stage {
    Linear(super::Linear),
    Activation(ActFn),
    Dropout(super::Dropout),
}

impl Stage {
    pub fn linear(dim: (usize, usize)) -> Self {
        Self::Linear(super::Linear::new(dim))
    }

    pub fn activation(act_fn: ActFn) -> Self {
        Self::Activation(act_fn)
    }

    pub fn dropout(rate: f32) -> Result<Self> {
        Ok(Self::Dropout(super::Dropout::new(rate)?))
    }

    /// Builds the stage a `StageSpec` describes.
    pub fn from_spec(spec: StageSpec) -> Result<Self> {
        match spec {
            StageSpec::Linear { input, output } => Ok(Self::linear((input, output))),
            StageSpec::Activation(act_fn) => Ok(Self::activation(act_fn)),
            StageSpec::Dropout { rate } => Self::dropout(rate),
        }
    }

    /// Returns the descriptor this stage was built from.
    pub fn spec(&self) -> StageSpec {
        match self {
            Self::Linear(l) => {
                let (input, output) = l.dim();
                StageSpec::Linear { input, output }
            }
            Self::Activation(a) => StageSpec::Activation(*a),
            Self::Dropout(d) => StageSpec::Dropout { rate: d.rate() },
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Linear(l) => l.size(),
            Self::Activation(a) => a.size(),
            Self::Dropout(_) => 0,
        }
    }

    pub fn blocks(&self) -> Vec<ParamBlock> {
        match self {
            Self::Linear(l) => l.blocks().to_vec(),
            Self::Activation(a) if a.size() > 0 => vec![ParamBlock::Slope { len: a.size() }],
            Self::Activation(_) | Self::Dropout(_) => Vec::new(),
        }
    }

    pub fn forward(&self, params: &[f32], mode: &mut Mode, mut x: Array2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Linear(l) => l.forward(params, x.view()),
            Self::Activation(a) => {
                a.apply(params, x.view_mut());
                Ok(x)
            }
            Self::Dropout(d) => {
                d.apply(mode, x.view_mut());
                Ok(x)
            }
        }
    }
}
