use log::debug;
use ndarray::{Array2, ArrayView2};

use super::{
    ParamBlock,
    stages::{Stage, StageSpec},
};
use crate::{MlErr, Mode, Result};

/// A sequential model: information flows forward through its stages in order.
///
/// The parameters are not owned by the model, each forward call receives a flat slice holding the
/// parameters of every stage back to back.
#[derive(Clone, Debug)]
pub struct Sequential {
    stages: Vec<Stage>,
}

impl Sequential {
    /// Builds a `Sequential` by interpreting a sequence of stage descriptors.
    ///
    /// # Errors
    /// Any error building one of the stages, i.e. an invalid dropout rate.
    pub fn from_specs<I>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = StageSpec>,
    {
        let stages = specs
            .into_iter()
            .map(Stage::from_spec)
            .collect::<Result<Vec<_>>>()?;

        debug!(stages = stages.len(); "built sequential");
        Ok(Self { stages })
    }

    /// Returns the descriptors of every stage, in order.
    pub fn specs(&self) -> Vec<StageSpec> {
        self.stages.iter().map(Stage::spec).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.stages.iter().map(Stage::size).sum()
    }

    /// Returns the amount of parameters held by the first `n` stages.
    pub fn prefix_size(&self, n: usize) -> usize {
        self.stages.iter().take(n).map(Stage::size).sum()
    }

    /// The parameter blocks of every stage, in buffer order.
    pub fn blocks(&self) -> Vec<ParamBlock> {
        self.stages.iter().flat_map(Stage::blocks).collect()
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The parameters of every stage, `size()` values long.
    /// * `mode` - The phase of the pass.
    /// * `x` - The input data.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&self, params: &[f32], mode: &mut Mode, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.forward_prefix(self.stages.len(), params, mode, x)
    }

    /// Makes a forward pass through the first `n` stages only.
    ///
    /// `params` may hold the parameters of every stage or only of the first `n`.
    pub fn forward_prefix(
        &self,
        n: usize,
        params: &[f32],
        mode: &mut Mode,
        x: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        let n = n.min(self.stages.len());
        let needed = self.prefix_size(n);

        if params.len() < needed {
            return Err(MlErr::SizeMismatch {
                what: "sequential parameters",
                got: params.len(),
                expected: needed,
            });
        }

        let mut rest = params;
        let mut x = x.to_owned();

        for stage in &self.stages[..n] {
            let (params, tail) = rest.split_at(stage.size());
            rest = tail;
            x = stage.forward(params, mode, x)?;
        }

        Ok(x)
    }
}
