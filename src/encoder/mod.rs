mod descriptor;

use machine_learning::{Mode, arch::ParamBlock};
use ndarray::Array2;

pub use descriptor::DescriptorEncoder;

use crate::{config::ModelConfig, error::Result};

/// Turns a batch of molecules into one fixed-width vector per molecule.
///
/// Encoders don't own their parameters, the model hands them their slice of its flat buffer on
/// every call.
pub trait Encoder: Sized {
    /// A batch of molecules, in whatever representation the encoder consumes.
    type Input;

    /// Builds the encoder the config describes.
    fn from_config(config: &ModelConfig) -> Result<Self>;

    /// The width of every encoded vector.
    fn output_dim(&self) -> usize;

    /// The amount of parameters the encoder needs.
    fn size(&self) -> usize;

    /// The encoder's parameter blocks, in buffer order.
    fn blocks(&self) -> Vec<ParamBlock>;

    /// The amount of molecules in `input`.
    fn batch_size(&self, input: &Self::Input) -> usize;

    /// Encodes `input` into a `[batch, output_dim]` array.
    fn encode(&self, params: &[f32], input: &Self::Input, mode: &mut Mode) -> Result<Array2<f32>>;
}
