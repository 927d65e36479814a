use crate::arch::activations::ActFn;

/// Describes a stage before it's built.
///
/// Assemblers produce a sequence of these and `Sequential::from_specs` interprets them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StageSpec {
    Linear { input: usize, output: usize },
    Activation(ActFn),
    Dropout { rate: f32 },
}
