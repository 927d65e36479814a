/// A contiguous run of parameters inside a flat parameter buffer.
///
/// Initializers walk a model's blocks in buffer order to decide how to fill each run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamBlock {
    /// A `(fan_in, fan_out)` weight matrix.
    Weight { fan_in: usize, fan_out: usize },
    /// A bias vector.
    Bias { len: usize },
    /// Trainable activation slopes.
    Slope { len: usize },
}

impl ParamBlock {
    /// Returns the amount of parameters in this block.
    pub fn len(&self) -> usize {
        match *self {
            ParamBlock::Weight { fan_in, fan_out } => fan_in * fan_out,
            ParamBlock::Bias { len } | ParamBlock::Slope { len } => len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
