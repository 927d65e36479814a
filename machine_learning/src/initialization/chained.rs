use super::ParamGen;

/// A parameter generator that delegates the generation to a chain of parameter generators.
///
/// Each generator in the chain covers one parameter block of the model, so a single `sample`
/// call can fill the whole flat buffer even though every block is drawn differently.
pub struct ChainedParamGen {
    param_gens: Vec<Box<dyn ParamGen>>,
    curr: usize,
}

impl ChainedParamGen {
    /// Creates a new `ChainedParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `param_gens` - A vec of potentially different parameter generators.
    pub fn new(param_gens: Vec<Box<dyn ParamGen>>) -> Self {
        Self {
            param_gens,
            curr: 0,
        }
    }
}

impl ParamGen for ChainedParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let mut sample = Vec::with_capacity(n);

        while sample.len() < n && self.curr < self.param_gens.len() {
            match self.param_gens[self.curr].sample(n - sample.len()) {
                Some(part) if sample.len() + part.len() == n => sample.extend(part),
                Some(part) => {
                    sample.extend(part);
                    self.curr += 1;
                }
                None => self.curr += 1,
            }
        }

        if sample.is_empty() && n > 0 {
            return None;
        }

        Some(sample)
    }
}
