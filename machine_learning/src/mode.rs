use rand::rngs::StdRng;

/// The phase a forward pass runs in.
///
/// Stages that behave differently while training (dropout) read it, the rest ignore it.
pub enum Mode<'r> {
    /// Training pass, stochastic stages draw from the given generator.
    Train(&'r mut StdRng),
    /// Evaluation pass, every stage is deterministic.
    Eval,
}

impl Mode<'_> {
    /// Returns `true` if this is a training pass.
    pub fn is_train(&self) -> bool {
        matches!(self, Mode::Train(_))
    }
}
