use ndarray::ArrayViewMut2;
use rand::Rng;

use crate::{MlErr, Mode, Result};

/// Inverted dropout: while training each element is zeroed with probability `rate` and the
/// survivors are scaled by `1 / (1 - rate)`. Evaluation passes are the identity.
#[derive(Clone, Debug)]
pub struct Dropout {
    rate: f32,
}

impl Dropout {
    /// Creates a new `Dropout`.
    ///
    /// # Errors
    /// `MlErr::InvalidRate` if `rate` is not in [0, 1).
    pub fn new(rate: f32) -> Result<Self> {
        if !(0. ..1.).contains(&rate) {
            return Err(MlErr::InvalidRate { rate });
        }

        Ok(Self { rate })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn apply(&self, mode: &mut Mode, mut x: ArrayViewMut2<f32>) {
        let Mode::Train(rng) = mode else {
            return;
        };

        if self.rate == 0. {
            return;
        }

        let keep = 1. / (1. - self.rate);
        x.mapv_inplace(|v| {
            if rng.random::<f32>() < self.rate {
                0.
            } else {
                v * keep
            }
        });
    }
}
