use ndarray::{ArrayViewMut2, Zip};

/// The slope PReLU starts with, see `ActFn::param_init`.
pub const PRELU_INIT: f32 = 0.25;

const LEAKY_RELU_SLOPE: f32 = 0.1;
const ELU_ALPHA: f32 = 1.;
const SELU_ALPHA: f32 = 1.673_263_2;
const SELU_SCALE: f32 = 1.050_701;

/// Elementwise activation functions available to hidden stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActFn {
    Relu,
    LeakyRelu,
    /// Leaky ReLU whose negative slope is a trainable parameter.
    Prelu,
    Tanh,
    Selu,
    Elu,
}
use ActFn::*;

impl ActFn {
    /// Returns the amount of trainable parameters this activation has.
    pub fn size(&self) -> usize {
        match self {
            Prelu => 1,
            _ => 0,
        }
    }

    /// Applies the activation to `x` in place.
    ///
    /// # Arguments
    /// * `params` - The activation's parameters, `size()` values long.
    /// * `x` - The pre-activations.
    pub fn apply(&self, params: &[f32], mut x: ArrayViewMut2<f32>) {
        let act = *self;
        let slope = params.first().copied().unwrap_or(PRELU_INIT);

        Zip::from(&mut x).par_for_each(|z| *z = act.f(*z, slope));
    }

    fn f(&self, z: f32, slope: f32) -> f32 {
        match self {
            Relu => z.max(0.),
            LeakyRelu => leaky(z, LEAKY_RELU_SLOPE),
            Prelu => leaky(z, slope),
            Tanh => z.tanh(),
            Selu => SELU_SCALE * elu(z, SELU_ALPHA),
            Elu => elu(z, ELU_ALPHA),
        }
    }
}

fn leaky(z: f32, slope: f32) -> f32 {
    if z >= 0. { z } else { slope * z }
}

fn elu(z: f32, alpha: f32) -> f32 {
    if z > 0. { z } else { alpha * z.exp_m1() }
}
