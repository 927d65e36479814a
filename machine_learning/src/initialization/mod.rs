mod chained;
mod error;
mod param_gen;
mod sampled;

use std::{cell::RefCell, rc::Rc};

use log::debug;
use rand::{SeedableRng, rngs::StdRng};

pub use chained::ChainedParamGen;
pub use error::{RandErr, Result};
pub use param_gen::ParamGen;
pub use sampled::{Fixed, SampledParamGen};

use crate::{MlErr, arch::ParamBlock, arch::activations::PRELU_INIT};

/// How weight matrices are drawn. Biases always start at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeightInit {
    #[default]
    XavierNormal,
    XavierUniform,
}

/// Builds one generator per block, chained in buffer order.
///
/// # Arguments
/// * `blocks` - The parameter blocks of the model, in buffer order.
/// * `init` - How to draw weight matrices.
/// * `rng` - The generator shared by every random block.
pub fn param_gen_for(
    blocks: &[ParamBlock],
    init: WeightInit,
    rng: Rc<RefCell<StdRng>>,
) -> Result<ChainedParamGen> {
    let param_gens = blocks
        .iter()
        .map(|block| -> Result<Box<dyn ParamGen>> {
            let limit = block.len();
            let param_gen: Box<dyn ParamGen> = match (*block, init) {
                (ParamBlock::Weight { fan_in, fan_out }, WeightInit::XavierNormal) => Box::new(
                    SampledParamGen::xavier_normal(rng.clone(), limit, fan_in, fan_out)?,
                ),
                (ParamBlock::Weight { fan_in, fan_out }, WeightInit::XavierUniform) => Box::new(
                    SampledParamGen::xavier_uniform(rng.clone(), limit, fan_in, fan_out)?,
                ),
                (ParamBlock::Bias { .. }, _) => {
                    Box::new(SampledParamGen::constant(rng.clone(), limit, 0.))
                }
                (ParamBlock::Slope { .. }, _) => {
                    Box::new(SampledParamGen::constant(rng.clone(), limit, PRELU_INIT))
                }
            };

            Ok(param_gen)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChainedParamGen::new(param_gens))
}

/// Fills `params` block by block, deterministically for a given `seed`.
///
/// # Errors
/// `MlErr::SizeMismatch` if the blocks don't cover `params` exactly, `MlErr::Init` if a
/// distribution can't be built (e.g. a zero sized weight matrix).
pub fn initialize(
    params: &mut [f32],
    blocks: &[ParamBlock],
    init: WeightInit,
    seed: u64,
) -> std::result::Result<(), MlErr> {
    let expected: usize = blocks.iter().map(ParamBlock::len).sum();
    if expected != params.len() {
        return Err(MlErr::SizeMismatch {
            what: "parameter blocks",
            got: params.len(),
            expected,
        });
    }

    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));
    let mut param_gen = param_gen_for(blocks, init, rng)?;

    if let Some(sample) = param_gen.sample(params.len()) {
        params.copy_from_slice(&sample);
    }

    debug!(blocks = blocks.len(), params = params.len(), seed = seed; "initialized parameters");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKS: [ParamBlock; 3] = [
        ParamBlock::Weight { fan_in: 3, fan_out: 2 },
        ParamBlock::Bias { len: 2 },
        ParamBlock::Slope { len: 1 },
    ];

    #[test]
    fn biases_zero_and_slopes_default() {
        let mut params = [f32::NAN; 9];
        initialize(&mut params, &BLOCKS, WeightInit::XavierNormal, 3).unwrap();

        assert!(params[..6].iter().all(|v| v.is_finite()));
        assert!(params[..6].iter().any(|&v| v != 0.));
        assert_eq!(params[6..8], [0., 0.]);
        assert_eq!(params[8], PRELU_INIT);
    }

    #[test]
    fn deterministic() {
        let mut a = [0.; 9];
        let mut b = [0.; 9];
        initialize(&mut a, &BLOCKS, WeightInit::XavierUniform, 11).unwrap();
        initialize(&mut b, &BLOCKS, WeightInit::XavierUniform, 11).unwrap();
        assert_eq!(a, b);

        initialize(&mut b, &BLOCKS, WeightInit::XavierUniform, 12).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn size_mismatch() {
        let mut params = [0.; 4];
        assert!(matches!(
            initialize(&mut params, &BLOCKS, WeightInit::XavierNormal, 0),
            Err(MlErr::SizeMismatch { got: 4, expected: 9, .. })
        ));
    }
}
