use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::{ParamGen, Result};

/// A distribution that always yields the same value, used for biases and activation slopes.
#[derive(Clone, Copy, Debug)]
pub struct Fixed(pub f32);

impl Distribution<f32> for Fixed {
    fn sample<R: Rng + ?Sized>(&self, _rng: &mut R) -> f32 {
        self.0
    }
}

/// A parameter generator drawing a bounded amount of values from a distribution.
///
/// Every generator of a model shares one `rng`, so a whole buffer is reproducible from a single
/// seed as long as the blocks are sampled in the same order.
pub struct SampledParamGen<R: Rng, D: Distribution<f32>> {
    rng: Rc<RefCell<R>>,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> SampledParamGen<R, D> {
    pub fn new(rng: Rc<RefCell<R>>, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> SampledParamGen<R, Fixed> {
    /// `limit` copies of `value`.
    pub fn constant(rng: Rc<RefCell<R>>, limit: usize, value: f32) -> Self {
        Self::new(rng, Fixed(value), limit)
    }
}

impl<R: Rng> SampledParamGen<R, Uniform<f32>> {
    /// Xavier (Glorot) uniform: `U(-a, a)` with `a = sqrt(6 / (fan_in + fan_out))`.
    ///
    /// # Errors
    /// If the bound isn't finite, i.e. `fan_in + fan_out == 0`.
    pub fn xavier_uniform(
        rng: Rc<RefCell<R>>,
        limit: usize,
        fan_in: usize,
        fan_out: usize,
    ) -> Result<Self> {
        let bound = (6. / (fan_in + fan_out) as f32).sqrt();
        Ok(Self::new(rng, Uniform::new_inclusive(-bound, bound)?, limit))
    }
}

impl<R: Rng> SampledParamGen<R, Normal<f32>> {
    /// Xavier (Glorot) normal: `N(0, 2 / (fan_in + fan_out))`.
    ///
    /// # Errors
    /// If `Normal` rejects the computed standard deviation.
    pub fn xavier_normal(
        rng: Rc<RefCell<R>>,
        limit: usize,
        fan_in: usize,
        fan_out: usize,
    ) -> Result<Self> {
        let std_dev = (2. / (fan_in + fan_out) as f32).sqrt();
        Ok(Self::new(rng, Normal::new(0., std_dev)?, limit))
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for SampledParamGen<R, D> {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        let n = n.min(self.remaining);
        self.remaining -= n;

        let mut rng = self.rng.borrow_mut();
        let sample = (0..n).map(|_| self.distribution.sample(&mut *rng)).collect();
        Some(sample)
    }
}
