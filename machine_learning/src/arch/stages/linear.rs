use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::ParamBlock};

/// An affine transformation `x · W + b`.
///
/// Its parameters are laid out as the row-major `(input, output)` weight matrix followed by the
/// `output` biases.
#[derive(Clone, Debug)]
pub struct Linear {
    dim: (usize, usize),
    size: usize,
}

impl Linear {
    /// Creates a new `Linear`.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths.
    ///
    /// # Returns
    /// A new `Linear` instance.
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
        }
    }

    /// Returns the size of this stage.
    ///
    /// # Returns
    /// The amount of parameters this stage has.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the input and output widths.
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// The parameter blocks of this stage, in buffer order.
    pub fn blocks(&self) -> [ParamBlock; 2] {
        let (fan_in, fan_out) = self.dim;
        [
            ParamBlock::Weight { fan_in, fan_out },
            ParamBlock::Bias { len: fan_out },
        ]
    }

    /// Projects a batch of rows.
    ///
    /// # Arguments
    /// * `params` - This stage's parameter slice.
    /// * `x` - The input batch, one example per row.
    ///
    /// # Returns
    /// The projected batch or a size mismatch if `x` is not `input` columns wide.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "linear stage input width",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        Ok(z)
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this stage.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "linear stage parameters",
                got: params.len(),
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);

        let shape_err = |got| MlErr::SizeMismatch {
            what: "linear stage parameters",
            got,
            expected: self.size,
        };
        let weights =
            ArrayView2::from_shape(self.dim, w_raw).map_err(|_| shape_err(w_raw.len()))?;
        let biases =
            ArrayView1::from_shape(self.dim.1, b_raw).map_err(|_| shape_err(b_raw.len()))?;

        Ok((weights, biases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counts_biases() {
        let linear = Linear::new((3, 2));
        assert_eq!(linear.size(), 8);
    }

    #[test]
    fn affine() {
        let linear = Linear::new((2, 2));
        // w = [[1, 2], [3, 4]], b = [10, 20]
        let params = [1., 2., 3., 4., 10., 20.];
        let x = array![[1., 1.], [0., 2.]];

        let z = linear.forward(&params, x.view()).unwrap();
        assert_eq!(z, array![[14., 26.], [16., 28.]]);
    }

    #[test]
    fn wrong_input_width() {
        let linear = Linear::new((3, 1));
        let params = [0.; 4];
        let x = Array2::zeros((2, 2));

        assert!(matches!(
            linear.forward(&params, x.view()),
            Err(MlErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }

    #[test]
    fn wrong_params_len() {
        let linear = Linear::new((1, 1));
        let x = Array2::zeros((1, 1));

        assert!(linear.forward(&[0.], x.view()).is_err());
    }
}
