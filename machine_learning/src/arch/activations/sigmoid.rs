use ndarray::{ArrayBase, DataMut, Dimension};

/// The logistic function.
pub fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

/// Squashes every element of `x` into (0, 1) in place.
pub fn sigmoid_inplace<S, D>(x: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    x.par_mapv_inplace(sigmoid);
}
