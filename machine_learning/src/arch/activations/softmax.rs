use ndarray::{ArrayBase, Axis, DataMut, Dimension};

/// Normalizes every lane of `x` along `axis` into a probability distribution in place.
///
/// The maximum of each lane is subtracted before exponentiating so large logits don't overflow.
pub fn softmax_inplace<S, D>(x: &mut ArrayBase<S, D>, axis: Axis)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    for mut lane in x.lanes_mut(axis) {
        let max = lane.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        lane.mapv_inplace(|v| (v - max).exp());

        let sum = lane.sum();
        lane.mapv_inplace(|v| v / sum);
    }
}
