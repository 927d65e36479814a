mod act_fn;
mod sigmoid;
mod softmax;

pub use act_fn::{ActFn, PRELU_INIT};
pub use sigmoid::{sigmoid, sigmoid_inplace};
pub use softmax::softmax_inplace;
