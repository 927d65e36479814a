pub mod activations;
mod block;
mod sequential;
pub mod stages;

pub use block::ParamBlock;
pub use sequential::Sequential;
