mod dropout;
mod linear;
mod spec;
mod stage;

pub use dropout::Dropout;
pub use linear::Linear;
pub use spec::StageSpec;
pub use stage::Stage;
