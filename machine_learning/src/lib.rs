pub mod arch;
pub mod error;
pub mod initialization;
mod mode;

pub use error::{MlErr, Result};
pub use mode::Mode;
