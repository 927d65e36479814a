pub mod config;
pub mod encoder;
pub mod error;
pub mod model;

pub use config::{Activation, DatasetType, InitConfig, ModelConfig};
pub use encoder::{DescriptorEncoder, Encoder};
pub use error::{ModelError, Result};
pub use model::{Batch, MoleculeModel, Output, OutputMode, RunMode, TaskFlags, build_model};
