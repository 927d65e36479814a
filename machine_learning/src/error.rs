use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidRate {
        rate: f32,
    },
    Init(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => {
                format!("There's a size mismatch in {what}, got {got} and expected {expected}")
            }
            MlErr::InvalidRate { rate } => {
                format!("The dropout rate must be in [0, 1), got {rate}")
            }
            MlErr::Init(msg) => format!("Failed to initialize the parameters: {msg}"),
        };

        write!(f, "{s}")
    }
}

impl Error for MlErr {}
