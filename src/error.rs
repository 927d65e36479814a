use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use machine_learning::MlErr;

/// The result type used across the model assembler.
pub type Result<T> = std::result::Result<T, ModelError>;

/// All errors that can occur while assembling or running a model.
#[derive(Debug)]
pub enum ModelError {
    /// Both the classification and the multiclass flags were set.
    ConfigurationConflict,
    /// Invalid configuration, caught before anything is built.
    InvalidConfig(String),
    /// The head expects auxiliary features but the batch carries none.
    MissingFeatures,
    /// An error raised by the numeric layers.
    Ml(MlErr),
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationConflict => {
                write!(f, "a model can't be both a classification and a multiclass model")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::MissingFeatures => write!(f, "the batch is missing its auxiliary features"),
            Self::Ml(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ml(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for ModelError {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<io::Error> for ModelError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
