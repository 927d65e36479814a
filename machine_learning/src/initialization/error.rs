use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

use crate::MlErr;

/// The specific result type for the different `SampledParamGen` constructors.
pub type Result<T> = std::result::Result<T, RandErr>;

/// Error returned by the `SampledParamGen` constructors whenever the requested distribution can't be
/// built, each constructor has it's own constraints given that they use different distributions.
#[derive(Debug)]
pub struct RandErr(String);

impl From<NormalError> for RandErr {
    fn from(value: NormalError) -> Self {
        Self(value.to_string())
    }
}

impl From<UniformError> for RandErr {
    fn from(value: UniformError) -> Self {
        Self(value.to_string())
    }
}

impl From<RandErr> for MlErr {
    fn from(value: RandErr) -> Self {
        MlErr::Init(value.0)
    }
}

impl Display for RandErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for RandErr {}
